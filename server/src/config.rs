use std::path::Path;

use anyhow::{Context, Result};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use ships::{HostCapabilities, ShipTuning};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct Config {
    /// Simulation ticks per second.
    pub tick_hz: f64,
    /// Upper bound on live ship parts across all ships.
    pub max_parts: usize,
    /// Log a stats line every N ticks. 0 disables it.
    pub stats_interval_ticks: u64,
    pub capabilities: HostCapabilities,
    pub world: WorldConfig,
    pub ships: ShipTuning,
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_hz: 20.0,
            max_parts: 20_000,
            stats_interval_ticks: 100,
            capabilities: HostCapabilities { teleport_head_rotation: true },
            world: WorldConfig::default(),
            ships: ShipTuning::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_hz.max(1.0)
    }
}

/// Flat generated terrain: stone up to `ground_y`, water up to `sea_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    pub ground_y: i32,
    pub sea_level: i32,
    /// Cells with |x| or |z| at or beyond this are unloaded.
    pub loaded_radius: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "overworld".into(),
            ground_y: 50,
            sea_level: 62,
            loaded_radius: 256,
            min_y: 0,
            max_y: 320,
        }
    }
}

/// Scripted voyage run on startup: one pilot, one passenger, one hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled: bool,
    /// Helm cell of the generated hull. Keep it clear of the sea surface or
    /// capture will flood into the water.
    pub helm: [i32; 3],
    /// Throttle presses after boarding.
    pub throttle_steps: u32,
    /// Tick at which the pilot starts turning, and for how long.
    pub turn_at_tick: u64,
    pub turn_ticks: u64,
    /// Tick at which the pilot uses the helm again to dock.
    pub dock_at_tick: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            helm: [0, 64, 0],
            throttle_steps: 3,
            turn_at_tick: 80,
            turn_ticks: 40,
            dock_at_tick: 240,
        }
    }
}

pub fn parse_config(text: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    Ok(cfg)
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
}
