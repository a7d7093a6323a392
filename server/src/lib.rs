//! Headless host for the ship engine: a generated voxel world, simulated
//! players and a part store, all ticked at a fixed rate by bevy.

use std::sync::Arc;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use parking_lot::Mutex;
use ships::ShipRegistry;
use tracing::info;

mod args;
pub mod config;
pub mod demo;
pub mod parts;
pub mod players;
pub mod sim;
pub mod world;

pub use args::Args;
pub use config::{load_config, parse_config, Config};

/// The registry is shared with anything outside the schedule (tests, admin
/// hooks); systems lock it for the duration of one call.
pub type SharedShips = Arc<Mutex<ShipRegistry>>;

#[derive(Resource, Clone)]
pub struct Ships(pub SharedShips);

impl Ships {
    pub fn new(registry: ShipRegistry) -> Self {
        Self(Arc::new(Mutex::new(registry)))
    }
}

pub fn build_server_app(cfg: Config) -> App {
    let dt = cfg.tick_dt();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(dt))));

    app.insert_resource(Ships::new(ShipRegistry::new(cfg.ships.clone(), cfg.capabilities)))
        .insert_resource(world::GridWorld::new(cfg.world.clone()))
        .insert_resource(world::CatalogTable::standard())
        .insert_resource(parts::PartStore::with_limit(cfg.max_parts))
        .init_resource::<players::SimPlayers>()
        .init_resource::<sim::SimStats>()
        .insert_resource(sim::SimClock { dt, tick: 0 });

    app.add_systems(
        Update,
        (
            sim::advance_clock,
            sim::step_players,
            sim::tick_ships,
            sim::resolve_players,
            sim::report,
            sim::stop_after_ticks,
        )
            .chain()
            .in_set(sim::SimSet),
    );

    if cfg.demo.enabled {
        app.add_plugins(demo::DemoPlugin(cfg.demo.clone()));
    }
    info!(tick_hz = cfg.tick_hz, demo = cfg.demo.enabled, "Server app built");
    app.insert_resource(cfg);
    app
}
