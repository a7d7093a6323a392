//! Services the engine needs from its host.
//!
//! The engine never owns voxel storage, the block catalog, entities or players.
//! It reaches them only through these traits, which the host implements once
//! and hands in per call (see [`Host`]).

use bevy_math::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::Aabb;
use crate::PlayerId;

pub type BlockId = u32;

/// What a voxel world reports for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Loaded and empty (air).
    Empty,
    /// Outside the loaded region; contents unknown.
    Unloaded,
    /// A placed block with its grid rotation index (0..=3).
    Block { id: BlockId, rotation: u8 },
}

impl CellState {
    pub fn is_empty(self) -> bool {
        matches!(self, CellState::Empty)
    }
}

pub trait VoxelWorld {
    /// Name used to keep ships of different worlds apart.
    fn name(&self) -> &str;

    fn cell(&self, pos: IVec3) -> CellState;

    fn is_loaded(&self, pos: IVec3) -> bool {
        !matches!(self.cell(pos), CellState::Unloaded)
    }

    /// Write a block. Writes into unloaded cells are dropped.
    fn set_block(&mut self, pos: IVec3, id: BlockId, rotation: u8);

    /// Clear a cell to air. Writes into unloaded cells are dropped.
    fn clear_block(&mut self, pos: IVec3);
}

/// Per-block-type properties the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockProperties {
    /// Solid materials block ship movement; liquids and foliage do not.
    pub solid: bool,
    pub mass: f64,
    /// Stored per block; no tick logic reads it.
    pub buoyancy: f64,
}

pub trait BlockCatalog {
    fn resolve(&self, id: BlockId) -> Option<BlockProperties>;
}

/// Opaque handle to a movable part the host spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartTransform {
    pub position: DVec3,
    pub yaw_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("part spawn rejected: {reason}")]
pub struct SpawnError {
    pub reason: String,
}

pub trait EntitySpawner {
    fn spawn_part(&mut self, block: BlockId, transform: PartTransform) -> Result<PartHandle, SpawnError>;
    fn despawn_part(&mut self, part: PartHandle);
    fn update_part(&mut self, part: PartHandle, transform: PartTransform);
}

/// Per-tick control state sampled from a player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Movement intent along the view direction, roughly `-1..=1`.
    pub forward: f64,
    /// Strafe intent, roughly `-1..=1`, positive to the right.
    pub right: f64,
    pub head_yaw: f64,
    pub crouching: bool,
}

/// Where a player is and how big they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    /// Feet position.
    pub position: DVec3,
    /// Collision box relative to `position`.
    pub bounds: Aabb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeleportOptions {
    pub preserve_velocity: bool,
    /// Only set when the host advertised head-rotation teleports.
    pub head_yaw: Option<f64>,
}

pub trait PlayerSource {
    /// `None` when the player is gone or no longer in `world`.
    fn snapshot(&self, player: PlayerId, world: &str) -> Option<PlayerSnapshot>;
    fn input(&self, player: PlayerId) -> Option<PlayerInput>;
    fn players_in(&self, world: &str) -> Vec<PlayerSnapshot>;
}

pub trait PlayerMovementSink {
    fn teleport(&mut self, player: PlayerId, position: DVec3, options: TeleportOptions);
    fn add_velocity(&mut self, player: PlayerId, delta: DVec3);
}

pub trait PlayerHost: PlayerSource + PlayerMovementSink {}

impl<T: PlayerSource + PlayerMovementSink> PlayerHost for T {}

/// Optional host features, resolved once when the registry is composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    /// The host can apply a head yaw together with a teleport.
    pub teleport_head_rotation: bool,
}

/// Borrowed view of every collaborator for one tick.
pub struct Host<'a> {
    pub world: &'a mut dyn VoxelWorld,
    pub catalog: &'a dyn BlockCatalog,
    pub spawner: &'a mut dyn EntitySpawner,
    pub players: &'a mut dyn PlayerHost,
}
