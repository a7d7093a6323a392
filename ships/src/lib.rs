//! Voxel ship simulation.
//!
//! A ship is a connected set of blocks captured from a voxel world by flood
//! fill from a helm. While Dormant it exists only as placed blocks; while
//! Active it is a set of movable parts driven by a pilot, colliding with the
//! world and carrying players standing on it. [`ShipRegistry`] owns every
//! ship and session and exposes the per-tick pipeline; hosts plug in through
//! the traits in [`host`].

mod ids;
mod math;

pub mod assembler;
pub mod collision;
pub mod error;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod orientation;
pub mod physics;
pub mod pilot;
pub mod registry;
pub mod ship;
pub mod structure;
pub mod tuning;

pub use assembler::{assemble, Assembly, AssemblyLimits};
pub use error::ShipError;
pub use host::{
    BlockCatalog, BlockId, BlockProperties, CellState, EntitySpawner, Host, HostCapabilities, PartHandle,
    PartTransform, PlayerHost, PlayerInput, PlayerMovementSink, PlayerSnapshot, PlayerSource, SpawnError,
    TeleportOptions, VoxelWorld,
};
pub use ids::{PlayerId, ShipId};
pub use lifecycle::ShipMode;
pub use math::{cell_of, forward_xz, wrap_degrees, YawBasis};
pub use orientation::Orientation;
pub use registry::{HelmInteraction, ShipRegistry, TickSummary};
pub use ship::Ship;
pub use structure::{LocalBlock, Structure};
pub use tuning::{presets, ShipTuning};
