use bevy_math::IVec3;
use thiserror::Error;

use crate::host::SpawnError;
use crate::{PlayerId, ShipId};

/// Failures surfaced by the engine. All of them are local to one ship or
/// session; none stops the tick for anything else.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShipError {
    #[error("no resolvable block at {cell} in world `{world}`")]
    ResolutionFailure { world: String, cell: IVec3 },
    #[error("ship {ship} is already piloted by {pilot}")]
    AssignmentConflict { ship: ShipId, pilot: PlayerId },
    #[error("docking refused for ship {ship}: destination cell {blocked} is occupied")]
    DockingRefused { ship: ShipId, blocked: IVec3 },
    #[error("pilot session of {player} is inconsistent: {reason}")]
    InconsistentSession { player: PlayerId, reason: &'static str },
    #[error("activation of ship {ship} failed after {spawned} parts")]
    SpawnFailed {
        ship: ShipId,
        spawned: usize,
        #[source]
        source: SpawnError,
    },
    #[error("unknown ship {0}")]
    UnknownShip(ShipId),
}
