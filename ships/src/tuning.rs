use serde::{Deserialize, Serialize};

use crate::assembler::AssemblyLimits;
use crate::collision::CollisionSpec;
use crate::host::BlockId;
use crate::physics::PhysicsSpec;
use crate::pilot::PilotSpec;

/// Every tunable of the engine in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    /// Block id a helm must resolve to. `None` accepts any resolvable block.
    pub helm_block: Option<BlockId>,
    /// Per-player anti-spam window for helm use, in simulated seconds.
    pub interact_cooldown_secs: f64,
    /// Search radius around a helm use for ships whose helm has moved.
    pub nearest_helm_radius: f64,
    /// Emit per-ship telemetry every N active ticks. 0 disables it.
    pub telemetry_interval_ticks: u64,
    pub assembly: AssemblyLimits,
    pub physics: PhysicsSpec,
    pub collision: CollisionSpec,
    pub pilot: PilotSpec,
}

impl Default for ShipTuning {
    fn default() -> Self {
        presets::standard()
    }
}

pub mod presets {
    use super::*;

    /// The reference tuning.
    pub fn standard() -> ShipTuning {
        ShipTuning {
            helm_block: None,
            interact_cooldown_secs: 0.25,
            nearest_helm_radius: 6.0,
            telemetry_interval_ticks: 20,
            assembly: AssemblyLimits::default(),
            physics: PhysicsSpec::default(),
            collision: CollisionSpec::default(),
            pilot: PilotSpec::default(),
        }
    }

    /// Small, nimble boats: lower cap, quicker response, gentler collisions.
    pub fn skiff() -> ShipTuning {
        let base = standard();
        ShipTuning {
            assembly: AssemblyLimits { radius_xz: 16, max_down: 4, max_up: 12, max_blocks: 512, ..base.assembly },
            physics: PhysicsSpec {
                max_speed: 6.0,
                max_accel: 8.0,
                rudder_yaw_rate: 110.0,
                yaw_response: 8.0,
                collision_bounce: 0.2,
                ..base.physics
            },
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skiff_differs_only_where_intended() {
        let s = presets::skiff();
        let d = presets::standard();
        assert!(s.physics.max_speed > d.physics.max_speed);
        assert!(s.assembly.max_blocks < d.assembly.max_blocks);
        assert_eq!(s.collision, d.collision);
        assert_eq!(s.pilot, d.pilot);
        assert_eq!(ShipTuning::default(), d);
    }
}
