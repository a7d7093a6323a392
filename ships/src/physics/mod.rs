//! Ship motion: control integration and collision-aware movement.
//!
//! Both steps work on a plain [`GeometryState`](crate::geometry::GeometryState)
//! so they can be driven from tests without any host.

use serde::{Deserialize, Serialize};

mod controls;
mod movement;

pub use controls::{apply_controls, ShipControls};
pub use movement::{tick_movement, CollisionProbe, MovementOutcome, Translation};

/// Tunables for the motion model. Speeds in blocks/s, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSpec {
    pub max_speed: f64,
    pub max_accel: f64,
    /// Acceleration per unit of speed error before clamping.
    pub accel_gain: f64,
    /// Per-frame velocity retention at 60 Hz.
    pub drag_base: f64,
    pub min_steer_speed: f64,
    pub rudder_yaw_rate: f64,
    pub wheel_yaw_rate: f64,
    /// How fast the yaw rate approaches its target, per second.
    pub yaw_response: f64,
    /// Per-frame yaw rate retention at 60 Hz.
    pub yaw_decay: f64,
    pub collision_bounce: f64,
    pub collision_damping: f64,
    pub collision_yaw_damping: f64,
    /// Yaw changes at or below this are not probed for collision.
    pub rotation_epsilon_deg: f64,
    /// Per-tick displacements at or below this on both axes are skipped.
    pub translation_epsilon: f64,
}

impl Default for PhysicsSpec {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_accel: 5.0,
            accel_gain: 2.0,
            drag_base: 0.985,
            min_steer_speed: 0.15,
            rudder_yaw_rate: 80.0,
            wheel_yaw_rate: 120.0,
            yaw_response: 6.0,
            yaw_decay: 0.92,
            collision_bounce: 0.1,
            collision_damping: 0.35,
            collision_yaw_damping: 0.6,
            rotation_epsilon_deg: 0.01,
            translation_epsilon: 1.0e-5,
        }
    }
}

/// Frame-rate independent retention: `base` per 1/60 s, never less than one frame's worth.
#[inline]
pub(crate) fn per_frame_decay(base: f64, dt: f64) -> f64 {
    base.powf((dt * 60.0).max(1.0))
}
