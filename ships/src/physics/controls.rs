use serde::{Deserialize, Serialize};

use super::{per_frame_decay, PhysicsSpec};
use crate::geometry::GeometryState;
use crate::math::{forward_xz, wrap_degrees};

/// Control surface values for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipControls {
    /// -1..=1, fraction of max speed.
    pub throttle: f64,
    /// -1..=1, positive turns toward +yaw when moving forward.
    pub rudder: f64,
    /// Reserved; pilots currently always send 0.
    pub wheel: f64,
}

/// Integrate controls into velocity, yaw rate and yaw. Position is left to
/// [`tick_movement`](super::tick_movement).
pub fn apply_controls(spec: &PhysicsSpec, state: &mut GeometryState, controls: ShipControls, dt: f64) {
    let fwd = forward_xz(state.yaw);
    let drag = per_frame_decay(spec.drag_base, dt);

    let forward_speed = state.velocity.dot(fwd);
    let target = controls.throttle * spec.max_speed;
    let accel = ((target - forward_speed) * spec.accel_gain).clamp(-spec.max_accel, spec.max_accel);

    let mut v = state.velocity + fwd * (accel * dt);
    v *= drag;
    let mag = v.length();
    if mag > spec.max_speed {
        v *= spec.max_speed / mag;
    }

    let speed = v.dot(fwd);
    let speed_abs = speed.abs();
    let turn_factor = if speed_abs < spec.min_steer_speed {
        0.0
    } else {
        (speed_abs / spec.max_speed).clamp(0.0, 1.0)
    };
    let turn_sign = if speed < 0.0 { -1.0 } else { 1.0 };

    let desired = (controls.rudder * spec.rudder_yaw_rate + controls.wheel * spec.wheel_yaw_rate)
        * turn_factor
        * turn_sign;
    let mut yaw_rate = state.yaw_rate;
    yaw_rate += (desired - yaw_rate) * (spec.yaw_response * dt).clamp(0.0, 1.0);
    yaw_rate *= per_frame_decay(spec.yaw_decay, dt);

    state.velocity = v;
    state.speed = speed;
    state.yaw_rate = yaw_rate;
    state.yaw = wrap_degrees(state.yaw + yaw_rate * dt);
}
