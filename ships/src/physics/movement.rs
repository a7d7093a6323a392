use bevy_math::{DVec2, DVec3};

use super::PhysicsSpec;
use crate::geometry::GeometryState;
use crate::math::{forward_xz, wrap_degrees};

/// Occupancy test for a whole ship at a candidate pose.
pub trait CollisionProbe {
    fn collides_at(&self, origin: DVec3, yaw: f64) -> bool;
}

impl<F: Fn(DVec3, f64) -> bool> CollisionProbe for F {
    fn collides_at(&self, origin: DVec3, yaw: f64) -> bool {
        self(origin, yaw)
    }
}

/// What happened to the translation part of a movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// Displacement below threshold; nothing probed.
    Idle,
    /// Full displacement committed.
    Moved,
    /// Blocked as a whole; each axis was tried on its own.
    Slid { x: bool, z: bool },
    /// Still colliding after sliding; restored to the pre-tick origin.
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementOutcome {
    pub translation: Translation,
    /// The yaw change was refused and the yaw rate cleared.
    pub rotation_blocked: bool,
}

/// Advance the origin by the current velocity, resolving against `probe`.
///
/// Order: rotation alone at the current origin, then the full translation,
/// then X and Z separately with a bounce on the blocked axis, and finally a
/// re-check of the result that rolls the origin back and stops the ship if it
/// is still inside something. Records `last_move` and `last_yaw_delta` for
/// passenger carry.
pub fn tick_movement<P: CollisionProbe + ?Sized>(
    spec: &PhysicsSpec,
    state: &mut GeometryState,
    probe: &P,
    dt: f64,
) -> MovementOutcome {
    let prev_origin = state.origin;
    let start_yaw = state.last_yaw;

    let mut origin = state.origin;
    let mut yaw = state.yaw;
    let mut velocity = state.velocity;
    let mut yaw_rate = state.yaw_rate;

    let d = velocity * dt;
    let has_rotation = wrap_degrees(yaw - start_yaw).abs() > spec.rotation_epsilon_deg;
    let has_translation = d.x.abs() > spec.translation_epsilon || d.y.abs() > spec.translation_epsilon;

    let mut rotation_blocked = false;
    if has_rotation && probe.collides_at(origin, yaw) {
        yaw = start_yaw;
        yaw_rate = 0.0;
        rotation_blocked = true;
    }

    let translation = if !has_translation {
        Translation::Idle
    } else if !probe.collides_at(origin + DVec3::new(d.x, 0.0, d.y), yaw) {
        origin.x += d.x;
        origin.z += d.y;
        Translation::Moved
    } else {
        let move_x = !probe.collides_at(origin + DVec3::new(d.x, 0.0, 0.0), yaw);
        let move_z = !probe.collides_at(origin + DVec3::new(0.0, 0.0, d.y), yaw);

        if move_x {
            origin.x += d.x;
        } else {
            velocity.x = -velocity.x * spec.collision_bounce;
        }
        if move_z {
            origin.z += d.y;
        } else {
            velocity.y = -velocity.y * spec.collision_bounce;
        }
        velocity *= spec.collision_damping;
        yaw_rate *= spec.collision_yaw_damping;

        if probe.collides_at(origin, yaw) {
            origin = prev_origin;
            velocity = DVec2::ZERO;
            yaw_rate = 0.0;
            Translation::RolledBack
        } else {
            Translation::Slid { x: move_x, z: move_z }
        }
    };

    state.origin = origin;
    state.yaw = yaw;
    state.velocity = velocity;
    state.yaw_rate = yaw_rate;
    state.speed = velocity.dot(forward_xz(yaw));
    state.last_move = DVec2::new(origin.x - prev_origin.x, origin.z - prev_origin.z);
    state.last_yaw_delta = wrap_degrees(yaw - start_yaw);
    state.last_yaw = yaw;

    MovementOutcome { translation, rotation_blocked }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.05;

    fn free(_: DVec3, _: f64) -> bool {
        false
    }

    #[test]
    fn free_motion_commits_full_displacement() {
        let spec = PhysicsSpec::default();
        let mut s = GeometryState::at_rest(DVec3::new(0.0, 64.0, 0.0), 0.0);
        s.velocity = DVec2::new(1.0, 2.0);
        let out = tick_movement(&spec, &mut s, &free, DT);
        assert_eq!(out.translation, Translation::Moved);
        assert!((s.origin - DVec3::new(0.05, 64.0, 0.1)).length() < 1e-12);
        assert!((s.last_move - DVec2::new(0.05, 0.1)).length() < 1e-12);
    }

    #[test]
    fn wall_on_x_slides_along_z_and_bounces() {
        let spec = PhysicsSpec::default();
        let mut s = GeometryState::at_rest(DVec3::ZERO, 0.0);
        s.velocity = DVec2::new(2.0, 2.0);
        let wall = |o: DVec3, _: f64| o.x > 0.0;
        let out = tick_movement(&spec, &mut s, &wall, DT);
        assert_eq!(out.translation, Translation::Slid { x: false, z: true });
        assert_eq!(s.origin.x, 0.0);
        assert!((s.origin.z - 0.1).abs() < 1e-12);
        assert!(s.velocity.x < 0.0, "blocked axis reflects, vx={}", s.velocity.x);
        assert!((s.velocity.y - 2.0 * spec.collision_damping).abs() < 1e-12);
    }

    #[test]
    fn wedged_ship_rolls_back_and_stops() {
        let spec = PhysicsSpec::default();
        let start = DVec3::new(5.0, 64.0, 5.0);
        let mut s = GeometryState::at_rest(start, 0.0);
        s.velocity = DVec2::new(1.0, 1.0);
        s.yaw_rate = 3.0;
        // Only the start pose is clear; every displaced pose is blocked.
        let pocket = move |o: DVec3, _: f64| o != start;
        let out = tick_movement(&spec, &mut s, &pocket, DT);
        assert_eq!(out.translation, Translation::Slid { x: false, z: false });
        assert_eq!(s.origin, start);

        let stuck = |_: DVec3, _: f64| true;
        let mut s = GeometryState::at_rest(start, 0.0);
        s.velocity = DVec2::new(1.0, 1.0);
        let out = tick_movement(&spec, &mut s, &stuck, DT);
        assert_eq!(out.translation, Translation::RolledBack);
        assert_eq!(s.origin, start);
        assert_eq!(s.velocity, DVec2::ZERO);
        assert_eq!(s.yaw_rate, 0.0);
    }

    #[test]
    fn blocked_rotation_reverts_yaw() {
        let spec = PhysicsSpec::default();
        let mut s = GeometryState::at_rest(DVec3::ZERO, 10.0);
        s.yaw = 12.0;
        s.yaw_rate = 40.0;
        let no_turning = |_: DVec3, yaw: f64| (yaw - 10.0).abs() > 1e-9;
        let out = tick_movement(&spec, &mut s, &no_turning, DT);
        assert!(out.rotation_blocked);
        assert_eq!(s.yaw, 10.0);
        assert_eq!(s.yaw_rate, 0.0);
        assert_eq!(s.last_yaw_delta, 0.0);
    }

    #[test]
    fn yaw_delta_is_recorded_for_carry() {
        let spec = PhysicsSpec::default();
        let mut s = GeometryState::at_rest(DVec3::ZERO, 179.0);
        s.yaw = -178.0;
        tick_movement(&spec, &mut s, &free, DT);
        assert!((s.last_yaw_delta - 3.0).abs() < 1e-9, "delta={}", s.last_yaw_delta);
        assert_eq!(s.last_yaw, -178.0);
    }
}
