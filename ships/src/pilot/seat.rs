use bevy_math::DVec3;

use super::PilotSpec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeatCorrection {
    /// Close enough; leave the pilot alone.
    Hold,
    /// Velocity to add this tick.
    Nudge(DVec3),
    /// Teleport to this position, keeping velocity.
    Snap(DVec3),
}

/// Keep the pilot on the anchor: snap when far off, nudge inside the soft band.
pub fn seat_correction(spec: &PilotSpec, anchor: DVec3, player: DVec3, dt: f64) -> SeatCorrection {
    let offset = anchor - player;
    let dist_sq = offset.length_squared();
    if dist_sq > spec.seat_snap_distance * spec.seat_snap_distance {
        return SeatCorrection::Snap(anchor);
    }
    if dist_sq > spec.seat_soft_distance * spec.seat_soft_distance {
        let dist = dist_sq.sqrt();
        let speed = spec.max_correction_speed.min(dist / dt.max(1.0e-6));
        return SeatCorrection::Nudge(offset / dist * speed);
    }
    SeatCorrection::Hold
}
