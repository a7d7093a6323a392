//! Per-player piloting: sessions, input mapping and the seat lock.

use serde::{Deserialize, Serialize};

mod controller;
mod seat;
mod session;

pub use controller::{update_input, PilotAction};
pub use seat::{seat_correction, SeatCorrection};
pub use session::{PilotSession, PilotSessions};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotSpec {
    /// Throttle steps each side of zero.
    pub max_throttle_step: i32,
    /// Forward/backward intent beyond this counts as pressed.
    pub input_deadzone: f64,
    /// Distance of the pilot anchor behind the helm.
    pub anchor_radius: f64,
    /// Beyond this the pilot is teleported to the anchor.
    pub seat_snap_distance: f64,
    /// Beyond this (and within the snap distance) the pilot is nudged.
    pub seat_soft_distance: f64,
    pub max_correction_speed: f64,
}

impl Default for PilotSpec {
    fn default() -> Self {
        Self {
            max_throttle_step: 4,
            input_deadzone: 0.25,
            anchor_radius: 0.85,
            seat_snap_distance: 0.75,
            seat_soft_distance: 0.12,
            max_correction_speed: 4.0,
        }
    }
}
