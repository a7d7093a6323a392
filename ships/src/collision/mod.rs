//! Ship-vs-world occupancy and player-vs-ship swept resolution.

use serde::{Deserialize, Serialize};

mod aabb;
mod hull;
mod tracker;
mod world;

pub use aabb::Aabb;
pub use hull::{HullCollider, PlayerProbe, ShipMotion};
pub use tracker::PlayerMotionTracker;
pub use world::{hull_collides_at, WorldProbe};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSpec {
    /// Padding added to |cos| and |sin| when projecting a player box into the ship frame.
    pub rotation_epsilon: f64,
    pub snap_distance: f64,
    /// Height above the deck a snapped player's feet are placed at.
    pub snap_clearance: f64,
    /// How far above a block top the feet may be and still count as on deck.
    pub deck_tolerance: f64,
    /// How far below a block top the feet may be and still count as on deck.
    pub deck_sink: f64,
    /// Gap left after a clamped axis.
    pub backoff: f64,
    /// Vertical delta at or below which a player on deck may be snapped.
    pub snap_max_rise: f64,
    /// Carry applies when the ship moved more than this on either axis last tick.
    pub carry_move_epsilon: f64,
    pub carry_yaw_epsilon_deg: f64,
    /// Corrections shorter than this are not applied by the host pass.
    pub min_correction: f64,
}

impl Default for CollisionSpec {
    fn default() -> Self {
        Self {
            rotation_epsilon: 1.0e-4,
            snap_distance: 0.6,
            snap_clearance: 1.0e-4,
            deck_tolerance: 0.35,
            deck_sink: 0.5,
            backoff: 1.0e-3,
            snap_max_rise: 0.01,
            carry_move_epsilon: 1.0e-6,
            carry_yaw_epsilon_deg: 0.001,
            min_correction: 0.0005,
        }
    }
}
