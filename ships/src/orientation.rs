use bevy_math::IVec3;
use serde::{Deserialize, Serialize};

/// One of the four grid-aligned yaw states (quarter turns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Orientation(u8);

impl Orientation {
    pub const NORTH: Self = Self(0);
    pub const EAST: Self = Self(1);
    pub const SOUTH: Self = Self(2);
    pub const WEST: Self = Self(3);
    pub const ALL: [Self; 4] = [Self::NORTH, Self::EAST, Self::SOUTH, Self::WEST];

    pub fn from_index(index: i32) -> Self {
        Self(index.rem_euclid(4) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn inverse(self) -> Self {
        Self::from_index(-i32::from(self.0))
    }

    /// Apply `self`, then `other`.
    pub fn then(self, other: Self) -> Self {
        Self::from_index(i32::from(self.0) + i32::from(other.0))
    }

    /// Nearest quarter turn to a continuous yaw in degrees.
    pub fn nearest_to_yaw(yaw_deg: f64) -> Self {
        let yaw = (yaw_deg % 360.0 + 360.0) % 360.0;
        Self::from_index((yaw / 90.0).round() as i32)
    }

    pub fn yaw_deg(self) -> f64 {
        f64::from(self.0) * 90.0
    }

    /// Rotate a cell offset about +Y by this many quarter turns.
    pub fn rotate(self, v: IVec3) -> IVec3 {
        match self.0 {
            0 => v,
            1 => IVec3::new(-v.z, v.y, v.x),
            2 => IVec3::new(-v.x, v.y, -v.z),
            _ => IVec3::new(v.z, v.y, -v.x),
        }
    }

    /// Grid rotation index of a block after rotating it by `self`.
    pub fn rotate_block(self, rotation: u8) -> u8 {
        (rotation.wrapping_add(self.0)) & 3
    }
}
