//! Axis-aligned box in f64.

use bevy_math::DVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Unit cell with its minimum corner at `corner`.
    pub fn cell(corner: DVec3) -> Self {
        Self::new(corner, corner + DVec3::ONE)
    }

    pub fn from_center(center: DVec3, half: DVec3) -> Self {
        Self::new(center - half, center + half)
    }

    pub fn offset(self, by: DVec3) -> Self {
        Self::new(self.min + by, self.max + by)
    }

    /// Smallest box containing both.
    pub fn union(self, other: Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Strict overlap; touching faces do not intersect.
    pub fn intersects(self, other: Aabb) -> bool {
        other.max.x > self.min.x
            && other.min.x < self.max.x
            && other.max.y > self.min.y
            && other.min.y < self.max.y
            && other.max.z > self.min.z
            && other.min.z < self.max.z
    }

    pub fn center(self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(self) -> DVec3 {
        (self.max - self.min) * 0.5
    }

    /// Clamp a move of `delta` along `axis` (0 = x, 1 = y, 2 = z) so `self`
    /// stops at `obstacle`. Obstacles that do not overlap on the other two
    /// axes, or that are not ahead of the box, leave `delta` unchanged.
    pub fn clip_axis(self, axis: usize, delta: f64, obstacle: Aabb) -> f64 {
        let (a, b) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        for i in [a, b] {
            if obstacle.max[i] <= self.min[i] || obstacle.min[i] >= self.max[i] {
                return delta;
            }
        }
        if delta > 0.0 && obstacle.min[axis] >= self.max[axis] {
            delta.min(obstacle.min[axis] - self.max[axis])
        } else if delta < 0.0 && obstacle.max[axis] <= self.min[axis] {
            delta.max(obstacle.max[axis] - self.min[axis])
        } else {
            delta
        }
    }
}
