//! Player-vs-ship resolution in the ship's rotated frame.
//!
//! The ship frame is rooted at the ship origin and rotated by its yaw. A
//! structure block at offset `(dx, dy, dz)` occupies the unit box with minimum
//! corner `(dx - pivot.x, dy, dz - pivot.z)`. Player boxes are projected into
//! this frame with the usual |cos|/|sin| expansion so the hull can be treated
//! as an axis-aligned voxel grid.

use bevy_math::{DVec2, DVec3, IVec3};

use super::{Aabb, CollisionSpec};
use crate::geometry::GeometryState;
use crate::math::YawBasis;
use crate::structure::Structure;

/// Axis clamps smaller than this count as unclamped.
const CLAMP_EPSILON: f64 = 1.0e-9;
/// Extra reach added to the collision radius for the fast reject.
const REJECT_MARGIN: f64 = 2.0;
/// Local-bounds margin for the outside test.
const BOUNDS_MARGIN: f64 = 1.0;

/// Ship pose and last-tick motion as seen by the player pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipMotion {
    pub origin: DVec3,
    pub yaw: f64,
    pub last_move: DVec2,
    pub last_yaw_delta: f64,
}

impl ShipMotion {
    pub fn of(state: &GeometryState) -> Self {
        Self {
            origin: state.origin,
            yaw: state.yaw,
            last_move: state.last_move,
            last_yaw_delta: state.last_yaw_delta,
        }
    }
}

/// A player as seen by the collision pass for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerProbe {
    /// Feet position after the player's own movement this tick.
    pub position: DVec3,
    /// Movement since the last accepted position.
    pub delta: DVec3,
    /// Collision box relative to `position`.
    pub bounds: Aabb,
}

/// Precomputed hull extents for the player pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullCollider {
    pivot: DVec2,
    min_local: DVec2,
    max_local: DVec2,
    radius: f64,
}

impl HullCollider {
    pub fn new(structure: &Structure, pivot: DVec2) -> Self {
        let b = structure.bounds();
        let max_r2 = structure
            .iter()
            .map(|blk| {
                let lx = f64::from(blk.offset.x) - pivot.x;
                let lz = f64::from(blk.offset.z) - pivot.y;
                lx * lx + lz * lz
            })
            .fold(0.0_f64, f64::max);
        Self {
            pivot,
            min_local: DVec2::new(f64::from(b.min.x) - pivot.x, f64::from(b.min.z) - pivot.y),
            max_local: DVec2::new(
                f64::from(b.max.x) - pivot.x + 1.0,
                f64::from(b.max.z) - pivot.y + 1.0,
            ),
            radius: max_r2.sqrt() + 2.0,
        }
    }

    /// Planar distance from the origin beyond which no block can be reached.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Resolve one player against the hull.
    ///
    /// Returns the corrected feet position, or `None` when the player's swept
    /// box touches no block and they were neither carried nor snapped.
    pub fn resolve_player(
        &self,
        structure: &Structure,
        spec: &CollisionSpec,
        ship: ShipMotion,
        player: PlayerProbe,
    ) -> Option<DVec3> {
        let planar = DVec2::new(player.position.x - ship.origin.x, player.position.z - ship.origin.z);
        let reach = self.radius + REJECT_MARGIN;
        if planar.length_squared() > reach * reach {
            return None;
        }

        let basis = YawBasis::from_degrees(ship.yaw);
        let half = player.bounds.half_extents();
        let box_offset = player.bounds.center();
        let world_center = player.position + box_offset;
        let local_center = basis.to_local(world_center, ship.origin);

        let abs_cos = basis.cos.abs() + spec.rotation_epsilon;
        let abs_sin = basis.sin.abs() + spec.rotation_epsilon;
        let local_half = DVec3::new(
            abs_cos * half.x + abs_sin * half.z,
            half.y,
            abs_sin * half.x + abs_cos * half.z,
        );

        if self.outside_bounds(local_center, local_half) {
            return None;
        }

        let feet = player.position.y + player.bounds.min.y - ship.origin.y;
        let on_deck = self.on_deck(structure, spec, local_center, local_half, feet);

        let mut center = world_center;
        let mut delta = player.delta;

        let ship_moved = ship.last_move.x.abs() > spec.carry_move_epsilon
            || ship.last_move.y.abs() > spec.carry_move_epsilon
            || ship.last_yaw_delta.abs() > spec.carry_yaw_epsilon_deg;
        let carried = on_deck && ship_moved;
        if carried {
            center = carry(center, &ship);
        }

        let mut snapped = false;
        if on_deck && delta.y <= spec.snap_max_rise {
            if let Some(s) = self.snap_to_deck(structure, spec, basis, ship.origin, center, local_half) {
                center = s;
                delta.y = 0.0;
                snapped = true;
            }
        }

        let new_local = basis.to_local(center, ship.origin);
        let old_local = basis.to_local(center - delta, ship.origin);
        let mut moving = Aabb::from_center(old_local, local_half);
        let target = Aabb::from_center(new_local, local_half);

        let obstacles = self.trajectory_query(structure, moving.union(target));
        if obstacles.is_empty() && !carried && !snapped {
            return None;
        }

        let wanted = new_local - old_local;
        let mut clamped = false;
        for axis in [1, 0, 2] {
            let d = obstacles
                .iter()
                .fold(wanted[axis], |d, o| moving.clip_axis(axis, d, *o));
            let d = backoff(d, wanted[axis], spec.backoff);
            clamped |= (d - wanted[axis]).abs() > CLAMP_EPSILON;
            let mut step = DVec3::ZERO;
            step[axis] = d;
            moving = moving.offset(step);
        }

        if !clamped && !carried && !snapped {
            return None;
        }

        Some(basis.to_world(moving.center(), ship.origin) - box_offset)
    }

    fn outside_bounds(&self, c: DVec3, half: DVec3) -> bool {
        c.x + half.x < self.min_local.x - BOUNDS_MARGIN
            || c.x - half.x > self.max_local.x + BOUNDS_MARGIN
            || c.z + half.z < self.min_local.y - BOUNDS_MARGIN
            || c.z - half.z > self.max_local.y + BOUNDS_MARGIN
    }

    /// Structure columns under a local footprint, as inclusive block ranges.
    fn columns(&self, c: DVec3, half: DVec3) -> (IVec3, IVec3) {
        let lo = IVec3::new(
            (c.x - half.x + self.pivot.x).floor() as i32,
            0,
            (c.z - half.z + self.pivot.y).floor() as i32,
        );
        let hi = IVec3::new(
            (c.x + half.x + self.pivot.x).floor() as i32,
            0,
            (c.z + half.z + self.pivot.y).floor() as i32,
        );
        (lo, hi)
    }

    fn on_deck(&self, structure: &Structure, spec: &CollisionSpec, c: DVec3, half: DVec3, feet: f64) -> bool {
        let (lo, hi) = self.columns(c, half);
        let feet_cell = feet.floor() as i32;
        for dy in (feet_cell - 2)..=feet_cell {
            let top = f64::from(dy) + 1.0;
            if feet < top - spec.deck_sink || feet > top + spec.deck_tolerance {
                continue;
            }
            for dx in lo.x..=hi.x {
                for dz in lo.z..=hi.z {
                    if structure.contains(IVec3::new(dx, dy, dz)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn snap_to_deck(
        &self,
        structure: &Structure,
        spec: &CollisionSpec,
        basis: YawBasis,
        origin: DVec3,
        world_center: DVec3,
        half: DVec3,
    ) -> Option<DVec3> {
        let c = basis.to_local(world_center, origin);
        let feet = c.y - half.y;
        let feet_cell = feet.floor() as i32;
        let (lo, hi) = self.columns(c, half);

        let mut highest: Option<f64> = None;
        for dy in (feet_cell - 1)..=feet_cell {
            for dx in lo.x..=hi.x {
                for dz in lo.z..=hi.z {
                    if structure.contains(IVec3::new(dx, dy, dz)) {
                        let top = f64::from(dy) + 1.0;
                        highest = Some(highest.map_or(top, |h| h.max(top)));
                    }
                }
            }
        }

        let top = highest?;
        if (feet - top).abs() >= spec.snap_distance {
            return None;
        }
        let snapped = DVec3::new(c.x, top + half.y + spec.snap_clearance, c.z);
        Some(basis.to_world(snapped, origin))
    }

    fn trajectory_query(&self, structure: &Structure, sweep: Aabb) -> Vec<Aabb> {
        let min_dx = (sweep.min.x + self.pivot.x).floor() as i32;
        let max_dx = (sweep.max.x + self.pivot.x).floor() as i32;
        let min_dy = sweep.min.y.floor() as i32;
        let max_dy = sweep.max.y.ceil() as i32;
        let min_dz = (sweep.min.z + self.pivot.y).floor() as i32;
        let max_dz = (sweep.max.z + self.pivot.y).floor() as i32;

        let mut hits = Vec::new();
        for dx in min_dx..=max_dx {
            for dy in min_dy..=max_dy {
                for dz in min_dz..=max_dz {
                    if !structure.contains(IVec3::new(dx, dy, dz)) {
                        continue;
                    }
                    let corner = DVec3::new(
                        f64::from(dx) - self.pivot.x,
                        f64::from(dy),
                        f64::from(dz) - self.pivot.y,
                    );
                    let block = Aabb::cell(corner);
                    if block.intersects(sweep) {
                        hits.push(block);
                    }
                }
            }
        }
        hits
    }
}

/// Rigidly move a point with the ship's last translation and rotation about its previous origin.
fn carry(point: DVec3, ship: &ShipMotion) -> DVec3 {
    let prev = DVec2::new(ship.origin.x - ship.last_move.x, ship.origin.z - ship.last_move.y);
    let rel = DVec2::new(point.x - prev.x, point.z - prev.y);
    let r = YawBasis::from_degrees(ship.last_yaw_delta).rotate(rel.x, rel.y);
    DVec3::new(
        prev.x + r.x + ship.last_move.x,
        point.y,
        prev.y + r.y + ship.last_move.y,
    )
}

/// Leave a small gap on an axis that was shortened, so the next tick starts clear.
fn backoff(d: f64, wanted: f64, gap: f64) -> f64 {
    if d == 0.0 || d == wanted {
        d
    } else if d > 0.0 {
        d - gap
    } else {
        d + gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::LocalBlock;

    fn deck(w: i32, l: i32) -> Structure {
        let mut s = Structure::new();
        for x in 0..w {
            for z in 0..l {
                s.insert(LocalBlock {
                    offset: IVec3::new(x, 0, z),
                    block: 1,
                    rotation: 0,
                    mass: 1.0,
                    buoyancy: 0.0,
                });
            }
        }
        s
    }

    fn player_box() -> Aabb {
        Aabb::new(DVec3::new(-0.3, 0.0, -0.3), DVec3::new(0.3, 1.8, 0.3))
    }

    #[test]
    fn far_player_is_rejected() {
        let s = deck(3, 3);
        let hull = HullCollider::new(&s, DVec2::new(1.0, 1.0));
        let ship = ShipMotion { origin: DVec3::new(0.0, 64.0, 0.0), yaw: 0.0, last_move: DVec2::ZERO, last_yaw_delta: 0.0 };
        let player = PlayerProbe { position: DVec3::new(50.0, 65.0, 0.0), delta: DVec3::ZERO, bounds: player_box() };
        assert_eq!(hull.resolve_player(&s, &CollisionSpec::default(), ship, player), None);
    }

    #[test]
    fn falling_player_lands_on_deck() {
        let s = deck(3, 3);
        let pivot = DVec2::new(1.0, 1.0);
        let hull = HullCollider::new(&s, pivot);
        let ship = ShipMotion { origin: DVec3::new(10.0, 64.0, 10.0), yaw: 0.0, last_move: DVec2::ZERO, last_yaw_delta: 0.0 };
        // Deck top at y = 65. Player dropped from 65.3 to 64.7 this tick.
        let player = PlayerProbe {
            position: DVec3::new(10.5, 64.7, 10.5),
            delta: DVec3::new(0.0, -0.6, 0.0),
            bounds: player_box(),
        };
        let fixed = hull
            .resolve_player(&s, &CollisionSpec::default(), ship, player)
            .expect("player sinking through the deck must be corrected");
        assert!((fixed.y - 65.0).abs() < 0.01, "feet should rest on deck, got {fixed:?}");
        assert!((fixed.x - 10.5).abs() < 1e-9 && (fixed.z - 10.5).abs() < 1e-9);
    }

    #[test]
    fn walking_into_hull_side_is_clamped() {
        // Wall two blocks high at local x = 0.
        let mut s = Structure::new();
        for y in 0..2 {
            s.insert(LocalBlock { offset: IVec3::new(0, y, 0), block: 1, rotation: 0, mass: 1.0, buoyancy: 0.0 });
        }
        let hull = HullCollider::new(&s, DVec2::ZERO);
        let ship = ShipMotion { origin: DVec3::new(0.0, 64.0, 0.0), yaw: 0.0, last_move: DVec2::ZERO, last_yaw_delta: 0.0 };
        let player = PlayerProbe {
            position: DVec3::new(-0.2, 64.0, 0.5),
            delta: DVec3::new(0.3, 0.0, 0.0),
            bounds: player_box(),
        };
        let fixed = hull
            .resolve_player(&s, &CollisionSpec::default(), ship, player)
            .expect("should clamp");
        assert!(fixed.x < -0.3 && fixed.x > -0.31, "x={}", fixed.x);
    }

    #[test]
    fn carry_rotates_about_previous_origin() {
        let ship = ShipMotion {
            origin: DVec3::new(1.0, 0.0, 0.0),
            yaw: 90.0,
            last_move: DVec2::new(1.0, 0.0),
            last_yaw_delta: 90.0,
        };
        let p = carry(DVec3::new(0.0, 5.0, 2.0), &ship);
        assert!((p - DVec3::new(-1.0, 5.0, 0.0)).length() < 1e-9, "p={p:?}");
    }
}
