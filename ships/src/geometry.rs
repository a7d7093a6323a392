//! Ship frame: origin, yaw, pivot and the transforms between them.

use bevy_math::{DVec2, DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::math::{forward_xz, YawBasis};
use crate::orientation::Orientation;
use crate::structure::Structure;

/// Mutable motion state of one ship. Rotation is about +Y only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryState {
    /// World position of the ship frame (the rotated pivot).
    pub origin: DVec3,
    /// Degrees, wrapped to `[-180, 180)`.
    pub yaw: f64,
    /// Yaw committed at the end of the previous movement tick.
    pub last_yaw: f64,
    /// Planar velocity `(x, z)` in blocks per second.
    pub velocity: DVec2,
    /// Degrees per second.
    pub yaw_rate: f64,
    /// Signed speed along the forward axis.
    pub speed: f64,
    /// Origin displacement applied by the last movement tick.
    pub last_move: DVec2,
    /// Yaw change applied by the last movement tick, degrees.
    pub last_yaw_delta: f64,
}

impl GeometryState {
    pub fn at_rest(origin: DVec3, yaw: f64) -> Self {
        Self { origin, yaw, last_yaw: yaw, ..Default::default() }
    }

    /// Zero every velocity and per-tick delta and settle at `yaw`.
    pub fn settle(&mut self, yaw: f64) {
        *self = Self::at_rest(self.origin, yaw);
    }
}

/// Fixed frame data derived from the structure when the ship is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipGeometry {
    /// Rotation pivot: XZ midpoint of the structure's block bounds.
    pub pivot: DVec2,
    /// Helm cell the structure was captured from; its local offset is zero.
    pub helm: IVec3,
}

impl ShipGeometry {
    pub fn new(structure: &Structure, helm: IVec3) -> Self {
        let b = structure.bounds();
        let pivot = DVec2::new(
            f64::from(b.min.x + b.max.x) * 0.5,
            f64::from(b.min.z + b.max.z) * 0.5,
        );
        Self { pivot, helm }
    }

    /// Frame origin that puts the helm at `helm_cell` under `yaw`.
    ///
    /// The frame turns about the helm cell's center, so at quarter turns every
    /// block center lands on the cell [`Orientation::rotate`] gives for it.
    pub fn origin_for_helm(&self, helm_cell: IVec3, yaw: f64) -> DVec3 {
        let r = YawBasis::from_degrees(yaw).rotate(self.pivot.x - 0.5, self.pivot.y - 0.5);
        DVec3::new(
            f64::from(helm_cell.x) + 0.5 + r.x,
            f64::from(helm_cell.y),
            f64::from(helm_cell.z) + 0.5 + r.y,
        )
    }

    /// Continuous world position of the helm cell's center at deck level (y of the helm cell).
    pub fn helm_world_position(&self, state: &GeometryState) -> DVec3 {
        let r = YawBasis::from_degrees(state.yaw).rotate(0.5 - self.pivot.x, 0.5 - self.pivot.y);
        state.origin + DVec3::new(r.x, 0.0, r.y)
    }

    /// Grid cell currently containing the helm center.
    pub fn helm_cell(&self, state: &GeometryState) -> IVec3 {
        let c = self.helm_world_position(state);
        IVec3::new(c.x.floor() as i32, c.y.round() as i32, c.z.floor() as i32)
    }

    /// Position of a block's minimum corner under the current continuous pose.
    pub fn block_world_position(&self, offset: IVec3, state: &GeometryState) -> DVec3 {
        let local = DVec3::new(
            f64::from(offset.x) - self.pivot.x,
            f64::from(offset.y),
            f64::from(offset.z) - self.pivot.y,
        );
        YawBasis::from_degrees(state.yaw).to_world(local, state.origin)
    }

    /// Where the pilot stands: just behind the helm along the forward axis,
    /// X/Z snapped to a 1/16 grid.
    pub fn pilot_anchor(&self, state: &GeometryState, radius: f64) -> DVec3 {
        let helm = self.helm_world_position(state);
        let fwd = forward_xz(state.yaw);
        let snap = |v: f64| (v * 16.0).round() / 16.0;
        DVec3::new(snap(helm.x - fwd.x * radius), helm.y, snap(helm.z - fwd.y * radius))
    }

    /// Nearest grid orientation to the current yaw.
    pub fn orientation(&self, state: &GeometryState) -> Orientation {
        Orientation::nearest_to_yaw(state.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::LocalBlock;

    fn hull() -> Structure {
        Structure::from_blocks((0..5).map(|x| LocalBlock {
            offset: IVec3::new(x, 0, 0),
            block: 1,
            rotation: 0,
            mass: 1.0,
            buoyancy: 0.0,
        }))
    }

    #[test]
    fn pivot_is_bounds_midpoint_not_helm() {
        let g = ShipGeometry::new(&hull(), IVec3::new(10, 64, 10));
        assert_eq!(g.pivot, DVec2::new(2.0, 0.0));
    }

    #[test]
    fn helm_round_trips_through_origin_at_any_yaw() {
        let helm = IVec3::new(10, 64, -7);
        let g = ShipGeometry::new(&hull(), helm);
        for yaw in [0.0, 33.0, 90.0, -120.0] {
            let state = GeometryState::at_rest(g.origin_for_helm(helm, yaw), yaw);
            let center = g.helm_world_position(&state);
            let expected = helm.as_dvec3() + DVec3::new(0.5, 0.0, 0.5);
            assert!((center - expected).length() < 1e-9, "yaw={yaw} center={center:?}");
            assert_eq!(g.helm_cell(&state), helm);
        }
    }

    #[test]
    fn helm_block_sits_at_helm_cell() {
        let helm = IVec3::new(3, 70, 4);
        let g = ShipGeometry::new(&hull(), helm);
        let state = GeometryState::at_rest(g.origin_for_helm(helm, 0.0), 0.0);
        assert_eq!(g.block_world_position(IVec3::ZERO, &state), helm.as_dvec3());
        assert_eq!(
            g.block_world_position(IVec3::new(4, 0, 0), &state),
            DVec3::new(7.0, 70.0, 4.0)
        );
    }

    #[test]
    fn quarter_turns_put_block_centers_on_rotated_cells() {
        let helm = IVec3::new(-4, 60, 9);
        let g = ShipGeometry::new(&hull(), helm);
        for ori in Orientation::ALL {
            let yaw = ori.yaw_deg();
            let state = GeometryState::at_rest(g.origin_for_helm(helm, yaw), yaw);
            for x in 0..5 {
                let offset = IVec3::new(x, 0, 0);
                let center = g.block_world_position(offset, &state)
                    + YawBasis::from_degrees(yaw).to_world(DVec3::new(0.5, 0.5, 0.5), DVec3::ZERO);
                assert_eq!(
                    crate::math::cell_of(center),
                    helm + ori.rotate(offset),
                    "ori={ori:?} x={x}"
                );
            }
        }
    }

    #[test]
    fn anchor_is_behind_helm_and_grid_snapped() {
        let helm = IVec3::new(0, 64, 0);
        let g = ShipGeometry::new(&hull(), helm);
        let state = GeometryState::at_rest(g.origin_for_helm(helm, 0.0), 0.0);
        let anchor = g.pilot_anchor(&state, 0.85);
        // 0.5 - 0.85 = -0.35, nearest sixteenth is -0.375.
        assert_eq!(anchor, DVec3::new(0.5, 64.0, -0.375));

        let turned = GeometryState::at_rest(g.origin_for_helm(helm, 17.0), 17.0);
        let a = g.pilot_anchor(&turned, 0.85);
        assert_eq!((a.x * 16.0).fract(), 0.0);
        assert_eq!((a.z * 16.0).fract(), 0.0);
    }
}
