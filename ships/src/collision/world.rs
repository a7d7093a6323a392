use bevy_math::{DVec2, DVec3};

use crate::host::{BlockCatalog, CellState, VoxelWorld};
use crate::math::{cell_of, YawBasis};
use crate::physics::CollisionProbe;
use crate::structure::Structure;

/// Would the hull overlap the world at this pose?
///
/// Each block is sampled at its rotated center. Unloaded cells block, solid
/// blocks block; air, non-solid and unknown block types do not.
pub fn hull_collides_at(
    world: &dyn VoxelWorld,
    catalog: &dyn BlockCatalog,
    structure: &Structure,
    pivot: DVec2,
    origin: DVec3,
    yaw: f64,
) -> bool {
    let basis = YawBasis::from_degrees(yaw);
    structure.iter().any(|b| {
        let local = DVec3::new(
            f64::from(b.offset.x) + 0.5 - pivot.x,
            f64::from(b.offset.y) + 0.5,
            f64::from(b.offset.z) + 0.5 - pivot.y,
        );
        match world.cell(cell_of(basis.to_world(local, origin))) {
            CellState::Unloaded => true,
            CellState::Empty => false,
            CellState::Block { id, .. } => catalog.resolve(id).is_some_and(|p| p.solid),
        }
    })
}

/// [`CollisionProbe`] for one ship against a live world.
pub struct WorldProbe<'a> {
    pub world: &'a dyn VoxelWorld,
    pub catalog: &'a dyn BlockCatalog,
    pub structure: &'a Structure,
    pub pivot: DVec2,
}

impl CollisionProbe for WorldProbe<'_> {
    fn collides_at(&self, origin: DVec3, yaw: f64) -> bool {
        hull_collides_at(self.world, self.catalog, self.structure, self.pivot, origin, yaw)
    }
}
