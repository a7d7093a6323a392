//! Dormant (placed blocks) and Active (movable parts) representations.

use bevy_math::IVec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ShipError;
use crate::geometry::{GeometryState, ShipGeometry};
use crate::host::{EntitySpawner, PartHandle, PartTransform, VoxelWorld};
use crate::math::wrap_degrees;
use crate::orientation::Orientation;
use crate::structure::Structure;
use crate::ShipId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipMode {
    #[default]
    Dormant,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePart {
    pub offset: IVec3,
    pub handle: PartHandle,
}

/// Grid pose a ship was docked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockedPose {
    pub helm: IVec3,
    pub orientation: Orientation,
}

/// Owns the ship's parts while Active. Dormant ships hold none.
#[derive(Debug, Default)]
pub struct ShipLifecycle {
    mode: ShipMode,
    parts: Vec<ActivePart>,
}

impl ShipLifecycle {
    pub fn mode(&self) -> ShipMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode == ShipMode::Active
    }

    pub fn parts(&self) -> &[ActivePart] {
        &self.parts
    }

    /// Dormant -> Active. Spawns one part per block, then clears the footprint
    /// at the grid pose nearest the current yaw. A spawn failure despawns what
    /// was spawned and leaves the ship Dormant with its blocks in place.
    pub fn activate(
        &mut self,
        ship: ShipId,
        world: &mut dyn VoxelWorld,
        spawner: &mut dyn EntitySpawner,
        structure: &Structure,
        geometry: &ShipGeometry,
        state: &GeometryState,
    ) -> Result<usize, ShipError> {
        if self.is_active() {
            return Ok(self.parts.len());
        }

        let mut spawned = Vec::with_capacity(structure.len());
        for b in structure.iter() {
            let transform = PartTransform {
                position: geometry.block_world_position(b.offset, state),
                yaw_deg: state.yaw,
            };
            match spawner.spawn_part(b.block, transform) {
                Ok(handle) => spawned.push(ActivePart { offset: b.offset, handle }),
                Err(source) => {
                    let count = spawned.len();
                    for p in spawned {
                        spawner.despawn_part(p.handle);
                    }
                    warn!(ship_id = %ship, spawned = count, %source, "activation aborted");
                    return Err(ShipError::SpawnFailed { ship, spawned: count, source });
                }
            }
        }

        let helm = geometry.helm_cell(state);
        let ori = geometry.orientation(state);
        for b in structure.iter() {
            world.clear_block(helm + ori.rotate(b.offset));
        }

        self.parts = spawned;
        self.mode = ShipMode::Active;
        info!(ship_id = %ship, parts = self.parts.len(), ?helm, "ship activated");
        Ok(self.parts.len())
    }

    /// Active -> Dormant at the grid pose nearest the current yaw. Refused,
    /// with nothing changed, if any destination cell is not empty.
    pub fn try_dock(
        &mut self,
        ship: ShipId,
        world: &mut dyn VoxelWorld,
        spawner: &mut dyn EntitySpawner,
        structure: &Structure,
        geometry: &ShipGeometry,
        state: &mut GeometryState,
    ) -> Result<DockedPose, ShipError> {
        let ori = geometry.orientation(state);
        let helm = geometry.helm_cell(state);

        if let Some(blocked) = structure
            .iter()
            .map(|b| helm + ori.rotate(b.offset))
            .find(|&cell| !world.cell(cell).is_empty())
        {
            warn!(ship_id = %ship, ?helm, orientation = ori.index(), ?blocked, "docking refused");
            return Err(ShipError::DockingRefused { ship, blocked });
        }

        for p in self.parts.drain(..) {
            spawner.despawn_part(p.handle);
        }
        for b in structure.iter() {
            world.set_block(helm + ori.rotate(b.offset), b.block, ori.rotate_block(b.rotation));
        }

        let yaw = wrap_degrees(ori.yaw_deg());
        state.origin = geometry.origin_for_helm(helm, yaw);
        state.settle(yaw);
        self.mode = ShipMode::Dormant;

        info!(ship_id = %ship, ?helm, orientation = ori.index(), "ship docked");
        Ok(DockedPose { helm, orientation: ori })
    }

    /// Push the current pose to every part.
    pub fn update_transforms(
        &self,
        spawner: &mut dyn EntitySpawner,
        geometry: &ShipGeometry,
        state: &GeometryState,
    ) {
        for p in &self.parts {
            spawner.update_part(
                p.handle,
                PartTransform {
                    position: geometry.block_world_position(p.offset, state),
                    yaw_deg: state.yaw,
                },
            );
        }
    }
}
