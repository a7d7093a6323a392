//! Flood-fill capture of a connected block structure from a seed cell.

use std::collections::{HashSet, VecDeque};

use bevy_math::IVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::host::{BlockCatalog, CellState, VoxelWorld};
use crate::orientation::Orientation;
use crate::structure::{LocalBlock, Structure};

const NEIGHBORS_6: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Search window and cap for one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyLimits {
    /// Max |dx| and |dz| from the seed.
    pub radius_xz: i32,
    pub max_down: i32,
    pub max_up: i32,
    /// Inclusive lower world limit.
    pub world_min_y: i32,
    /// Exclusive upper world limit.
    pub world_max_y: i32,
    pub max_blocks: usize,
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        Self {
            radius_xz: 48,
            max_down: 10,
            max_up: 40,
            world_min_y: 0,
            world_max_y: 320,
            max_blocks: 6000,
        }
    }
}

impl AssemblyLimits {
    fn in_window(&self, seed: IVec3, p: IVec3) -> bool {
        (p.x - seed.x).abs() <= self.radius_xz
            && (p.z - seed.z).abs() <= self.radius_xz
            && p.y >= seed.y - self.max_down
            && p.y <= seed.y + self.max_up
    }

    fn in_world(&self, p: IVec3) -> bool {
        p.y >= self.world_min_y && p.y < self.world_max_y
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub structure: Structure,
    /// Capture stopped at `max_blocks` while a capturable cell was still queued.
    pub truncated: bool,
    /// World-space extent of captured cells (seed only when nothing was captured).
    pub world_min: IVec3,
    pub world_max: IVec3,
}

/// Breadth-first capture of every non-empty, resolvable cell 6-connected to
/// `seed`. Empty, unloaded and unresolvable cells are neither captured nor
/// expanded through. Offsets are stored in the seed's frame: the same shape
/// captured under any seed orientation yields the same local structure.
pub fn assemble(
    world: &dyn VoxelWorld,
    catalog: &dyn BlockCatalog,
    seed: IVec3,
    seed_orientation: Orientation,
    limits: &AssemblyLimits,
) -> Assembly {
    let mut structure = Structure::new();
    let mut world_min = seed;
    let mut world_max = seed;

    let capturable = |p: IVec3| match world.cell(p) {
        CellState::Block { id, .. } => catalog.resolve(id).is_some(),
        _ => false,
    };
    if !capturable(seed) {
        warn!(world = world.name(), ?seed, "assembly seed is empty or unresolvable");
        return Assembly { structure, truncated: false, world_min, world_max };
    }

    let inverse = seed_orientation.inverse();
    let mut queue = VecDeque::from([seed]);
    let mut visited = HashSet::from([seed]);

    while structure.len() < limits.max_blocks {
        let Some(p) = queue.pop_front() else {
            break;
        };
        if !limits.in_window(seed, p) {
            continue;
        }
        let CellState::Block { id, rotation } = world.cell(p) else {
            continue;
        };
        let Some(props) = catalog.resolve(id) else {
            debug!(?p, id, "skipping unresolvable block");
            continue;
        };

        structure.insert(LocalBlock {
            offset: inverse.rotate(p - seed),
            block: id,
            rotation: inverse.rotate_block(rotation),
            mass: props.mass,
            buoyancy: props.buoyancy,
        });
        world_min = world_min.min(p);
        world_max = world_max.max(p);

        for n in NEIGHBORS_6.map(|d| p + d) {
            if limits.in_window(seed, n) && limits.in_world(n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    // Queued cells are already inside the window; only air and unknown blocks may be left over.
    let truncated = structure.len() >= limits.max_blocks && queue.iter().any(|&p| capturable(p));
    info!(
        world = world.name(),
        blocks = structure.len(),
        truncated,
        ?world_min,
        ?world_max,
        "structure assembled"
    );
    Assembly { structure, truncated, world_min, world_max }
}
