//! Generated voxel terrain with sparse edits, and the block table.

use std::collections::HashMap;

use bevy::math::IVec3;
use bevy::prelude::Resource;
use ships::{BlockCatalog, BlockId, BlockProperties, CellState, VoxelWorld};

use crate::config::WorldConfig;

pub mod blocks {
    use ships::BlockId;

    pub const HELM: BlockId = 1;
    pub const PLANK: BlockId = 2;
    pub const STONE: BlockId = 3;
    pub const WATER: BlockId = 4;
    pub const MAST: BlockId = 5;
}

#[derive(Resource, Debug)]
pub struct GridWorld {
    cfg: WorldConfig,
    /// `None` marks a cell cleared to air over generated terrain.
    edits: HashMap<IVec3, Option<(BlockId, u8)>>,
}

impl GridWorld {
    pub fn new(cfg: WorldConfig) -> Self {
        Self { cfg, edits: HashMap::new() }
    }

    fn generated(&self, pos: IVec3) -> CellState {
        if pos.y <= self.cfg.ground_y {
            CellState::Block { id: blocks::STONE, rotation: 0 }
        } else if pos.y <= self.cfg.sea_level {
            CellState::Block { id: blocks::WATER, rotation: 0 }
        } else {
            CellState::Empty
        }
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }
}

impl VoxelWorld for GridWorld {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn cell(&self, pos: IVec3) -> CellState {
        let r = self.cfg.loaded_radius;
        if pos.x.abs() >= r || pos.z.abs() >= r || pos.y < self.cfg.min_y || pos.y >= self.cfg.max_y {
            return CellState::Unloaded;
        }
        match self.edits.get(&pos) {
            Some(Some((id, rotation))) => CellState::Block { id: *id, rotation: *rotation },
            Some(None) => CellState::Empty,
            None => self.generated(pos),
        }
    }

    fn set_block(&mut self, pos: IVec3, id: BlockId, rotation: u8) {
        if self.is_loaded(pos) {
            self.edits.insert(pos, Some((id, rotation & 3)));
        }
    }

    fn clear_block(&mut self, pos: IVec3) {
        if !self.is_loaded(pos) {
            return;
        }
        if self.generated(pos).is_empty() {
            self.edits.remove(&pos);
        } else {
            self.edits.insert(pos, None);
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct CatalogTable {
    blocks: HashMap<BlockId, BlockProperties>,
}

impl CatalogTable {
    pub fn standard() -> Self {
        let solid = |mass, buoyancy| BlockProperties { solid: true, mass, buoyancy };
        Self {
            blocks: HashMap::from([
                (blocks::HELM, solid(2.0, 0.2)),
                (blocks::PLANK, solid(1.0, 0.6)),
                (blocks::STONE, solid(4.0, 0.0)),
                (blocks::WATER, BlockProperties { solid: false, mass: 0.0, buoyancy: 0.0 }),
                (blocks::MAST, solid(1.5, 0.3)),
            ]),
        }
    }
}

impl BlockCatalog for CatalogTable {
    fn resolve(&self, id: BlockId) -> Option<BlockProperties> {
        self.blocks.get(&id).copied()
    }
}
