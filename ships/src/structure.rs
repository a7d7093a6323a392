//! Captured block set in ship-local coordinates.

use std::collections::HashMap;
use std::sync::OnceLock;

use bevy_math::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::host::BlockId;
use crate::math::pack_cell;

/// One captured block, relative to the helm cell in the helm's own frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBlock {
    pub offset: IVec3,
    pub block: BlockId,
    /// Grid rotation relative to the helm (0..=3).
    pub rotation: u8,
    pub mass: f64,
    pub buoyancy: f64,
}

impl LocalBlock {
    fn center(&self) -> DVec3 {
        self.offset.as_dvec3() + DVec3::splat(0.5)
    }
}

/// Inclusive min/max block offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl LocalBounds {
    fn around(p: IVec3) -> Self {
        Self { min: p, max: p }
    }

    fn extend(&mut self, p: IVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Structure {
    blocks: HashMap<u64, LocalBlock>,
    total_mass: f64,
    /// Mass-weighted sum of block centers.
    moment: DVec3,
    bounds: OnceLock<LocalBounds>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = LocalBlock>) -> Self {
        let mut s = Self::new();
        for b in blocks {
            s.insert(b);
        }
        s
    }

    /// Insert or replace the block at `block.offset`. Returns the replaced block.
    pub fn insert(&mut self, block: LocalBlock) -> Option<LocalBlock> {
        let previous = self.blocks.insert(pack_cell(block.offset), block);
        if let Some(old) = previous {
            self.unaccount(&old);
        }
        self.account(&block);
        if previous.is_none() {
            if let Some(bounds) = self.bounds.get_mut() {
                bounds.extend(block.offset);
            }
        }
        previous
    }

    pub fn remove(&mut self, offset: IVec3) -> Option<LocalBlock> {
        let removed = self.blocks.remove(&pack_cell(offset))?;
        self.unaccount(&removed);
        self.bounds = OnceLock::new();
        if self.blocks.is_empty() {
            self.total_mass = 0.0;
            self.moment = DVec3::ZERO;
        }
        Some(removed)
    }

    pub fn get(&self, offset: IVec3) -> Option<&LocalBlock> {
        self.blocks.get(&pack_cell(offset))
    }

    pub fn contains(&self, offset: IVec3) -> bool {
        self.blocks.contains_key(&pack_cell(offset))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalBlock> + '_ {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    /// Summed buoyancy. Diagnostic only.
    pub fn total_buoyancy(&self) -> f64 {
        self.blocks.values().map(|b| b.buoyancy).sum()
    }

    /// Mass-weighted centroid of block centers; the origin when the structure has no mass.
    pub fn center_of_mass(&self) -> DVec3 {
        if self.total_mass <= 0.0 {
            return DVec3::ZERO;
        }
        self.moment / self.total_mass
    }

    /// Min/max block offsets, computed on first query after a mutation.
    /// All zero for an empty structure.
    pub fn bounds(&self) -> LocalBounds {
        *self.bounds.get_or_init(|| {
            let mut it = self.blocks.values().map(|b| b.offset);
            match it.next() {
                Some(first) => it.fold(LocalBounds::around(first), |mut acc, p| {
                    acc.extend(p);
                    acc
                }),
                None => LocalBounds::default(),
            }
        })
    }

    fn account(&mut self, b: &LocalBlock) {
        if b.mass > 0.0 {
            self.total_mass += b.mass;
            self.moment += b.center() * b.mass;
        }
    }

    fn unaccount(&mut self, b: &LocalBlock) {
        if b.mass > 0.0 {
            self.total_mass -= b.mass;
            self.moment -= b.center() * b.mass;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: i32, y: i32, z: i32, mass: f64) -> LocalBlock {
        LocalBlock {
            offset: IVec3::new(x, y, z),
            block: 1,
            rotation: 0,
            mass,
            buoyancy: 0.5,
        }
    }

    #[test]
    fn empty_structure_has_zero_center_and_bounds() {
        let s = Structure::new();
        assert_eq!(s.center_of_mass(), DVec3::ZERO);
        assert_eq!(s.bounds(), LocalBounds::default());
        assert_eq!(s.total_buoyancy(), 0.0);
    }

    #[test]
    fn massless_blocks_keep_center_at_origin() {
        let s = Structure::from_blocks([block(3, 0, 0, 0.0), block(4, 0, 0, 0.0)]);
        assert_eq!(s.center_of_mass(), DVec3::ZERO);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn center_of_mass_tracks_inserts_and_removes() {
        let mut s = Structure::from_blocks([block(0, 0, 0, 1.0), block(2, 0, 0, 1.0)]);
        assert!((s.center_of_mass() - DVec3::new(1.5, 0.5, 0.5)).length() < 1e-12);

        s.insert(block(2, 0, 0, 3.0));
        assert_eq!(s.len(), 2, "re-insert replaces in place");
        assert!((s.total_mass() - 4.0).abs() < 1e-12);
        assert!((s.center_of_mass().x - (0.5 + 2.5 * 3.0) / 4.0).abs() < 1e-12);

        s.remove(IVec3::new(2, 0, 0));
        assert!((s.center_of_mass() - DVec3::splat(0.5)).length() < 1e-12);
        s.remove(IVec3::ZERO);
        assert_eq!(s.center_of_mass(), DVec3::ZERO);
    }

    #[test]
    fn bounds_follow_mutations() {
        let mut s = Structure::from_blocks([block(0, 0, 0, 1.0), block(-2, 1, 3, 1.0)]);
        assert_eq!(
            s.bounds(),
            LocalBounds { min: IVec3::new(-2, 0, 0), max: IVec3::new(0, 1, 3) }
        );
        s.insert(block(5, -1, 0, 1.0));
        assert_eq!(s.bounds().max.x, 5);
        assert_eq!(s.bounds().min.y, -1);
        s.remove(IVec3::new(5, -1, 0));
        assert_eq!(s.bounds().max.x, 0);
        assert_eq!(s.bounds().min.y, 0);
    }
}
