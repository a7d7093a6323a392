use std::collections::HashMap;

use bevy::prelude::Resource;
use ships::{BlockId, EntitySpawner, PartHandle, PartTransform, SpawnError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPart {
    pub block: BlockId,
    pub transform: PartTransform,
}

/// Live ship parts, bounded by `limit`.
#[derive(Resource, Debug)]
pub struct PartStore {
    parts: HashMap<PartHandle, SimPart>,
    next: u64,
    limit: usize,
}

impl PartStore {
    pub fn with_limit(limit: usize) -> Self {
        Self { parts: HashMap::new(), next: 0, limit }
    }

    pub fn get(&self, handle: PartHandle) -> Option<&SimPart> {
        self.parts.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl EntitySpawner for PartStore {
    fn spawn_part(&mut self, block: BlockId, transform: PartTransform) -> Result<PartHandle, SpawnError> {
        if self.parts.len() >= self.limit {
            return Err(SpawnError { reason: format!("part limit of {} reached", self.limit) });
        }
        self.next += 1;
        let handle = PartHandle(self.next);
        self.parts.insert(handle, SimPart { block, transform });
        Ok(handle)
    }

    fn despawn_part(&mut self, part: PartHandle) {
        self.parts.remove(&part);
    }

    fn update_part(&mut self, part: PartHandle, transform: PartTransform) {
        if let Some(p) = self.parts.get_mut(&part) {
            p.transform = transform;
        }
    }
}
