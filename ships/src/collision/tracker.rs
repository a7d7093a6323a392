use std::collections::HashMap;

use bevy_math::DVec3;

use crate::PlayerId;

/// Last position the collision pass accepted for each player.
#[derive(Debug, Clone, Default)]
pub struct PlayerMotionTracker {
    last: HashMap<PlayerId, DVec3>,
}

impl PlayerMotionTracker {
    /// Motion since the last commit. First sighting records `position` and reports no motion.
    pub fn observe(&mut self, player: PlayerId, position: DVec3) -> DVec3 {
        let last = *self.last.entry(player).or_insert(position);
        position - last
    }

    pub fn commit(&mut self, player: PlayerId, position: DVec3) {
        self.last.insert(player, position);
    }

    pub fn forget(&mut self, player: PlayerId) -> bool {
        self.last.remove(&player).is_some()
    }

    pub fn last_position(&self, player: PlayerId) -> Option<DVec3> {
        self.last.get(&player).copied()
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}
