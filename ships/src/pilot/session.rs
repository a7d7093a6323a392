use std::collections::HashMap;

use bevy_math::{DVec3, IVec3};

use crate::{PlayerId, ShipId};

/// State of one player at one helm.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotSession {
    pub player: PlayerId,
    pub ship: ShipId,
    pub world: String,
    pub helm: IVec3,
    /// Seat position last handed to the player.
    pub anchor: DVec3,
    pub last_head_yaw: f64,
    /// Reserved for a steering wheel control; always 0 today.
    pub wheel_angle: f64,
    /// Quantized throttle in `-max..=max`.
    pub throttle_step: i32,
    pub(crate) last_forward: bool,
    pub(crate) last_backward: bool,
    pub(crate) last_crouching: bool,
    pub docking_requested: bool,
}

impl PilotSession {
    pub fn new(player: PlayerId, ship: ShipId, world: &str, helm: IVec3, anchor: DVec3, head_yaw: f64) -> Self {
        Self {
            player,
            ship,
            world: world.to_owned(),
            helm,
            anchor,
            last_head_yaw: head_yaw,
            wheel_angle: 0.0,
            throttle_step: 0,
            last_forward: false,
            last_backward: false,
            last_crouching: false,
            docking_requested: false,
        }
    }

    pub fn request_docking(&mut self) {
        self.docking_requested = true;
    }
}

/// Open sessions keyed by player.
#[derive(Debug, Default)]
pub struct PilotSessions {
    sessions: HashMap<PlayerId, PilotSession>,
}

impl PilotSessions {
    pub fn start(&mut self, session: PilotSession) -> Option<PilotSession> {
        self.sessions.insert(session.player, session)
    }

    pub fn get(&self, player: PlayerId) -> Option<&PilotSession> {
        self.sessions.get(&player)
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut PilotSession> {
        self.sessions.get_mut(&player)
    }

    pub fn is_piloting(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    /// Remove the player's session. Idempotent.
    pub fn stop(&mut self, player: PlayerId) -> Option<PilotSession> {
        self.sessions.remove(&player)
    }

    /// Remove the player's session only if it is for `ship`.
    pub fn stop_if(&mut self, player: PlayerId, ship: ShipId) -> Option<PilotSession> {
        match self.sessions.get(&player) {
            Some(s) if s.ship == ship => self.sessions.remove(&player),
            _ => None,
        }
    }

    pub fn players(&self) -> Vec<PlayerId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &PilotSession> + '_ {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
