use std::collections::BTreeMap;

use bevy::math::DVec3;
use bevy::prelude::Resource;
use ships::collision::Aabb;
use ships::{PlayerId, PlayerInput, PlayerMovementSink, PlayerSnapshot, PlayerSource, TeleportOptions};

/// Fraction of velocity kept per second.
const VELOCITY_RETENTION: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct SimPlayer {
    pub name: String,
    pub world: String,
    pub position: DVec3,
    pub velocity: DVec3,
    pub head_yaw: f64,
    pub input: PlayerInput,
}

#[derive(Resource, Debug, Default)]
pub struct SimPlayers {
    players: BTreeMap<PlayerId, SimPlayer>,
}

impl SimPlayers {
    pub fn join(&mut self, name: &str, world: &str, position: DVec3) -> PlayerId {
        let id = PlayerId::new_v4();
        self.players.insert(
            id,
            SimPlayer {
                name: name.to_owned(),
                world: world.to_owned(),
                position,
                velocity: DVec3::ZERO,
                head_yaw: 0.0,
                input: PlayerInput::default(),
            },
        );
        id
    }

    pub fn leave(&mut self, id: PlayerId) -> Option<SimPlayer> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&SimPlayer> {
        self.players.get(&id)
    }

    pub fn set_input(&mut self, id: PlayerId, input: PlayerInput) {
        if let Some(p) = self.players.get_mut(&id) {
            p.input = input;
        }
    }

    /// Integrate velocity into position, then let it decay. No gravity.
    pub fn step(&mut self, dt: f64) {
        let keep = VELOCITY_RETENTION.powf(dt);
        for p in self.players.values_mut() {
            p.position += p.velocity * dt;
            p.velocity *= keep;
        }
    }

    pub fn bounds() -> Aabb {
        Aabb::new(DVec3::new(-0.3, 0.0, -0.3), DVec3::new(0.3, 1.8, 0.3))
    }
}

impl PlayerSource for SimPlayers {
    fn snapshot(&self, player: PlayerId, world: &str) -> Option<PlayerSnapshot> {
        let p = self.players.get(&player).filter(|p| p.world == world)?;
        Some(PlayerSnapshot { id: player, position: p.position, bounds: Self::bounds() })
    }

    fn input(&self, player: PlayerId) -> Option<PlayerInput> {
        self.players.get(&player).map(|p| p.input)
    }

    fn players_in(&self, world: &str) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .filter(|(_, p)| p.world == world)
            .map(|(&id, p)| PlayerSnapshot { id, position: p.position, bounds: Self::bounds() })
            .collect()
    }
}

impl PlayerMovementSink for SimPlayers {
    fn teleport(&mut self, player: PlayerId, position: DVec3, options: TeleportOptions) {
        let Some(p) = self.players.get_mut(&player) else {
            return;
        };
        p.position = position;
        if !options.preserve_velocity {
            p.velocity = DVec3::ZERO;
        }
        if let Some(yaw) = options.head_yaw {
            p.head_yaw = yaw;
        }
    }

    fn add_velocity(&mut self, player: PlayerId, delta: DVec3) {
        if let Some(p) = self.players.get_mut(&player) {
            p.velocity += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teleport_respects_options() {
        let mut players = SimPlayers::default();
        let id = players.join("a", "w", DVec3::ZERO);
        players.add_velocity(id, DVec3::X);

        players.teleport(id, DVec3::Y, TeleportOptions { preserve_velocity: true, head_yaw: Some(12.0) });
        let p = players.get(id).expect("joined");
        assert_eq!((p.position, p.velocity, p.head_yaw), (DVec3::Y, DVec3::X, 12.0));

        players.teleport(id, DVec3::Z, TeleportOptions::default());
        assert_eq!(players.get(id).map(|p| p.velocity), Some(DVec3::ZERO));
        assert!(players.snapshot(id, "elsewhere").is_none());
    }
}
