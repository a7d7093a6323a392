//! Fixed-step simulation systems driving the ship registry.

use bevy::app::AppExit;
use bevy_ecs::prelude::*;
use ships::{Host, TickSummary, VoxelWorld};
use tracing::{info, warn};

use crate::config::Config;
use crate::parts::PartStore;
use crate::players::SimPlayers;
use crate::world::{CatalogTable, GridWorld};
use crate::{Args, Ships};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimSet;

#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    pub dt: f64,
    /// Ticks completed so far.
    pub tick: u64,
}

/// Running totals over all ticks.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SimStats {
    pub ticks: u64,
    pub activations: u64,
    pub dockings: u64,
    pub moved_ship_ticks: u64,
    pub pilot_exits: u64,
    pub sessions_torn_down: u64,
    pub seat_snaps: u64,
    pub player_corrections: u64,
    pub errors: u64,
}

impl SimStats {
    fn absorb(&mut self, s: &TickSummary) {
        self.ticks += 1;
        self.activations += s.activated as u64;
        self.dockings += s.docked as u64;
        self.moved_ship_ticks += s.moved as u64;
        self.pilot_exits += s.exits as u64;
        self.sessions_torn_down += s.torn_down as u64;
        self.seat_snaps += s.seat_snaps as u64;
        self.errors += s.errors.len() as u64;
    }
}

pub fn step_players(clock: Res<SimClock>, mut players: ResMut<SimPlayers>) {
    players.step(clock.dt);
}

pub fn tick_ships(
    ships: Res<Ships>,
    clock: Res<SimClock>,
    mut world: ResMut<GridWorld>,
    catalog: Res<CatalogTable>,
    mut parts: ResMut<PartStore>,
    mut players: ResMut<SimPlayers>,
    mut stats: ResMut<SimStats>,
) {
    let mut registry = ships.0.lock();
    let mut host = Host {
        world: &mut *world,
        catalog: &*catalog,
        spawner: &mut *parts,
        players: &mut *players,
    };
    let summary = registry.tick(&mut host, clock.dt);
    for err in &summary.errors {
        warn!(%err, "Ship tick error");
    }
    stats.absorb(&summary);
}

pub fn resolve_players(
    ships: Res<Ships>,
    world: Res<GridWorld>,
    mut players: ResMut<SimPlayers>,
    mut stats: ResMut<SimStats>,
) {
    let corrected = ships.0.lock().resolve_player_collisions(world.name(), &mut *players);
    stats.player_corrections += corrected as u64;
}

pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick += 1;
}

pub fn report(clock: Res<SimClock>, cfg: Res<Config>, stats: Res<SimStats>, ships: Res<Ships>, parts: Res<PartStore>) {
    let every = cfg.stats_interval_ticks;
    if every == 0 || clock.tick % every != 0 {
        return;
    }
    let registry = ships.0.lock();
    let active = registry.ships().filter(|s| s.is_active()).count();
    info!(
        tick = clock.tick,
        ships = registry.len(),
        active,
        pilots = registry.sessions().len(),
        parts = parts.len(),
        ?stats,
        "Simulation stats"
    );
}

pub fn stop_after_ticks(args: Option<Res<Args>>, clock: Res<SimClock>, mut exit: EventWriter<AppExit>) {
    let Some(limit) = args.and_then(|a| a.ticks) else {
        return;
    };
    if clock.tick >= limit {
        info!(tick = clock.tick, "Tick limit reached, exiting");
        exit.write(AppExit::Success);
    }
}
