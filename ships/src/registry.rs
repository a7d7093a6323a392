//! Every ship, pilot assignment and pilot session of one engine instance.
//!
//! The registry is the only entry point a host needs: it resolves helm use
//! into ships and sessions, runs the per-tick pipeline and the player
//! collision pass. All host access goes through [`Host`] and the traits in
//! [`crate::host`].

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use bevy_math::{DVec3, IVec3};
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::collision::{PlayerMotionTracker, PlayerProbe};
use crate::error::ShipError;
use crate::host::{
    BlockCatalog, CellState, Host, HostCapabilities, PlayerHost, TeleportOptions, VoxelWorld,
};
use crate::orientation::Orientation;
use crate::physics::{ShipControls, Translation};
use crate::pilot::{seat_correction, update_input, PilotAction, PilotSession, PilotSessions, SeatCorrection};
use crate::ship::Ship;
use crate::structure::Structure;
use crate::tuning::ShipTuning;
use crate::{PlayerId, ShipId};

/// Result of a player using a helm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelmInteraction {
    /// The player now pilots `ship`. `created` is set when the use assembled a new ship.
    Boarded { ship: ShipId, created: bool },
    /// The player was already piloting; docking is attempted on the next tick.
    DockingRequested { ship: ShipId },
    /// Dropped by the per-player cooldown.
    Ignored,
}

/// Counters and errors from one [`ShipRegistry::tick`].
#[derive(Debug, Default)]
pub struct TickSummary {
    pub ships_ticked: usize,
    pub active_ships: usize,
    pub moved: usize,
    pub activated: usize,
    pub docked: usize,
    /// Sessions ended by the pilot (crouch) this tick.
    pub exits: usize,
    /// Sessions ended because their ship, player or activation went away.
    pub torn_down: usize,
    pub seat_snaps: usize,
    pub seat_nudges: usize,
    pub errors: Vec<ShipError>,
}

#[derive(Debug, Default)]
pub struct ShipRegistry {
    tuning: ShipTuning,
    capabilities: HostCapabilities,
    ships: BTreeMap<ShipId, Ship>,
    helm_index: HashMap<String, HashMap<IVec3, ShipId>>,
    pilots: HashMap<ShipId, PlayerId>,
    sessions: PilotSessions,
    tracker: PlayerMotionTracker,
    last_use: HashMap<PlayerId, f64>,
    /// Simulated seconds, advanced by [`ShipRegistry::tick`].
    clock: f64,
}

impl ShipRegistry {
    pub fn new(tuning: ShipTuning, capabilities: HostCapabilities) -> Self {
        Self { tuning, capabilities, ..Default::default() }
    }

    pub fn tuning(&self) -> &ShipTuning {
        &self.tuning
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Register a Dormant ship whose helm sits at `helm`.
    pub fn create_ship(&mut self, world: &str, helm: IVec3, helm_orientation: Orientation, structure: Structure) -> ShipId {
        let id = ShipId::new_v4();
        let blocks = structure.len();
        self.ships.insert(id, Ship::new(id, world, helm, helm_orientation, structure));
        if let Some(previous) = self.helm_index.entry(world.to_owned()).or_default().insert(helm, id) {
            warn!(ship_id = %id, %previous, ?helm, "helm cell re-registered");
        }
        info!(ship_id = %id, world, ?helm, blocks, "ship created");
        id
    }

    pub fn get(&self, ship: ShipId) -> Option<&Ship> {
        self.ships.get(&ship)
    }

    pub fn get_mut(&mut self, ship: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(&ship)
    }

    /// Ships in id order.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.ships.values()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn ship_by_helm(&self, world: &str, helm: IVec3) -> Option<ShipId> {
        self.helm_index.get(world)?.get(&helm).copied()
    }

    /// Closest ship in `world` whose current helm position lies within `radius` of `pos`.
    pub fn nearest_ship_by_helm(&self, world: &str, pos: DVec3, radius: f64) -> Option<ShipId> {
        let mut best: Option<(f64, ShipId)> = None;
        for ship in self.ships.values().filter(|s| s.world() == world) {
            let d = ship.helm_world_position().distance_squared(pos);
            if d <= radius * radius && best.map_or(true, |(b, _)| d < b) {
                best = Some((d, ship.id()));
            }
        }
        best.map(|(_, id)| id)
    }

    pub fn pilot_of(&self, ship: ShipId) -> Option<PlayerId> {
        self.pilots.get(&ship).copied()
    }

    pub fn sessions(&self) -> &PilotSessions {
        &self.sessions
    }

    pub fn tracker(&self) -> &PlayerMotionTracker {
        &self.tracker
    }

    /// Claim `ship` for `player`. First claim wins; re-claiming your own ship succeeds.
    pub fn try_assign_pilot(&mut self, ship: ShipId, player: PlayerId) -> Result<(), ShipError> {
        if !self.ships.contains_key(&ship) {
            return Err(ShipError::UnknownShip(ship));
        }
        match self.pilots.entry(ship) {
            Entry::Vacant(e) => {
                e.insert(player);
                Ok(())
            }
            Entry::Occupied(e) if *e.get() == player => Ok(()),
            Entry::Occupied(e) => {
                let pilot = *e.get();
                warn!(ship_id = %ship, %player, %pilot, "helm already taken");
                Err(ShipError::AssignmentConflict { ship, pilot })
            }
        }
    }

    /// Drop the assignment only if `player` holds it.
    pub fn release_pilot(&mut self, ship: ShipId, player: PlayerId) -> bool {
        match self.pilots.get(&ship) {
            Some(&p) if p == player => {
                self.pilots.remove(&ship);
                true
            }
            _ => false,
        }
    }

    /// A player used the block at `helm`.
    ///
    /// Piloting players request docking. Otherwise the ship registered at
    /// `helm` is boarded. When `helm` is a helm with no ship, or empty because
    /// its ship sailed off, the nearest ship whose helm is within range is
    /// boarded instead; any other block never reaches that search. Failing
    /// both, a new ship is assembled from `helm`.
    pub fn interact_helm(
        &mut self,
        world: &dyn VoxelWorld,
        catalog: &dyn BlockCatalog,
        player: PlayerId,
        helm: IVec3,
        head_yaw: f64,
    ) -> Result<HelmInteraction, ShipError> {
        if let Some(&last) = self.last_use.get(&player) {
            if self.clock - last < self.tuning.interact_cooldown_secs {
                debug!(%player, "helm use on cooldown");
                return Ok(HelmInteraction::Ignored);
            }
        }
        self.last_use.insert(player, self.clock);

        if let Some(session) = self.sessions.get_mut(player) {
            session.request_docking();
            info!(%player, ship_id = %session.ship, "docking requested");
            return Ok(HelmInteraction::DockingRequested { ship: session.ship });
        }

        let name = world.name();
        let cell = world.cell(helm);
        let is_helm = match cell {
            CellState::Block { id, .. } => {
                catalog.resolve(id).is_some() && self.tuning.helm_block.map_or(true, |h| h == id)
            }
            _ => false,
        };

        let may_search = is_helm || cell.is_empty();
        let existing = is_helm
            .then(|| self.ship_by_helm(name, helm))
            .flatten()
            .or_else(|| {
                let center = helm.as_dvec3() + DVec3::splat(0.5);
                may_search
                    .then(|| self.nearest_ship_by_helm(name, center, self.tuning.nearest_helm_radius))
                    .flatten()
            });

        let (ship_id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let CellState::Block { rotation, .. } = cell else {
                    return Err(ShipError::ResolutionFailure { world: name.to_owned(), cell: helm });
                };
                if !is_helm {
                    return Err(ShipError::ResolutionFailure { world: name.to_owned(), cell: helm });
                }
                let orientation = Orientation::from_index(i32::from(rotation));
                let assembly = assemble(world, catalog, helm, orientation, &self.tuning.assembly);
                if assembly.structure.is_empty() {
                    return Err(ShipError::ResolutionFailure { world: name.to_owned(), cell: helm });
                }
                (self.create_ship(name, helm, orientation, assembly.structure), true)
            }
        };

        self.try_assign_pilot(ship_id, player)?;
        let anchor_radius = self.tuning.pilot.anchor_radius;
        let ship = self.ships.get_mut(&ship_id).ok_or(ShipError::UnknownShip(ship_id))?;
        ship.request_activation();
        let anchor = ship.pilot_anchor(anchor_radius);
        let helm_cell = ship.geometry().helm_cell(ship.state());
        self.sessions
            .start(PilotSession::new(player, ship_id, name, helm_cell, anchor, head_yaw));

        info!(%player, ship_id = %ship_id, created, "pilot boarded");
        Ok(HelmInteraction::Boarded { ship: ship_id, created })
    }

    /// Forget everything about a player that left. Returns whether they were piloting.
    pub fn disconnect(&mut self, player: PlayerId) -> bool {
        let was_piloting = self.end_session(player, "disconnect");
        self.tracker.forget(player);
        self.last_use.remove(&player);
        was_piloting
    }

    /// Seat nudges never reach the tracker, so a former pilot starts over
    /// as a first sighting.
    fn end_session(&mut self, player: PlayerId, reason: &'static str) -> bool {
        match self.sessions.stop(player) {
            Some(session) => {
                self.release_pilot(session.ship, player);
                self.tracker.forget(player);
                info!(%player, ship_id = %session.ship, reason, "pilot session ended");
                true
            }
            None => false,
        }
    }

    /// One simulation step for every ship and session in `host.world`.
    ///
    /// Sessions are turned into controls first, then ships advance
    /// (activation, movement, docking), then pilots are held on their seats
    /// and finished docking handshakes close their sessions.
    pub fn tick(&mut self, host: &mut Host<'_>, dt: f64) -> TickSummary {
        self.clock += dt;
        let world_name = host.world.name().to_owned();
        let mut summary = TickSummary::default();
        let mut controls: HashMap<ShipId, ShipControls> = HashMap::new();

        for player in self.sessions.players() {
            let Some(session) = self.sessions.get(player) else {
                continue;
            };
            if session.world != world_name {
                continue;
            }
            let ship_id = session.ship;
            let broken = if !self.ships.contains_key(&ship_id) {
                Some("ship no longer exists")
            } else if host.players.snapshot(player, &world_name).is_none() {
                Some("player left the world")
            } else {
                None
            };
            let input = host.players.input(player);
            let reason = broken.or(input.is_none().then_some("no input from player"));
            if let Some(reason) = reason {
                warn!(%player, ship_id = %ship_id, reason, "tearing down pilot session");
                self.end_session(player, reason);
                summary.torn_down += 1;
                summary.errors.push(ShipError::InconsistentSession { player, reason });
                continue;
            }
            let (Some(input), Some(session)) = (input, self.sessions.get_mut(player)) else {
                continue;
            };

            match update_input(&self.tuning.pilot, session, &input) {
                PilotAction::Exit => {
                    self.end_session(player, "exit");
                    summary.exits += 1;
                }
                PilotAction::Steer(c) => {
                    controls.insert(ship_id, c);
                    if session.docking_requested {
                        if let Some(ship) = self.ships.get_mut(&ship_id) {
                            ship.request_docking();
                        }
                    }
                }
            }
        }

        let mut failed_activations = Vec::new();
        let mut rekeyed = Vec::new();
        for ship in self.ships.values_mut().filter(|s| s.world() == world_name) {
            let id = ship.id();
            let report = ship.tick(
                &self.tuning,
                &mut *host.world,
                host.catalog,
                &mut *host.spawner,
                controls.get(&id).copied(),
                dt,
            );
            summary.ships_ticked += 1;

            match report.activation {
                Some(Ok(_)) => summary.activated += 1,
                Some(Err(e)) => {
                    failed_activations.push(id);
                    summary.errors.push(e);
                }
                None => {}
            }
            if let Some(outcome) = report.movement {
                if matches!(outcome.translation, Translation::Moved | Translation::Slid { .. }) {
                    summary.moved += 1;
                }
            }
            match report.docking {
                Some(Ok(pose)) => {
                    summary.docked += 1;
                    rekeyed.push((id, ship.helm_key(), pose.helm));
                    ship.set_helm_key(pose.helm);
                }
                Some(Err(e)) => summary.errors.push(e),
                None => {}
            }
            if ship.is_active() {
                summary.active_ships += 1;
            }
        }

        if let Some(index) = self.helm_index.get_mut(&world_name) {
            for (id, old, new) in rekeyed {
                if index.get(&old) == Some(&id) {
                    index.remove(&old);
                }
                index.insert(new, id);
            }
        }

        for ship in failed_activations {
            if let Some(player) = self.pilots.get(&ship).copied() {
                self.end_session(player, "activation failed");
                summary.torn_down += 1;
            }
        }

        for player in self.sessions.players() {
            let Some(session) = self.sessions.get(player) else {
                continue;
            };
            if session.world != world_name {
                continue;
            }
            let Some(ship) = self.ships.get(&session.ship) else {
                continue;
            };

            if session.docking_requested {
                if !ship.is_active() {
                    self.end_session(player, "docked");
                    continue;
                }
                debug!(%player, ship_id = %ship.id(), "docking refused, still piloting");
            }

            let anchor = ship.pilot_anchor(self.tuning.pilot.anchor_radius);
            if let Some(snapshot) = host.players.snapshot(player, &world_name) {
                match seat_correction(&self.tuning.pilot, anchor, snapshot.position, dt) {
                    SeatCorrection::Hold => {}
                    SeatCorrection::Nudge(v) => {
                        host.players.add_velocity(player, v);
                        summary.seat_nudges += 1;
                    }
                    SeatCorrection::Snap(target) => {
                        let head_yaw = self
                            .capabilities
                            .teleport_head_rotation
                            .then_some(session.last_head_yaw);
                        host.players.teleport(
                            player,
                            target,
                            TeleportOptions { preserve_velocity: true, head_yaw },
                        );
                        self.tracker.commit(player, target);
                        summary.seat_snaps += 1;
                    }
                }
            }

            if let Some(session) = self.sessions.get_mut(player) {
                session.anchor = anchor;
                session.docking_requested = false;
            }
        }

        summary
    }

    /// Push players in `world` out of active hulls and carry them with the
    /// decks they stand on. Pilots are left to the seat lock. Returns how
    /// many players were moved.
    pub fn resolve_player_collisions(&mut self, world: &str, players: &mut dyn PlayerHost) -> usize {
        let spec = self.tuning.collision;
        let mut corrected = 0;
        for snapshot in players.players_in(world) {
            let player = snapshot.id;
            if self.sessions.is_piloting(player) {
                continue;
            }
            let delta = self.tracker.observe(player, snapshot.position);
            let last = snapshot.position - delta;

            let mut position = snapshot.position;
            for ship in self.ships.values().filter(|s| s.world() == world && s.is_active()) {
                let probe = PlayerProbe { position, delta: position - last, bounds: snapshot.bounds };
                if let Some(fixed) = ship.resolve_player(&spec, probe) {
                    position = fixed;
                }
            }

            if position.distance(snapshot.position) > spec.min_correction {
                players.teleport(player, position, TeleportOptions { preserve_velocity: true, head_yaw: None });
                self.tracker.commit(player, position);
                corrected += 1;
            } else {
                self.tracker.commit(player, snapshot.position);
            }
        }
        corrected
    }

    /// Drop every ship, assignment and session without touching the host.
    pub fn clear(&mut self) {
        self.ships.clear();
        self.helm_index.clear();
        self.pilots.clear();
        self.sessions.clear();
        self.tracker.clear();
        self.last_use.clear();
    }
}
