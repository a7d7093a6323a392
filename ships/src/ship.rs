//! One ship: structure, frame, motion state and lifecycle wired together.

use bevy_math::{DVec3, IVec3};
use tracing::debug;

use crate::collision::{CollisionSpec, HullCollider, PlayerProbe, ShipMotion, WorldProbe};
use crate::error::ShipError;
use crate::geometry::{GeometryState, ShipGeometry};
use crate::host::{BlockCatalog, EntitySpawner, VoxelWorld};
use crate::lifecycle::{ActivePart, DockedPose, ShipLifecycle, ShipMode};
use crate::math::wrap_degrees;
use crate::orientation::Orientation;
use crate::physics::{apply_controls, tick_movement, MovementOutcome, ShipControls};
use crate::structure::Structure;
use crate::tuning::ShipTuning;
use crate::ShipId;

/// What one [`Ship::tick`] did. Every field is `None` when that step did not run.
#[derive(Debug, Default)]
pub struct ShipTickReport {
    pub activation: Option<Result<usize, ShipError>>,
    pub movement: Option<MovementOutcome>,
    pub docking: Option<Result<DockedPose, ShipError>>,
}

#[derive(Debug)]
pub struct Ship {
    id: ShipId,
    world: String,
    /// Cell the helm was last placed at (capture or dock); the registry key.
    helm_key: IVec3,
    structure: Structure,
    geometry: ShipGeometry,
    collider: HullCollider,
    state: GeometryState,
    lifecycle: ShipLifecycle,
    activation_requested: bool,
    docking_requested: bool,
    active_ticks: u64,
}

impl Ship {
    pub fn new(id: ShipId, world: &str, helm: IVec3, helm_orientation: Orientation, structure: Structure) -> Self {
        let yaw = wrap_degrees(helm_orientation.yaw_deg());
        let geometry = ShipGeometry::new(&structure, helm);
        let collider = HullCollider::new(&structure, geometry.pivot);
        let state = GeometryState::at_rest(geometry.origin_for_helm(helm, yaw), yaw);
        Self {
            id,
            world: world.to_owned(),
            helm_key: helm,
            structure,
            geometry,
            collider,
            state,
            lifecycle: ShipLifecycle::default(),
            activation_requested: false,
            docking_requested: false,
            active_ticks: 0,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn helm_key(&self) -> IVec3 {
        self.helm_key
    }

    pub(crate) fn set_helm_key(&mut self, helm: IVec3) {
        self.helm_key = helm;
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn geometry(&self) -> &ShipGeometry {
        &self.geometry
    }

    pub fn state(&self) -> &GeometryState {
        &self.state
    }

    pub fn mode(&self) -> ShipMode {
        self.lifecycle.mode()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn parts(&self) -> &[ActivePart] {
        self.lifecycle.parts()
    }

    pub fn helm_world_position(&self) -> DVec3 {
        self.geometry.helm_world_position(&self.state)
    }

    pub fn pilot_anchor(&self, anchor_radius: f64) -> DVec3 {
        self.geometry.pilot_anchor(&self.state, anchor_radius)
    }

    pub fn request_activation(&mut self) {
        self.activation_requested = true;
    }

    pub fn request_docking(&mut self) {
        self.docking_requested = true;
    }

    /// Pending activation, then (if Active) controls, movement, part
    /// transforms and any pending docking, in that order. `controls` of
    /// `None` coasts on zero input.
    pub fn tick(
        &mut self,
        tuning: &ShipTuning,
        world: &mut dyn VoxelWorld,
        catalog: &dyn BlockCatalog,
        spawner: &mut dyn EntitySpawner,
        controls: Option<ShipControls>,
        dt: f64,
    ) -> ShipTickReport {
        let mut report = ShipTickReport::default();

        if std::mem::take(&mut self.activation_requested) && !self.is_active() {
            report.activation = Some(self.lifecycle.activate(
                self.id,
                world,
                spawner,
                &self.structure,
                &self.geometry,
                &self.state,
            ));
        }

        if !self.is_active() {
            self.docking_requested = false;
            return report;
        }

        apply_controls(&tuning.physics, &mut self.state, controls.unwrap_or_default(), dt);
        let probe = WorldProbe {
            world: &*world,
            catalog,
            structure: &self.structure,
            pivot: self.geometry.pivot,
        };
        report.movement = Some(tick_movement(&tuning.physics, &mut self.state, &probe, dt));
        self.lifecycle.update_transforms(spawner, &self.geometry, &self.state);

        self.active_ticks += 1;
        let every = tuning.telemetry_interval_ticks;
        if every > 0 && self.active_ticks % every == 0 {
            debug!(
                ship_id = %self.id,
                origin = ?self.state.origin,
                yaw = self.state.yaw,
                speed = self.state.speed,
                "ship telemetry"
            );
        }

        if self.docking_requested {
            self.docking_requested = false;
            report.docking = Some(self.lifecycle.try_dock(
                self.id,
                world,
                spawner,
                &self.structure,
                &self.geometry,
                &mut self.state,
            ));
        }

        report
    }

    /// Corrected feet position for a player near this ship, if any. Dormant ships never correct.
    pub fn resolve_player(&self, spec: &CollisionSpec, player: PlayerProbe) -> Option<DVec3> {
        if !self.is_active() {
            return None;
        }
        self.collider
            .resolve_player(&self.structure, spec, ShipMotion::of(&self.state), player)
    }
}
