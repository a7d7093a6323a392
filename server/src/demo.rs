//! Scripted voyage: build a small hull just above the sea, board it, sail, turn
//! and dock. Gives the headless host something to simulate.

use bevy::math::{DVec3, IVec3};
use bevy::prelude::*;
use ships::{HelmInteraction, Orientation, PlayerId, PlayerInput, VoxelWorld};
use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::players::SimPlayers;
use crate::sim::{SimClock, SimSet};
use crate::world::{blocks, CatalogTable, GridWorld};
use crate::Ships;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DemoSet;

#[derive(Resource, Debug, Clone, Copy)]
pub struct DemoCrew {
    pub pilot: PlayerId,
    pub passenger: PlayerId,
    pub helm: IVec3,
}

#[derive(Resource, Debug, Clone)]
struct DemoScript(DemoConfig);

pub struct DemoPlugin(pub DemoConfig);

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DemoScript(self.0.clone()))
            .configure_sets(Update, DemoSet.before(SimSet))
            .add_systems(Startup, setup_demo)
            .add_systems(Update, drive_demo.in_set(DemoSet));
    }
}

/// Seven-long, three-wide deck with a helm at the stern and a two-high mast
/// amidships, bow toward +Z.
pub fn build_demo_hull(world: &mut dyn VoxelWorld, helm: IVec3) -> usize {
    let mut placed = 0;
    for x in -1..=1 {
        for z in 0..=6 {
            let id = if (x, z) == (0, 0) { blocks::HELM } else { blocks::PLANK };
            world.set_block(helm + IVec3::new(x, 0, z), id, Orientation::NORTH.index());
            placed += 1;
        }
    }
    for y in 1..=2 {
        world.set_block(helm + IVec3::new(0, y, 3), blocks::MAST, 0);
        placed += 1;
    }
    placed
}

fn setup_demo(
    mut commands: Commands,
    script: Res<DemoScript>,
    mut world: ResMut<GridWorld>,
    mut players: ResMut<SimPlayers>,
) {
    let [x, y, z] = script.0.helm;
    let helm = IVec3::new(x, y, z);
    let placed = build_demo_hull(&mut *world, helm);

    let deck = helm.as_dvec3() + DVec3::new(0.5, 1.0, 0.5);
    let pilot = players.join("pilot", world.name(), deck - DVec3::Z);
    let passenger = players.join("passenger", world.name(), deck + DVec3::new(1.0, 0.0, 4.0));
    commands.insert_resource(DemoCrew { pilot, passenger, helm });
    info!(?helm, placed, %pilot, %passenger, "Demo hull built");
}

fn drive_demo(
    script: Res<DemoScript>,
    crew: Option<Res<DemoCrew>>,
    clock: Res<SimClock>,
    ships: Res<Ships>,
    world: Res<GridWorld>,
    catalog: Res<CatalogTable>,
    mut players: ResMut<SimPlayers>,
) {
    let Some(crew) = crew else {
        return;
    };
    let cfg = &script.0;
    let t = clock.tick;

    if t == 1 || t == cfg.dock_at_tick {
        let yaw = players.get(crew.pilot).map_or(0.0, |p| p.head_yaw);
        let outcome = ships.0.lock().interact_helm(&*world, &*catalog, crew.pilot, crew.helm, yaw);
        match outcome {
            Ok(HelmInteraction::Boarded { ship, created }) => info!(%ship, created, "Demo pilot boarded"),
            Ok(HelmInteraction::DockingRequested { ship }) => info!(%ship, "Demo pilot asked to dock"),
            Ok(HelmInteraction::Ignored) => {}
            Err(err) => warn!(%err, "Demo helm use failed"),
        }
    }

    // Throttle is edge-triggered: alternate press and release.
    let press_window = 10..10 + 2 * u64::from(cfg.throttle_steps);
    let forward = if press_window.contains(&t) && t % 2 == 0 { 1.0 } else { 0.0 };
    let turning = (cfg.turn_at_tick..cfg.turn_at_tick + cfg.turn_ticks).contains(&t);
    let head_yaw = players.get(crew.pilot).map_or(0.0, |p| p.head_yaw);
    players.set_input(
        crew.pilot,
        PlayerInput { forward, right: if turning { 1.0 } else { 0.0 }, head_yaw, crouching: false },
    );
}
