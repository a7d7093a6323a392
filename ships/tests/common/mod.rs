#![allow(dead_code)]

use std::collections::HashMap;

use bevy_math::{DVec3, IVec3};
use ships::collision::Aabb;
use ships::{
    BlockCatalog, BlockId, BlockProperties, CellState, EntitySpawner, Orientation, PartHandle, PartTransform,
    PlayerId, PlayerInput, PlayerMovementSink, PlayerSnapshot, PlayerSource, SpawnError, TeleportOptions,
    VoxelWorld,
};

pub const HELM: BlockId = 1;
pub const PLANK: BlockId = 2;
pub const STONE: BlockId = 3;
pub const WATER: BlockId = 4;
/// Placed in the world but unknown to the catalog.
pub const MYSTERY: BlockId = 99;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sparse world with a box-shaped loaded region.
pub struct TestWorld {
    name: String,
    cells: HashMap<IVec3, (BlockId, u8)>,
    loaded_min: IVec3,
    loaded_max: IVec3,
}

impl TestWorld {
    pub fn new(name: &str) -> Self {
        Self::with_loaded(name, IVec3::new(-128, 0, -128), IVec3::new(128, 256, 128))
    }

    /// `min` inclusive, `max` exclusive.
    pub fn with_loaded(name: &str, min: IVec3, max: IVec3) -> Self {
        Self { name: name.to_owned(), cells: HashMap::new(), loaded_min: min, loaded_max: max }
    }

    /// Move the loaded box, as if chunks were loaded or dropped. Blocks
    /// outside it are kept but read as unloaded.
    pub fn set_loaded(&mut self, min: IVec3, max: IVec3) {
        self.loaded_min = min;
        self.loaded_max = max;
    }

    pub fn place(&mut self, pos: IVec3, id: BlockId) {
        self.set_block(pos, id, 0);
    }

    /// Fill the inclusive box `a..=b`.
    pub fn fill(&mut self, a: IVec3, b: IVec3, id: BlockId) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.place(IVec3::new(x, y, z), id);
                }
            }
        }
    }

    pub fn block_at(&self, pos: IVec3) -> Option<(BlockId, u8)> {
        self.cells.get(&pos).copied()
    }

    pub fn count(&self, id: BlockId) -> usize {
        self.cells.values().filter(|(b, _)| *b == id).count()
    }
}

impl VoxelWorld for TestWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, pos: IVec3) -> CellState {
        let inside = pos.cmpge(self.loaded_min).all() && pos.cmplt(self.loaded_max).all();
        if !inside {
            return CellState::Unloaded;
        }
        match self.cells.get(&pos) {
            Some(&(id, rotation)) => CellState::Block { id, rotation },
            None => CellState::Empty,
        }
    }

    fn set_block(&mut self, pos: IVec3, id: BlockId, rotation: u8) {
        if self.is_loaded(pos) {
            self.cells.insert(pos, (id, rotation & 3));
        }
    }

    fn clear_block(&mut self, pos: IVec3) {
        self.cells.remove(&pos);
    }
}

pub struct TestCatalog;

impl BlockCatalog for TestCatalog {
    fn resolve(&self, id: BlockId) -> Option<BlockProperties> {
        let props = |solid, mass| BlockProperties { solid, mass, buoyancy: 0.0 };
        match id {
            HELM => Some(props(true, 2.0)),
            PLANK => Some(BlockProperties { buoyancy: 0.6, ..props(true, 1.0) }),
            STONE => Some(props(true, 4.0)),
            WATER => Some(props(false, 0.0)),
            _ => None,
        }
    }
}

/// Spawner that records every live part. Optionally refuses the Nth spawn.
#[derive(Default)]
pub struct RecordingSpawner {
    next: u64,
    pub live: HashMap<PartHandle, (BlockId, PartTransform)>,
    pub spawned_total: usize,
    pub fail_on: Option<usize>,
}

impl RecordingSpawner {
    pub fn failing_on(n: usize) -> Self {
        Self { fail_on: Some(n), ..Default::default() }
    }
}

impl EntitySpawner for RecordingSpawner {
    fn spawn_part(&mut self, block: BlockId, transform: PartTransform) -> Result<PartHandle, SpawnError> {
        if self.fail_on == Some(self.spawned_total) {
            return Err(SpawnError { reason: "entity limit reached".into() });
        }
        self.spawned_total += 1;
        self.next += 1;
        let handle = PartHandle(self.next);
        self.live.insert(handle, (block, transform));
        Ok(handle)
    }

    fn despawn_part(&mut self, part: PartHandle) {
        self.live.remove(&part);
    }

    fn update_part(&mut self, part: PartHandle, transform: PartTransform) {
        if let Some(entry) = self.live.get_mut(&part) {
            entry.1 = transform;
        }
    }
}

pub fn player_bounds() -> Aabb {
    Aabb::new(DVec3::new(-0.3, 0.0, -0.3), DVec3::new(0.3, 1.8, 0.3))
}

pub struct TestPlayer {
    pub world: String,
    pub position: DVec3,
    pub velocity: DVec3,
    pub input: PlayerInput,
}

/// Players whose teleports and velocity changes apply immediately.
#[derive(Default)]
pub struct TestPlayers {
    pub players: HashMap<PlayerId, TestPlayer>,
    pub teleports: Vec<(PlayerId, DVec3, TeleportOptions)>,
}

impl TestPlayers {
    pub fn join(&mut self, world: &str, position: DVec3) -> PlayerId {
        let id = PlayerId::new_v4();
        self.players.insert(
            id,
            TestPlayer { world: world.to_owned(), position, velocity: DVec3::ZERO, input: PlayerInput::default() },
        );
        id
    }

    pub fn set_input(&mut self, id: PlayerId, input: PlayerInput) {
        if let Some(p) = self.players.get_mut(&id) {
            p.input = input;
        }
    }

    pub fn position(&self, id: PlayerId) -> DVec3 {
        self.players[&id].position
    }
}

impl PlayerSource for TestPlayers {
    fn snapshot(&self, player: PlayerId, world: &str) -> Option<PlayerSnapshot> {
        let p = self.players.get(&player).filter(|p| p.world == world)?;
        Some(PlayerSnapshot { id: player, position: p.position, bounds: player_bounds() })
    }

    fn input(&self, player: PlayerId) -> Option<PlayerInput> {
        self.players.get(&player).map(|p| p.input)
    }

    fn players_in(&self, world: &str) -> Vec<PlayerSnapshot> {
        let mut out: Vec<_> = self
            .players
            .iter()
            .filter(|(_, p)| p.world == world)
            .map(|(&id, p)| PlayerSnapshot { id, position: p.position, bounds: player_bounds() })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }
}

impl PlayerMovementSink for TestPlayers {
    fn teleport(&mut self, player: PlayerId, position: DVec3, options: TeleportOptions) {
        if let Some(p) = self.players.get_mut(&player) {
            p.position = position;
            if !options.preserve_velocity {
                p.velocity = DVec3::ZERO;
            }
        }
        self.teleports.push((player, position, options));
    }

    fn add_velocity(&mut self, player: PlayerId, delta: DVec3) {
        if let Some(p) = self.players.get_mut(&player) {
            p.velocity += delta;
        }
    }
}

/// Five-long, three-wide plank deck with the helm in the middle of the stern
/// row, placed so that `orientation` is the hull's facing.
///
/// Local layout (before rotation), helm at the origin:
/// x in -1..=1, z in 0..=4, y = 0.
pub fn build_deck(world: &mut TestWorld, helm: IVec3, orientation: Orientation) {
    for x in -1..=1 {
        for z in 0..=4 {
            let local = IVec3::new(x, 0, z);
            let id = if local == IVec3::ZERO { HELM } else { PLANK };
            world.set_block(helm + orientation.rotate(local), id, orientation.index());
        }
    }
}

pub const DECK_BLOCKS: usize = 15;
