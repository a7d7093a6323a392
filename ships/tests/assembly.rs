mod common;

use std::collections::BTreeSet;

use bevy_math::IVec3;
use common::*;
use ships::{assemble, AssemblyLimits, Orientation, VoxelWorld};

fn offsets(structure: &ships::Structure) -> BTreeSet<(i32, i32, i32)> {
    structure.iter().map(|b| (b.offset.x, b.offset.y, b.offset.z)).collect()
}

#[test]
fn helm_and_ten_planks_make_eleven_blocks() {
    init_tracing();
    let mut world = TestWorld::new("w");
    let helm = IVec3::new(0, 64, 0);
    world.place(helm, HELM);
    for x in 1..=10 {
        world.place(helm + IVec3::new(x, 0, 0), PLANK);
    }
    // Ground under the hull, not touching it.
    world.fill(IVec3::new(-5, 60, -5), IVec3::new(15, 60, 5), STONE);

    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &AssemblyLimits::default());
    assert_eq!(a.structure.len(), 11);
    assert!(!a.truncated);
    assert_eq!(a.structure.get(IVec3::ZERO).map(|b| b.block), Some(HELM));
    assert_eq!(a.world_min, helm);
    assert_eq!(a.world_max, helm + IVec3::new(10, 0, 0));
    assert_eq!(a.structure.total_mass(), 2.0 + 10.0);
}

#[test]
fn capture_stops_at_the_block_cap() {
    let mut world = TestWorld::new("w");
    let helm = IVec3::new(0, 64, 0);
    build_deck(&mut world, helm, Orientation::NORTH);

    let limits = AssemblyLimits { max_blocks: 5, ..Default::default() };
    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &limits);
    assert_eq!(a.structure.len(), 5);
    assert!(a.truncated);
    assert!(a.structure.contains(IVec3::ZERO), "the seed is always captured first");
}

#[test]
fn filling_the_cap_exactly_is_not_truncation() {
    let mut world = TestWorld::new("w");
    let helm = IVec3::new(0, 64, 0);
    build_deck(&mut world, helm, Orientation::NORTH);
    // Touches the deck but cannot be captured.
    world.place(helm + IVec3::new(2, 0, 0), MYSTERY);

    let limits = AssemblyLimits { max_blocks: DECK_BLOCKS, ..Default::default() };
    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &limits);
    assert_eq!(a.structure.len(), DECK_BLOCKS);
    assert!(!a.truncated, "only air and unknown blocks were left unvisited");

    world.place(helm + IVec3::new(0, 0, 5), PLANK);
    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &limits);
    assert_eq!(a.structure.len(), DECK_BLOCKS);
    assert!(a.truncated, "the extra plank was left behind");
}

#[test]
fn air_and_unknown_blocks_break_connectivity() {
    let mut world = TestWorld::new("w");
    let helm = IVec3::new(0, 64, 0);
    world.place(helm, HELM);
    world.place(helm + IVec3::X, PLANK);
    // Gap at x = 2, then more planks.
    world.place(helm + IVec3::new(3, 0, 0), PLANK);
    world.place(helm + IVec3::new(4, 0, 0), PLANK);
    // Unknown block bridging to another plank.
    world.place(helm + IVec3::NEG_X, MYSTERY);
    world.place(helm + IVec3::new(-2, 0, 0), PLANK);

    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &AssemblyLimits::default());
    assert_eq!(offsets(&a.structure), BTreeSet::from([(0, 0, 0), (1, 0, 0)]));
}

#[test]
fn window_and_world_height_bound_the_search() {
    let mut world = TestWorld::new("w");
    let helm = IVec3::new(0, 2, 0);
    // A tall column through the bottom of the world and a long beam.
    world.fill(IVec3::new(0, 0, 0), IVec3::new(0, 30, 0), PLANK);
    world.place(helm, HELM);
    world.fill(IVec3::new(1, 2, 0), IVec3::new(40, 2, 0), PLANK);

    let limits = AssemblyLimits { radius_xz: 8, max_down: 10, max_up: 5, ..Default::default() };
    let a = assemble(&world, &TestCatalog, helm, Orientation::NORTH, &limits);
    let b = a.structure.bounds();
    assert_eq!(b.min, IVec3::new(0, -2, 0));
    assert_eq!(b.max, IVec3::new(8, 5, 0));
}

#[test]
fn empty_seed_yields_nothing() {
    let world = TestWorld::new("w");
    let a = assemble(&world, &TestCatalog, IVec3::new(0, 64, 0), Orientation::NORTH, &AssemblyLimits::default());
    assert!(a.structure.is_empty());
    assert!(!a.truncated);
}

#[test]
fn same_hull_under_every_facing_captures_the_same_local_shape() {
    let helm = IVec3::new(20, 70, -20);
    let mut shapes = Vec::new();
    for ori in Orientation::ALL {
        let mut world = TestWorld::new("w");
        build_deck(&mut world, helm, ori);
        // A mast on the bow corner makes the shape chiral.
        world.set_block(helm + ori.rotate(IVec3::new(1, 1, 4)), PLANK, ori.index());

        let a = assemble(&world, &TestCatalog, helm, ori, &AssemblyLimits::default());
        assert_eq!(a.structure.len(), DECK_BLOCKS + 1);
        assert!(a.structure.iter().all(|b| b.rotation == 0), "ori={ori:?}");
        shapes.push(offsets(&a.structure));
    }
    assert!(shapes.windows(2).all(|w| w[0] == w[1]));
    assert!(shapes[0].contains(&(1, 1, 4)));
}
