//! Property-based tests for reconciliation.
//!
//! Both the starting grid and the desired layout are produced by placement
//! attempts on an in-memory grid, so the desired layout always fits.

use loadout_core::grid::{GridConfiguration, GridDimensions};
use loadout_core::host::{EquipmentGrid, Inventory};
use loadout_core::item::ItemStack;
use loadout_core::test_utils::*;
use loadout_engine::{ReconcileReport, ReconcileRequest, reconcile};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const KINDS: [&str; 4] = [SHIELD, BATTERY, SOLAR, ROBOPORT];
const DIMS: GridDimensions = GridDimensions { width: 6, height: 6 };

fn arb_layout() -> impl Strategy<Value = Vec<(usize, u32, u32)>> {
    proptest::collection::vec((0..KINDS.len(), 0..DIMS.width, 0..DIMS.height), 0..20)
}

fn place(world: &mut TestWorld, grid: loadout_core::id::GridId, attempts: &[(usize, u32, u32)]) {
    for &(kind, x, y) in attempts {
        let _ = world.test_grid_mut(grid).put(&ItemStack::single(KINDS[kind]), pos(x, y));
    }
}

fn total(world: &TestWorld, grid: loadout_core::id::GridId, chest: loadout_core::id::InventoryId, kind: &str) -> u32 {
    let in_grid = world
        .test_grid(grid)
        .equipment()
        .iter()
        .filter(|u| u.name == kind)
        .count() as u32;
    in_grid + world.test_inventory(chest).count(kind) + world.spilled(kind)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// With enough supply, the grid ends up exactly as wanted, no unit is
    /// lost or duplicated, and a second run is a no-op.
    #[test]
    fn converges_and_conserves(before in arb_layout(), after in arb_layout()) {
        let mut world = TestWorld::new();
        let (target, grid) = world.spawn_with_grid(nauvis(0.0, 0.0), DIMS);
        place(&mut world, grid, &before);

        let scratch = world.loose_grid(DIMS);
        place(&mut world, scratch, &after);
        let wanted = GridConfiguration::from_grid(world.test_grid(scratch));

        let mut chest = TestInventory::new(8);
        for kind in KINDS {
            chest = chest.with(kind, 10);
        }
        let chest = world.add_inventory(chest);
        let initial: Vec<u32> = KINDS.iter().map(|k| total(&world, grid, chest, k)).collect();

        let request = ReconcileRequest {
            target: Some(target),
            grid,
            configuration: &wanted,
            providers: &[chest],
            discard: None,
        };
        let report = reconcile(&mut world, None, request).unwrap();

        prop_assert!(report.is_complete());
        prop_assert!(GridConfiguration::from_grid(world.test_grid(grid)).same_units(&wanted));
        for (kind, before_total) in KINDS.iter().zip(&initial) {
            prop_assert_eq!(total(&world, grid, chest, kind), *before_total);
        }

        let again = reconcile(&mut world, None, request).unwrap();
        prop_assert_eq!(again, ReconcileReport::default());
    }

    /// Every wanted unit is accounted for exactly once across the report
    /// and the grid.
    #[test]
    fn outcomes_partition_wanted(before in arb_layout(), after in arb_layout(), stock in 0..3u32) {
        let mut world = TestWorld::new();
        let (target, grid) = world.spawn_with_grid(nauvis(0.0, 0.0), DIMS);
        place(&mut world, grid, &before);
        let scratch = world.loose_grid(DIMS);
        place(&mut world, scratch, &after);
        let wanted = GridConfiguration::from_grid(world.test_grid(scratch));

        let mut chest = TestInventory::new(8);
        for kind in KINDS {
            chest = chest.with(kind, stock);
        }
        let chest = world.add_inventory(chest);

        let report = reconcile(
            &mut world,
            None,
            ReconcileRequest {
                target: Some(target),
                grid,
                configuration: &wanted,
                providers: &[chest],
                discard: None,
            },
        )
        .unwrap();

        let installed = GridConfiguration::from_grid(world.test_grid(grid));
        for (kind, position) in wanted.iter() {
            let placed = installed.contains(kind, position) as u32;
            let failed = report.failed.contains(kind, position) as u32;
            let unfulfilled = report.unfulfilled.contains(kind, position) as u32;
            prop_assert_eq!(placed + failed + unfulfilled, 1);
        }
        prop_assert!(report.deferred.is_empty());
    }
}
