//! Integration test: template round trip into a live grid
//!
//! Encodes a grid into placeholder records, validates them against another
//! grid of the same size, decodes them, and reconciles the second grid until
//! it matches the first. Everything the second grid needs is available from
//! a provider inventory, so no delivery is involved.

use fixed::types::I32F32;
use loadout_core::grid::{GridConfiguration, GridDimensions};
use loadout_core::host::Inventory;
use loadout_core::item::ItemStack;
use loadout_core::test_utils::*;
use loadout_engine::{ReconcileRequest, reconcile};
use loadout_template::{Template, TemplateConfig};

#[test]
fn copy_layout_between_grids() {
    let mut world = TestWorld::new();
    let dims = GridDimensions::new(5, 5);
    let (_, source) = world.spawn_with_grid(nauvis(0.0, 0.0), dims);
    world.install(source, ItemStack::single(SHIELD), pos(0, 0));
    world.install(source, ItemStack::single(BATTERY), pos(2, 0));
    world.install(source, ItemStack::single(SOLAR), pos(4, 4));
    world.install(source, ItemStack::single(SOLAR), pos(3, 4));

    let config = TemplateConfig::default();
    let catalog = test_catalog();
    let records = config.codec(&catalog).encode(world.test_grid(source), true);
    assert_eq!(records.len(), 25);

    // Through the blueprint boundary and back.
    let json = Template::new(dims, records).to_json().unwrap();
    let template = Template::from_json(&json).unwrap();
    assert!(config.validator(&catalog).is_valid(template.dimensions(), &template.records));

    let wanted = config.codec(&catalog).decode(&template.records, template.width);
    assert!(wanted.same_units(&GridConfiguration::from_grid(world.test_grid(source))));

    let (target, grid) = world.spawn_with_grid(nauvis(5.0, 0.0), dims);
    world.install(grid, ItemStack::single(ROBOPORT), pos(1, 1));
    let chest = world.add_inventory(
        TestInventory::new(10)
            .with(SHIELD, 1)
            .with(BATTERY, 1)
            .with(SOLAR, 4),
    );
    let discard = world.add_inventory(TestInventory::new(10));

    let report = reconcile(
        &mut world,
        None,
        ReconcileRequest {
            target: Some(target),
            grid,
            configuration: &wanted,
            providers: &[chest],
            discard: Some(discard),
        },
    )
    .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.removed, 1);
    assert!(GridConfiguration::from_grid(world.test_grid(grid)).same_units(&wanted));
    assert_eq!(world.test_inventory(chest).count(SOLAR), 2);
    assert_eq!(world.test_inventory(discard).count(ROBOPORT), 1);
}

#[test]
fn rearranging_keeps_unit_state() {
    let mut world = TestWorld::new();
    let (target, grid) = world.spawn_with_grid(nauvis(0.0, 0.0), GridDimensions::new(4, 4));
    let worn = ItemStack::single(SHIELD).with_property("health", I32F32::from_num(0.25));
    world.install(grid, worn.clone(), pos(0, 0));

    let moved: GridConfiguration = [(SHIELD, pos(2, 2))].into_iter().collect();
    let report = reconcile(
        &mut world,
        None,
        ReconcileRequest {
            target: Some(target),
            grid,
            configuration: &moved,
            providers: &[],
            discard: None,
        },
    )
    .unwrap();

    assert!(report.is_complete());
    assert_eq!(world.test_grid(grid).unit_at(pos(2, 2)).unwrap().stack, worn);
    assert!(world.spills.is_empty());
}

#[test]
fn overlapping_template_is_rejected_before_reconcile() {
    let catalog = test_catalog();
    let config = TemplateConfig::default();
    let dims = GridDimensions::new(3, 3);
    let overlapping: GridConfiguration =
        [(SHIELD, pos(0, 0)), (SOLAR, pos(1, 1))].into_iter().collect();

    let records = config.codec(&catalog).encode_configuration(&overlapping, dims, false);
    assert!(!config.validator(&catalog).is_valid(dims, &records));
}

#[test]
fn empty_one_by_one_template_clears_the_grid() {
    let catalog = test_catalog();
    let config = TemplateConfig::default();
    let dims = GridDimensions::new(1, 1);

    let records = config
        .codec(&catalog)
        .encode_configuration(&GridConfiguration::new(), dims, true);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_empty());
    let wanted = config.codec(&catalog).decode(&records, dims.width);
    assert!(wanted.is_empty());

    let mut world = TestWorld::new();
    let (target, grid) = world.spawn_with_grid(nauvis(0.0, 0.0), dims);
    world.install(grid, ItemStack::single(SOLAR), pos(0, 0));

    let report = reconcile(
        &mut world,
        None,
        ReconcileRequest {
            target: Some(target),
            grid,
            configuration: &wanted,
            providers: &[],
            discard: None,
        },
    )
    .unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(report.removed, 1);
    assert_eq!(world.test_grid(grid).unit_count(), 0);
    assert_eq!(world.spilled(SOLAR), 1);
}
