//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Provides an
//! in-memory [`World`] with scripted logistics so delivery behaviour can be
//! driven tick by tick without a game host.

use crate::catalog::{CatalogBuilder, EquipmentCatalog, ShapeLookup};
use crate::fixed::{Location, MapPosition, Ticks};
use crate::grid::{EquipmentShape, GridDimensions, PlacedEquipment, Position};
use crate::host::{EquipmentGrid, Inventory, Scheduler, World};
use crate::id::*;
use crate::item::{ItemCounts, ItemStack};
use slotmap::SlotMap;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

// ===========================================================================
// Catalog and position helpers
// ===========================================================================

pub const SHIELD: &str = "energy-shield-equipment";
pub const BATTERY: &str = "battery-equipment";
pub const SOLAR: &str = "solar-panel-equipment";
pub const ROBOPORT: &str = "personal-roboport-equipment";
pub const EXOSKELETON: &str = "exoskeleton-equipment";

pub fn pos(x: u32, y: u32) -> Position {
    Position::new(x, y)
}

/// Shapes loosely following the vanilla game: shield 2x2, battery 1x2,
/// solar 1x1, roboport 2x2, exoskeleton 2x4.
pub fn test_catalog() -> EquipmentCatalog {
    let mut b = CatalogBuilder::new();
    for (name, w, h) in [
        (SHIELD, 2, 2),
        (BATTERY, 1, 2),
        (SOLAR, 1, 1),
        (ROBOPORT, 2, 2),
        (EXOSKELETON, 2, 4),
    ] {
        b.register(name, EquipmentShape::new(w, h))
            .expect("test catalog names are unique");
    }
    b.build().expect("test catalog shapes are non-empty")
}

pub fn nauvis(x: f64, y: f64) -> Location {
    Location::new(SurfaceId(1), MapPosition::from_f64(x, y))
}

// ===========================================================================
// TestGrid
// ===========================================================================

/// In-memory equipment grid that enforces bounds and overlap.
#[derive(Debug, Clone)]
pub struct TestGrid {
    dims: GridDimensions,
    units: Vec<PlacedEquipment>,
    catalog: EquipmentCatalog,
    /// Kinds this grid refuses regardless of space.
    pub refused: BTreeSet<String>,
    pub valid: bool,
}

impl TestGrid {
    pub fn new(dims: GridDimensions, catalog: EquipmentCatalog) -> Self {
        Self {
            dims,
            units: Vec::new(),
            catalog,
            refused: BTreeSet::new(),
            valid: true,
        }
    }

    pub fn unit_at(&self, position: Position) -> Option<&PlacedEquipment> {
        self.units.iter().find(|u| u.position == position)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn occupied(&self, tile: Position) -> bool {
        self.units
            .iter()
            .any(|u| u.shape.tiles(u.position).any(|t| t == tile))
    }
}

impl EquipmentGrid for TestGrid {
    fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn equipment(&self) -> Vec<PlacedEquipment> {
        self.units.clone()
    }

    fn take(&mut self, position: Position) -> Option<ItemStack> {
        let idx = self.units.iter().position(|u| u.position == position)?;
        Some(self.units.remove(idx).stack)
    }

    fn put(&mut self, stack: &ItemStack, position: Position) -> bool {
        if stack.count == 0 || self.refused.contains(&stack.name) {
            return false;
        }
        let Some(shape) = self.catalog.shape(&stack.name) else {
            return false;
        };
        if !shape.fits(position, self.dims) || shape.tiles(position).any(|t| self.occupied(t)) {
            return false;
        }
        let mut unit = stack.clone();
        unit.count = 1;
        self.units.push(PlacedEquipment {
            name: stack.name.clone(),
            position,
            shape,
            stack: unit,
        });
        true
    }
}

// ===========================================================================
// TestInventory
// ===========================================================================

/// Slot-limited inventory. Each slot holds one stack of unlimited size.
#[derive(Debug, Clone, Default)]
pub struct TestInventory {
    pub slots: Vec<ItemStack>,
    pub slot_limit: usize,
}

impl TestInventory {
    pub fn new(slot_limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            slot_limit,
        }
    }

    pub fn with(mut self, name: &str, count: u32) -> Self {
        let _ = self.insert(&ItemStack::new(name, count));
        self
    }
}

impl Inventory for TestInventory {
    fn contents(&self) -> Vec<ItemStack> {
        self.slots.clone()
    }

    fn take_one(&mut self, name: &str) -> Option<ItemStack> {
        let idx = self.slots.iter().position(|s| s.name == name && s.count > 0)?;
        let one = self.slots[idx].split(1);
        if self.slots[idx].is_empty() {
            self.slots.remove(idx);
        }
        Some(one)
    }

    fn insert(&mut self, stack: &ItemStack) -> u32 {
        if stack.count == 0 {
            return 0;
        }
        if let Some(slot) = self.slots.iter_mut().find(|s| s.stacks_with(stack)) {
            slot.count += stack.count;
            return stack.count;
        }
        if self.slots.len() >= self.slot_limit {
            return 0;
        }
        self.slots.push(stack.clone());
        stack.count
    }

    fn take_all(&mut self) -> Vec<ItemStack> {
        std::mem::take(&mut self.slots)
    }

    fn sort_and_merge(&mut self) {
        let mut merged: Vec<ItemStack> = Vec::new();
        for stack in self.slots.drain(..) {
            match merged.iter_mut().find(|m| m.stacks_with(&stack)) {
                Some(existing) => existing.count += stack.count,
                None => merged.push(stack),
            }
        }
        merged.sort_by(|a, b| a.name.cmp(&b.name));
        self.slots = merged;
    }
}

// ===========================================================================
// TestWorld
// ===========================================================================

#[derive(Debug, Clone)]
pub struct TestEntity {
    pub location: Location,
    pub grid: Option<GridId>,
    pub inventory: Option<InventoryId>,
}

#[derive(Debug, Clone)]
pub struct TestProxy {
    pub container: EntityId,
    pub items: ItemCounts,
}

/// A stack dropped on the ground and marked for cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct Spill {
    pub location: Location,
    pub stack: ItemStack,
}

/// In-memory host. Logistics never deliver on their own; tests call
/// [`TestWorld::deliver`] to simulate robots arriving.
#[derive(Debug)]
pub struct TestWorld {
    pub catalog: EquipmentCatalog,
    pub entities: SlotMap<EntityId, TestEntity>,
    pub grids: SlotMap<GridId, TestGrid>,
    pub inventories: SlotMap<InventoryId, TestInventory>,
    pub proxies: SlotMap<ProxyId, TestProxy>,
    pub spills: Vec<Spill>,
    /// When false, `request_items` fails (no logistic network in range).
    pub logistics_available: bool,
    pub container_slots: usize,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_catalog(test_catalog())
    }

    pub fn with_catalog(catalog: EquipmentCatalog) -> Self {
        Self {
            catalog,
            entities: SlotMap::with_key(),
            grids: SlotMap::with_key(),
            inventories: SlotMap::with_key(),
            proxies: SlotMap::with_key(),
            spills: Vec::new(),
            logistics_available: true,
            container_slots: 16,
        }
    }

    /// Spawn an entity carrying an empty grid of the given size.
    pub fn spawn_with_grid(&mut self, location: Location, dims: GridDimensions) -> (EntityId, GridId) {
        let grid = self.grids.insert(TestGrid::new(dims, self.catalog.clone()));
        let entity = self.entities.insert(TestEntity {
            location,
            grid: Some(grid),
            inventory: None,
        });
        (entity, grid)
    }

    /// A grid not attached to any entity (e.g. armor held in an inventory).
    pub fn loose_grid(&mut self, dims: GridDimensions) -> GridId {
        self.grids.insert(TestGrid::new(dims, self.catalog.clone()))
    }

    pub fn add_inventory(&mut self, inventory: TestInventory) -> InventoryId {
        self.inventories.insert(inventory)
    }

    pub fn test_grid(&self, grid: GridId) -> &TestGrid {
        &self.grids[grid]
    }

    pub fn test_grid_mut(&mut self, grid: GridId) -> &mut TestGrid {
        &mut self.grids[grid]
    }

    pub fn test_inventory(&self, inventory: InventoryId) -> &TestInventory {
        &self.inventories[inventory]
    }

    /// Pre-install a unit, bypassing reconciliation.
    pub fn install(&mut self, grid: GridId, stack: ItemStack, position: Position) {
        assert!(
            self.grids[grid].put(&stack, position),
            "test setup could not install {} at {position:?}",
            stack.name
        );
    }

    /// Destroy an entity without any cleanup, as if killed.
    pub fn kill(&mut self, entity: EntityId) {
        self.entities.remove(entity);
    }

    pub fn move_entity(&mut self, entity: EntityId, location: Location) {
        if let Some(e) = self.entities.get_mut(entity) {
            e.location = location;
        }
    }

    /// Replace an entity's grid with a fresh empty one of the same size.
    pub fn replace_grid(&mut self, entity: EntityId) -> Option<GridId> {
        let old = self.entities.get(entity)?.grid?;
        let dims = self.grids.remove(old)?.dimensions();
        let new = self.grids.insert(TestGrid::new(dims, self.catalog.clone()));
        self.entities[entity].grid = Some(new);
        Some(new)
    }

    /// The outstanding proxy targeting `container`, if any.
    pub fn proxy_for(&self, container: EntityId) -> Option<ProxyId> {
        self.proxies
            .iter()
            .find(|(_, p)| p.container == container)
            .map(|(id, _)| id)
    }

    /// Simulate robots dropping `count` units of `name` into the proxy's
    /// container. The proxy is fulfilled once nothing is left to deliver.
    pub fn deliver(&mut self, proxy: ProxyId, name: &str, count: u32) {
        let Some(p) = self.proxies.get_mut(proxy) else {
            return;
        };
        let container = p.container;
        if let Some(left) = p.items.get_mut(name) {
            *left = left.saturating_sub(count);
        }
        p.items.retain(|_, left| *left > 0);
        let fulfilled = p.items.is_empty();
        if let Some(inv) = self.entities.get(container).and_then(|e| e.inventory) {
            let _ = self.inventories[inv].insert(&ItemStack::new(name, count));
        }
        if fulfilled {
            self.proxies.remove(proxy);
        }
    }

    /// Cancel a request as a player would by clearing it.
    pub fn cancel_proxy(&mut self, proxy: ProxyId) {
        self.proxies.remove(proxy);
    }

    /// Containers currently alive (entities carrying an inventory).
    pub fn containers(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.inventory.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Total units of `name` spilled on the ground.
    pub fn spilled(&self, name: &str) -> u32 {
        self.spills
            .iter()
            .filter(|s| s.stack.name == name)
            .map(|s| s.stack.count)
            .sum()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl World for TestWorld {
    fn entity_valid(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    fn entity_location(&self, entity: EntityId) -> Option<Location> {
        self.entities.get(entity).map(|e| e.location)
    }

    fn entity_grid(&self, entity: EntityId) -> Option<GridId> {
        self.entities.get(entity)?.grid
    }

    fn grid(&self, grid: GridId) -> Option<&dyn EquipmentGrid> {
        self.grids.get(grid).map(|g| g as &dyn EquipmentGrid)
    }

    fn grid_mut(&mut self, grid: GridId) -> Option<&mut dyn EquipmentGrid> {
        self.grids.get_mut(grid).map(|g| g as &mut dyn EquipmentGrid)
    }

    fn inventory_mut(&mut self, inventory: InventoryId) -> Option<&mut dyn Inventory> {
        self.inventories
            .get_mut(inventory)
            .map(|i| i as &mut dyn Inventory)
    }

    fn spill_for_cleanup(&mut self, location: Location, stack: ItemStack) {
        if stack.count > 0 {
            self.spills.push(Spill { location, stack });
        }
    }

    fn create_transit_container(&mut self, location: Location) -> Option<(EntityId, InventoryId)> {
        let inventory = self.inventories.insert(TestInventory::new(self.container_slots));
        let entity = self.entities.insert(TestEntity {
            location,
            grid: None,
            inventory: Some(inventory),
        });
        Some((entity, inventory))
    }

    fn teleport(&mut self, entity: EntityId, position: MapPosition) -> bool {
        match self.entities.get_mut(entity) {
            Some(e) => {
                e.location.position = position;
                true
            }
            None => false,
        }
    }

    fn destroy(&mut self, entity: EntityId) {
        if let Some(e) = self.entities.remove(entity) {
            if let Some(inv) = e.inventory {
                self.inventories.remove(inv);
            }
        }
        self.proxies.retain(|_, p| p.container != entity);
    }

    fn request_items(&mut self, container: EntityId, items: &ItemCounts) -> Option<ProxyId> {
        if !self.logistics_available || !self.entities.contains_key(container) {
            return None;
        }
        Some(self.proxies.insert(TestProxy {
            container,
            items: items.clone(),
        }))
    }

    fn proxy_valid(&self, proxy: ProxyId) -> bool {
        self.proxies.contains_key(proxy)
    }
}

// ===========================================================================
// RecordingScheduler
// ===========================================================================

/// What a [`RecordingScheduler`] has been asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleLog {
    pub interval: Option<Ticks>,
    pub registrations: u32,
    pub unregistrations: u32,
}

/// Scheduler that records calls. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    log: Rc<RefCell<ScheduleLog>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> ScheduleLog {
        self.log.borrow().clone()
    }

    pub fn is_registered(&self) -> bool {
        self.log.borrow().interval.is_some()
    }
}

impl Scheduler for RecordingScheduler {
    fn register(&mut self, interval: Ticks) {
        let mut log = self.log.borrow_mut();
        log.interval = Some(interval);
        log.registrations += 1;
    }

    fn unregister(&mut self) {
        let mut log = self.log.borrow_mut();
        log.interval = None;
        log.unregistrations += 1;
    }
}
