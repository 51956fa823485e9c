//! Capabilities the host game provides to the engine.
//!
//! The engine never holds references to host objects across calls. It keeps
//! handles ([`EntityId`], [`GridId`], [`InventoryId`], [`ProxyId`]) and
//! borrows the object through [`World`] each time it needs it, re-checking
//! validity as it goes.

use crate::fixed::{Location, MapPosition, Ticks};
use crate::grid::{GridDimensions, PlacedEquipment, Position};
use crate::id::{EntityId, GridId, InventoryId, ProxyId};
use crate::item::{ItemCounts, ItemStack};

// ---------------------------------------------------------------------------
// Equipment grid
// ---------------------------------------------------------------------------

/// A live equipment grid owned by the host.
pub trait EquipmentGrid {
    fn dimensions(&self) -> GridDimensions;

    /// False once the host has destroyed the grid.
    fn is_valid(&self) -> bool {
        true
    }

    /// Every installed unit. Order is unspecified.
    fn equipment(&self) -> Vec<PlacedEquipment>;

    /// Remove the unit anchored at `position`, returning its item state.
    fn take(&mut self, position: Position) -> Option<ItemStack>;

    /// Install one unit of `stack` anchored at `position`. Returns false if
    /// the grid refuses (no room, or the kind is not allowed in this grid).
    fn put(&mut self, stack: &ItemStack, position: Position) -> bool;
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A host inventory.
pub trait Inventory {
    /// Stacks in slot order.
    fn contents(&self) -> Vec<ItemStack>;

    /// Total units of `name` held.
    fn count(&self, name: &str) -> u32 {
        self.contents()
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.count)
            .sum()
    }

    /// Remove a single unit of `name`, keeping its state.
    fn take_one(&mut self, name: &str) -> Option<ItemStack>;

    /// Insert as much of `stack` as fits. Returns the number of units inserted.
    #[must_use = "units not inserted are still owned by the caller"]
    fn insert(&mut self, stack: &ItemStack) -> u32;

    /// Remove and return everything, in slot order.
    fn take_all(&mut self) -> Vec<ItemStack>;

    /// Merge identical stacks and sort slots.
    fn sort_and_merge(&mut self);
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Handle-based access to host entities, grids, inventories, and the
/// logistics fulfillment mechanism.
pub trait World {
    // -- Entities --

    fn entity_valid(&self, entity: EntityId) -> bool;

    fn entity_location(&self, entity: EntityId) -> Option<Location>;

    /// The equipment grid currently attached to `entity`.
    fn entity_grid(&self, entity: EntityId) -> Option<GridId>;

    // -- Grids and inventories --

    fn grid(&self, grid: GridId) -> Option<&dyn EquipmentGrid>;

    fn grid_mut(&mut self, grid: GridId) -> Option<&mut dyn EquipmentGrid>;

    fn inventory_mut(&mut self, inventory: InventoryId) -> Option<&mut dyn Inventory>;

    // -- Ground --

    /// Drop `stack` on the ground near `location` and mark it for removal
    /// by the host's cleanup systems.
    fn spill_for_cleanup(&mut self, location: Location, stack: ItemStack);

    // -- Transit containers --

    /// Create an invisible holding container at `location`. Returns the
    /// container entity and its inventory.
    fn create_transit_container(&mut self, location: Location) -> Option<(EntityId, InventoryId)>;

    /// Move an entity within its surface.
    fn teleport(&mut self, entity: EntityId, position: MapPosition) -> bool;

    /// Destroy an entity. Any fulfillment request targeting it is invalidated.
    fn destroy(&mut self, entity: EntityId);

    // -- Fulfillment --

    /// Ask the logistics system to deliver `items` into `container`.
    fn request_items(&mut self, container: EntityId, items: &ItemCounts) -> Option<ProxyId>;

    /// False once the request was fulfilled, canceled, or its target destroyed.
    fn proxy_valid(&self, proxy: ProxyId) -> bool;
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Host periodic scheduler for the delivery tick handler.
pub trait Scheduler: std::fmt::Debug {
    /// Run the delivery handler every `interval` ticks.
    fn register(&mut self, interval: Ticks);

    /// Stop running the delivery handler.
    fn unregister(&mut self);
}
