//! Synchronous reconciliation of a live grid against a desired configuration.
//!
//! One call runs four steps in order:
//!
//! 1. Take out every installed unit the configuration does not want. These
//!    units form the *excess pool*.
//! 2. Fill the wanted positions from the excess pool, then from each
//!    provider inventory in order. A unit the grid refuses goes back where
//!    it came from and its position is reported as failed.
//! 3. Put whatever is left of the excess pool into the discard inventory,
//!    or spill it on the ground for cleanup.
//! 4. Hand positions nobody could supply to the [`DeliveryService`], or
//!    report them as unfulfilled if there is no delivery channel.

use crate::delivery::DeliveryService;
use loadout_core::fixed::Location;
use loadout_core::grid::{GridConfiguration, Position};
use loadout_core::host::World;
use loadout_core::id::{EntityId, GridId, InventoryId};
use loadout_core::item::ItemStack;

// ---------------------------------------------------------------------------
// Request and report
// ---------------------------------------------------------------------------

/// Everything one reconciliation needs to know.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileRequest<'a> {
    /// The entity wearing the grid. Needed for spilling near it and for
    /// deferring to delivery. A grid held in an inventory has no target.
    pub target: Option<EntityId>,
    pub grid: GridId,
    pub configuration: &'a GridConfiguration,
    /// Inventories to draw units from, highest priority first.
    pub providers: &'a [InventoryId],
    /// Where removed units go before spilling.
    pub discard: Option<InventoryId>,
}

/// What a reconciliation could not do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Positions where a supplied unit was refused by the grid.
    pub failed: GridConfiguration,
    /// Positions no source could supply and that were not deferred.
    pub unfulfilled: GridConfiguration,
    /// Positions handed to the delivery pipeline.
    pub deferred: GridConfiguration,
    /// Units taken out of the grid because the configuration did not want them.
    pub removed: u32,
    /// Removed units with nowhere to go: no discard room and no location to
    /// spill at. Ownership passes to the caller.
    pub leftover: Vec<ItemStack>,
}

impl ReconcileReport {
    /// True when the grid now matches the configuration, or will once
    /// deliveries arrive.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.unfulfilled.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("equipment grid {0:?} is not available")]
    GridUnavailable(GridId),
}

// ---------------------------------------------------------------------------
// Pass bookkeeping
// ---------------------------------------------------------------------------

/// How one wanted unit fared against one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Satisfied,
    /// The source had no unit of this kind.
    Missing,
    /// The source had a unit but the grid refused it.
    Failed,
}

/// Classification of every unit tried in one pass. Each unit lands in
/// exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassResult {
    pub satisfied: GridConfiguration,
    pub missing: GridConfiguration,
    pub failed: GridConfiguration,
}

impl PassResult {
    pub fn record(&mut self, kind: &str, position: Position, outcome: Outcome) {
        let bucket = match outcome {
            Outcome::Satisfied => &mut self.satisfied,
            Outcome::Missing => &mut self.missing,
            Outcome::Failed => &mut self.failed,
        };
        bucket.push(kind, position);
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Excess,
    Provider(InventoryId),
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

/// Converge `request.grid` toward `request.configuration`.
///
/// Sourcing problems are reported, never returned as errors. The only error
/// is a grid the host no longer has, in which case nothing is touched.
pub fn reconcile(
    world: &mut dyn World,
    deliveries: Option<&mut DeliveryService>,
    request: ReconcileRequest<'_>,
) -> Result<ReconcileReport, ReconcileError> {
    let grid_id = request.grid;
    let installed = match world.grid(grid_id) {
        Some(grid) if grid.is_valid() => grid.equipment(),
        _ => return Err(ReconcileError::GridUnavailable(grid_id)),
    };

    let mut report = ReconcileReport::default();

    // Step 1: remove excess.
    let mut wanted = request.configuration.clone();
    let mut excess: Vec<ItemStack> = Vec::new();
    for unit in installed {
        if wanted.remove(&unit.name, unit.position) {
            continue;
        }
        if let Some(stack) = world.grid_mut(grid_id).and_then(|g| g.take(unit.position)) {
            report.removed += stack.count;
            excess.push(stack);
        }
    }
    if report.removed > 0 {
        log::debug!("removed {} units from {grid_id:?}", report.removed);
    }

    // Step 2: populate, excess pool first.
    let sources = std::iter::once(Source::Excess)
        .chain(request.providers.iter().copied().map(Source::Provider));
    for source in sources {
        if wanted.is_empty() {
            break;
        }
        let pass = populate(world, grid_id, &wanted, source, &mut excess);
        log::debug!(
            "{source:?}: {} satisfied, {} missing, {} failed",
            pass.satisfied.len(),
            pass.missing.len(),
            pass.failed.len()
        );
        report.failed.extend(&pass.failed);
        wanted = pass.missing;
    }

    // Step 3: dispose of what was taken out and not reused.
    let location = request.target.and_then(|t| world.entity_location(t));
    dispose(world, request.discard, location, excess, &mut report);

    // Step 4: defer what is still missing.
    let channel = request.target.filter(|&target| {
        deliveries.is_some()
            && world.entity_valid(target)
            && world.entity_grid(target) == Some(grid_id)
    });
    match (deliveries, channel) {
        (Some(service), Some(target)) => {
            let missing = wanted.clone();
            match service.register(world, target, grid_id, missing) {
                Ok(()) => report.deferred = wanted,
                Err(err) => {
                    log::warn!("cannot defer {} units for {target:?}: {err}", wanted.len());
                    report.unfulfilled = wanted;
                }
            }
        }
        _ => report.unfulfilled = wanted,
    }

    Ok(report)
}

/// One sourcing pass over every still-wanted unit.
fn populate(
    world: &mut dyn World,
    grid_id: GridId,
    wanted: &GridConfiguration,
    source: Source,
    excess: &mut Vec<ItemStack>,
) -> PassResult {
    let mut pass = PassResult::default();
    for (kind, positions) in wanted.kinds() {
        let mut exhausted = false;
        for &position in positions {
            if exhausted {
                pass.record(kind, position, Outcome::Missing);
                continue;
            }
            let Some(unit) = take_unit(world, source, excess, kind) else {
                exhausted = true;
                pass.record(kind, position, Outcome::Missing);
                continue;
            };
            let placed = world
                .grid_mut(grid_id)
                .is_some_and(|g| g.put(&unit, position));
            if placed {
                pass.record(kind, position, Outcome::Satisfied);
            } else {
                log::warn!("grid {grid_id:?} refused {kind} at {position:?}");
                return_unit(world, source, excess, unit);
                pass.record(kind, position, Outcome::Failed);
            }
        }
    }
    pass
}

fn take_unit(
    world: &mut dyn World,
    source: Source,
    excess: &mut Vec<ItemStack>,
    kind: &str,
) -> Option<ItemStack> {
    match source {
        Source::Excess => {
            let idx = excess.iter().position(|s| s.name == kind && s.count > 0)?;
            let unit = excess[idx].split(1);
            if excess[idx].is_empty() {
                excess.remove(idx);
            }
            Some(unit)
        }
        Source::Provider(inventory) => world.inventory_mut(inventory)?.take_one(kind),
    }
}

/// Give a refused unit back to its source. A provider that cannot take it
/// back loses it to the excess pool, so it is disposed of later.
fn return_unit(world: &mut dyn World, source: Source, excess: &mut Vec<ItemStack>, unit: ItemStack) {
    let Source::Provider(inventory) = source else {
        excess.push(unit);
        return;
    };
    let inserted = world
        .inventory_mut(inventory)
        .map(|inv| inv.insert(&unit))
        .unwrap_or(0);
    if inserted == 0 {
        excess.push(unit);
    }
}

fn dispose(
    world: &mut dyn World,
    discard: Option<InventoryId>,
    location: Option<Location>,
    excess: Vec<ItemStack>,
    report: &mut ReconcileReport,
) {
    for mut stack in excess {
        if let Some(inv) = discard.and_then(|d| world.inventory_mut(d)) {
            let inserted = inv.insert(&stack);
            stack.count -= inserted.min(stack.count);
        }
        if stack.is_empty() {
            continue;
        }
        match location {
            Some(location) => {
                log::warn!("spilling {} x{} for cleanup", stack.name, stack.count);
                world.spill_for_cleanup(location, stack);
            }
            None => report.leftover.push(stack),
        }
    }
}
