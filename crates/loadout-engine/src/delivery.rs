//! Tick-driven delivery of equipment that reconciliation could not source
//! locally.
//!
//! Each target entity has at most one [`DeliveryRequest`]. A request owns a
//! transit container that follows the target around, and a fulfillment
//! proxy asking the host's logistics to fill that container. Every pipeline
//! tick the container is moved next to the target and whatever has arrived
//! is installed into the target's grid. Requests end when nothing is left
//! to install, when the proxy goes away, or when the target or its grid is
//! no longer the one the request was made for.
//!
//! The service registers its tick handler with the host [`Scheduler`] only
//! while it has requests, and unregisters once the last one ends.

use crate::event::{DeliveryEvent, TeardownReason};
use loadout_core::fixed::{Location, Ticks};
use loadout_core::grid::GridConfiguration;
use loadout_core::host::{Scheduler, World};
use loadout_core::id::{EntityId, GridId, InventoryId, ProxyId};
use loadout_core::item::{ItemCounts, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Host ticks between pipeline runs.
    pub tick_interval: Ticks,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { tick_interval: 20 }
    }
}

// ---------------------------------------------------------------------------
// Request state
// ---------------------------------------------------------------------------

/// The holding container that tracks a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitContainer {
    pub entity: EntityId,
    pub inventory: InventoryId,
    /// Last place the container was put. Used to spill its contents if the
    /// target disappears.
    pub location: Location,
}

/// Outstanding delivery for one target entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub target: EntityId,
    /// The target's grid at request time.
    pub grid: GridId,
    /// Positions still waiting for a unit, FIFO per kind.
    pub remaining: GridConfiguration,
    /// Positions whose delivered unit the grid refused.
    pub failed: GridConfiguration,
    pub container: TransitContainer,
    /// Item counts asked of the current proxy.
    pub requested: ItemCounts,
    /// `None` once nothing more is on its way.
    pub proxy: Option<ProxyId>,
}

/// Why a request could not be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("target entity is not valid")]
    TargetUnavailable,
    #[error("could not create a transit container")]
    ContainerUnavailable,
    #[error("the host has no fulfillment channel for this target")]
    FulfillmentUnavailable,
}

enum Step {
    Continue,
    Done(TeardownReason),
}

// ---------------------------------------------------------------------------
// DeliveryService
// ---------------------------------------------------------------------------

/// Registry of outstanding deliveries, keyed by target entity.
///
/// Passed by `&mut` into both the reconciliation call path and the host's
/// periodic tick, so the two can never interleave.
#[derive(Debug)]
pub struct DeliveryService {
    config: DeliveryConfig,
    /// Keyed by full handle, so a reused entity slot is a distinct target.
    pub(crate) requests: BTreeMap<EntityId, DeliveryRequest>,
    scheduler: Box<dyn Scheduler>,
    scheduled: bool,
    events: Vec<DeliveryEvent>,
    pub(crate) tick: Ticks,
}

impl DeliveryService {
    pub fn new(config: DeliveryConfig, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            config,
            requests: BTreeMap::new(),
            scheduler,
            scheduled: false,
            events: Vec::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    // -- Queries --

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_pending(&self, target: EntityId) -> bool {
        self.requests.contains_key(&target)
    }

    pub fn request(&self, target: EntityId) -> Option<&DeliveryRequest> {
        self.requests.get(&target)
    }

    /// Positions still awaiting delivery for `target`.
    pub fn pending(&self, target: EntityId) -> Option<&GridConfiguration> {
        self.requests.get(&target).map(|r| &r.remaining)
    }

    /// Positions whose delivered unit was refused by `target`'s grid.
    pub fn failed(&self, target: EntityId) -> Option<&GridConfiguration> {
        self.requests.get(&target).map(|r| &r.failed)
    }

    /// Units still missing across all requests, by kind.
    pub fn missing_report(&self) -> ItemCounts {
        let mut report = ItemCounts::new();
        for request in self.requests.values() {
            for (kind, count) in request.remaining.counts() {
                *report.entry(kind).or_insert(0) += count;
            }
        }
        report
    }

    /// Take all buffered events.
    pub fn drain_events(&mut self) -> Vec<DeliveryEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Registration --

    /// Start delivering `missing` into `target`'s grid `grid`. Any existing
    /// request for `target` is torn down first, even if `missing` is empty.
    pub fn register(
        &mut self,
        world: &mut dyn World,
        target: EntityId,
        grid: GridId,
        missing: GridConfiguration,
    ) -> Result<(), DeliveryError> {
        if let Some(previous) = self.requests.remove(&target) {
            self.teardown(world, previous, TeardownReason::Superseded);
        }
        if missing.is_empty() {
            self.sync_schedule();
            return Ok(());
        }

        let result = self.open(world, target, grid, missing);
        self.sync_schedule();
        result
    }

    fn open(
        &mut self,
        world: &mut dyn World,
        target: EntityId,
        grid: GridId,
        missing: GridConfiguration,
    ) -> Result<(), DeliveryError> {
        if !world.entity_valid(target) {
            return Err(DeliveryError::TargetUnavailable);
        }
        let location = world
            .entity_location(target)
            .ok_or(DeliveryError::TargetUnavailable)?;
        let (entity, inventory) = world
            .create_transit_container(location)
            .ok_or(DeliveryError::ContainerUnavailable)?;
        let requested = missing.counts();
        let Some(proxy) = world.request_items(entity, &requested) else {
            world.destroy(entity);
            return Err(DeliveryError::FulfillmentUnavailable);
        };

        let units = missing.len() as u32;
        log::info!("delivery registered for {target:?}: {units} units");
        self.requests.insert(
            target,
            DeliveryRequest {
                target,
                grid,
                remaining: missing,
                failed: GridConfiguration::new(),
                container: TransitContainer {
                    entity,
                    inventory,
                    location,
                },
                requested,
                proxy: Some(proxy),
            },
        );
        self.events.push(DeliveryEvent::Registered {
            target,
            units,
            tick: self.tick,
        });
        Ok(())
    }

    /// Tear down the request for `target`, if any. Returns whether one existed.
    pub fn cancel(&mut self, world: &mut dyn World, target: EntityId) -> bool {
        self.cancel_with(world, target, TeardownReason::Canceled)
    }

    fn cancel_with(&mut self, world: &mut dyn World, target: EntityId, reason: TeardownReason) -> bool {
        let Some(request) = self.requests.remove(&target) else {
            return false;
        };
        self.teardown(world, request, reason);
        self.sync_schedule();
        true
    }

    // -- Tick --

    /// Advance every request by one step. Called by the host every
    /// `tick_interval` ticks while registered.
    pub fn on_tick(&mut self, world: &mut dyn World, tick: Ticks) {
        self.tick = tick;
        let targets: Vec<EntityId> = self.requests.keys().copied().collect();
        for target in targets {
            let Some(mut request) = self.requests.remove(&target) else {
                continue;
            };
            match self.advance(world, &mut request) {
                Step::Continue => {
                    self.requests.insert(target, request);
                }
                Step::Done(reason) => self.teardown(world, request, reason),
            }
        }
        self.sync_schedule();
    }

    fn advance(&mut self, world: &mut dyn World, request: &mut DeliveryRequest) -> Step {
        let target = request.target;
        if !world.entity_valid(target) {
            return Step::Done(TeardownReason::TargetInvalid);
        }
        if world.entity_grid(target) != Some(request.grid) {
            return Step::Done(TeardownReason::GridReplaced);
        }
        if !world.grid(request.grid).is_some_and(|g| g.is_valid()) {
            return Step::Done(TeardownReason::GridInvalid);
        }
        let Some(location) = world.entity_location(target) else {
            return Step::Done(TeardownReason::TargetInvalid);
        };

        let container = request.container;
        let follows = world.entity_valid(container.entity)
            && container.location.same_surface(&location)
            && world.teleport(container.entity, location.position);
        if follows {
            request.container.location = location;
        } else if !self.relocate(world, request, location) {
            return Step::Done(TeardownReason::ContainerUnavailable);
        }

        self.install(world, request, location);

        if request.remaining.is_empty() {
            return Step::Done(TeardownReason::Completed);
        }
        if !request.proxy.is_some_and(|p| world.proxy_valid(p)) {
            return Step::Done(TeardownReason::FulfillmentEnded);
        }
        Step::Continue
    }

    /// Rebuild the transit container at `location`, carrying over anything
    /// already delivered and re-issuing the request for the rest.
    fn relocate(&mut self, world: &mut dyn World, request: &mut DeliveryRequest, location: Location) -> bool {
        let Some((entity, inventory)) = world.create_transit_container(location) else {
            return false;
        };

        let old = request.container;
        let carried = world
            .inventory_mut(old.inventory)
            .map(|inv| inv.take_all())
            .unwrap_or_default();
        world.destroy(old.entity);

        let mut in_hand = ItemCounts::new();
        for stack in carried {
            let inserted = world
                .inventory_mut(inventory)
                .map(|inv| inv.insert(&stack))
                .unwrap_or(0);
            if inserted > 0 {
                *in_hand.entry(stack.name.clone()).or_insert(0) += inserted;
            }
            if inserted < stack.count {
                let mut rest = stack;
                rest.count -= inserted;
                self.spill(world, request.target, location, rest);
            }
        }

        let mut needed = request.remaining.counts();
        for (name, count) in &in_hand {
            if let Some(n) = needed.get_mut(name) {
                *n = n.saturating_sub(*count);
            }
        }
        needed.retain(|_, n| *n > 0);

        request.proxy = if needed.is_empty() {
            None
        } else {
            world.request_items(entity, &needed)
        };
        request.requested = needed;
        request.container = TransitContainer {
            entity,
            inventory,
            location,
        };
        log::debug!("transit container for {:?} rebuilt on {:?}", request.target, location.surface);
        self.events.push(DeliveryEvent::ContainerRelocated {
            target: request.target,
            surface: location.surface,
            tick: self.tick,
        });
        true
    }

    /// Move delivered units from the container into the grid.
    fn install(&mut self, world: &mut dyn World, request: &mut DeliveryRequest, location: Location) {
        let stacks = match world.inventory_mut(request.container.inventory) {
            Some(inv) => {
                inv.sort_and_merge();
                inv.take_all()
            }
            None => return,
        };

        for mut stack in stacks {
            let wanted = request.remaining.positions(&stack.name).len() as u32;
            for _ in 0..stack.count.min(wanted) {
                let Some(position) = request.remaining.pop_front(&stack.name) else {
                    break;
                };
                let unit = stack.split(1);
                let placed = world
                    .grid_mut(request.grid)
                    .is_some_and(|g| g.put(&unit, position));
                if placed {
                    self.events.push(DeliveryEvent::Installed {
                        target: request.target,
                        name: unit.name,
                        position,
                        tick: self.tick,
                    });
                } else {
                    log::warn!("grid refused {} at {position:?}", unit.name);
                    request.failed.push(&unit.name, position);
                    self.events.push(DeliveryEvent::PlacementRefused {
                        target: request.target,
                        name: unit.name.clone(),
                        position,
                        tick: self.tick,
                    });
                    self.spill(world, request.target, location, unit);
                }
            }
            if !stack.is_empty() {
                self.spill(world, request.target, location, stack);
            }
        }
    }

    /// Spill leftover contents, destroy the container, and drop the request.
    fn teardown(&mut self, world: &mut dyn World, request: DeliveryRequest, reason: TeardownReason) {
        let location = world
            .entity_location(request.target)
            .unwrap_or(request.container.location);
        let leftovers = world
            .inventory_mut(request.container.inventory)
            .map(|inv| inv.take_all())
            .unwrap_or_default();
        for stack in leftovers {
            self.spill(world, request.target, location, stack);
        }
        world.destroy(request.container.entity);

        if reason.is_abort() {
            log::warn!(
                "delivery for {:?} aborted ({reason:?}), {} units undelivered",
                request.target,
                request.remaining.len()
            );
        } else {
            log::info!("delivery for {:?} ended ({reason:?})", request.target);
        }
        self.events.push(DeliveryEvent::TornDown {
            target: request.target,
            reason,
            tick: self.tick,
        });
    }

    fn spill(&mut self, world: &mut dyn World, target: EntityId, location: Location, stack: ItemStack) {
        if stack.is_empty() {
            return;
        }
        self.events.push(DeliveryEvent::Spilled {
            target,
            name: stack.name.clone(),
            count: stack.count,
            tick: self.tick,
        });
        world.spill_for_cleanup(location, stack);
    }

    /// Keep the host tick handler registered exactly while requests exist.
    pub(crate) fn sync_schedule(&mut self) {
        if !self.requests.is_empty() && !self.scheduled {
            self.scheduler.register(self.config.tick_interval);
            self.scheduled = true;
        } else if self.requests.is_empty() && self.scheduled {
            self.scheduler.unregister();
            self.scheduled = false;
        }
    }
}
