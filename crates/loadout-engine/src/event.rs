//! Events emitted by the delivery pipeline.
//!
//! Events are buffered inside the [`DeliveryService`](crate::delivery::DeliveryService)
//! and handed out in batch by `drain_events`, so a UI layer can report
//! progress without the pipeline knowing about it.

use loadout_core::fixed::Ticks;
use loadout_core::grid::Position;
use loadout_core::id::{EntityId, SurfaceId};
use serde::{Deserialize, Serialize};

/// Why a delivery request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeardownReason {
    /// Everything requested was installed.
    Completed,
    /// The fulfillment proxy was canceled or finished while items were
    /// still missing.
    FulfillmentEnded,
    /// The target entity no longer exists.
    TargetInvalid,
    /// The target's grid was destroyed.
    GridInvalid,
    /// The target now carries a different grid than at request time.
    GridReplaced,
    /// The transit container could not be (re)created.
    ContainerUnavailable,
    /// A newer request for the same target replaced this one.
    Superseded,
    /// Canceled by the caller.
    Canceled,
}

impl TeardownReason {
    /// Whether the request ended because the world changed under it.
    pub fn is_abort(self) -> bool {
        matches!(
            self,
            TeardownReason::TargetInvalid
                | TeardownReason::GridInvalid
                | TeardownReason::GridReplaced
                | TeardownReason::ContainerUnavailable
        )
    }
}

/// A delivery pipeline event. All events carry the tick at which they
/// occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    Registered {
        target: EntityId,
        units: u32,
        tick: Ticks,
    },
    Installed {
        target: EntityId,
        name: String,
        position: Position,
        tick: Ticks,
    },
    /// The grid refused a delivered unit; the position will not be retried.
    PlacementRefused {
        target: EntityId,
        name: String,
        position: Position,
        tick: Ticks,
    },
    /// The transit container was rebuilt next to the target.
    ContainerRelocated {
        target: EntityId,
        surface: SurfaceId,
        tick: Ticks,
    },
    /// Units dropped on the ground for cleanup.
    Spilled {
        target: EntityId,
        name: String,
        count: u32,
        tick: Ticks,
    },
    TornDown {
        target: EntityId,
        reason: TeardownReason,
        tick: Ticks,
    },
}

impl DeliveryEvent {
    pub fn target(&self) -> EntityId {
        match self {
            DeliveryEvent::Registered { target, .. }
            | DeliveryEvent::Installed { target, .. }
            | DeliveryEvent::PlacementRefused { target, .. }
            | DeliveryEvent::ContainerRelocated { target, .. }
            | DeliveryEvent::Spilled { target, .. }
            | DeliveryEvent::TornDown { target, .. } => *target,
        }
    }
}
