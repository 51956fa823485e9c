//! Reconciliation and delivery for equipment grids.
//!
//! [`reconcile`](reconcile::reconcile) converges a grid toward a desired
//! [`GridConfiguration`](loadout_core::grid::GridConfiguration) in one call,
//! drawing units from what the grid already holds and from provider
//! inventories. Anything it cannot source is handed to the
//! [`DeliveryService`](delivery::DeliveryService), which requests the units
//! from the host's logistics and installs them over later ticks.

pub mod delivery;
pub mod event;
pub mod reconcile;
pub mod serialize;

pub use delivery::{DeliveryConfig, DeliveryError, DeliveryRequest, DeliveryService, TransitContainer};
pub use event::{DeliveryEvent, TeardownReason};
pub use reconcile::{
    Outcome, PassResult, ReconcileError, ReconcileReport, ReconcileRequest, reconcile,
};
pub use serialize::SnapshotError;
