//! Loadout Core -- shared model for equipment-grid templates.
//!
//! This crate holds the value types every other Loadout crate trades in,
//! plus the capability traits through which the engine talks to the host
//! game.
//!
//! # Key Types
//!
//! - [`grid::GridConfiguration`] -- desired grid state, equipment kind ->
//!   anchor positions. The currency passed between codec, validator, and
//!   reconciliation engine.
//! - [`grid::Position`], [`grid::EquipmentShape`], [`grid::GridDimensions`]
//!   -- grid geometry.
//! - [`item::ItemStack`] -- an item stack with opaque per-instance state.
//! - [`catalog::ShapeLookup`] -- injected kind -> footprint lookup, backed
//!   by [`catalog::EquipmentCatalog`].
//! - [`host::World`], [`host::EquipmentGrid`], [`host::Inventory`],
//!   [`host::Scheduler`] -- what the host provides. The engine only keeps
//!   handles ([`id`]) and re-validates them on every use.

pub mod catalog;
pub mod fixed;
pub mod grid;
pub mod host;
pub mod id;
pub mod item;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
