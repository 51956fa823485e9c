use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a host entity (a character, vehicle, or transit container).
    /// Re-created entities receive a new key version, so stale handles never
    /// alias a replacement.
    pub struct EntityId;

    /// Identifies an equipment grid. A grid swapped out from under its owner
    /// gets a fresh id, which is how in-flight deliveries detect replacement.
    pub struct GridId;

    /// Identifies an inventory owned by the host.
    pub struct InventoryId;

    /// Identifies an outstanding fulfillment request (a logistic proxy).
    pub struct ProxyId;
}

/// Identifies a surface (a separate map). Entities on different surfaces
/// cannot exchange items directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn surface_id_equality() {
        assert_eq!(SurfaceId(1), SurfaceId(1));
        assert_ne!(SurfaceId(1), SurfaceId(2));
    }

    #[test]
    fn reused_slot_gets_new_version() {
        let mut grids: SlotMap<GridId, ()> = SlotMap::with_key();
        let first = grids.insert(());
        grids.remove(first);
        let second = grids.insert(());
        assert_ne!(first, second);
        assert!(!grids.contains_key(first));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut entities: SlotMap<EntityId, ()> = SlotMap::with_key();
        let a = entities.insert(());
        let mut map = HashMap::new();
        map.insert(a, "character");
        assert_eq!(map[&a], "character");
    }
}
