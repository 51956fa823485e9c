use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item kind name -> quantity.
pub type ItemCounts = BTreeMap<String, u32>;

/// A stack of items of one kind with optional per-instance state.
///
/// Equipment taken out of a grid keeps its properties (e.g. remaining shield
/// charge or durability) so it can be put back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub count: u32,
    #[serde(default)]
    pub properties: BTreeMap<String, Fixed64>,
}

impl ItemStack {
    pub fn new(name: &str, count: u32) -> Self {
        Self {
            name: name.to_string(),
            count,
            properties: BTreeMap::new(),
        }
    }

    /// A single unit of `name`.
    pub fn single(name: &str) -> Self {
        Self::new(name, 1)
    }

    pub fn with_property(mut self, key: &str, value: Fixed64) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn get_property(&self, key: &str) -> Option<Fixed64> {
        self.properties.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether `other` could merge into this stack.
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.name == other.name && self.properties == other.properties
    }

    /// Split off up to `count` units into a new stack with the same state.
    pub fn split(&mut self, count: u32) -> ItemStack {
        let taken = count.min(self.count);
        self.count -= taken;
        ItemStack {
            name: self.name.clone(),
            count: taken,
            properties: self.properties.clone(),
        }
    }
}
