//! Grid configuration model: cell positions, equipment footprints, and the
//! kind-to-positions mapping passed between the codec, validator, and engine.

use crate::item::{ItemCounts, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell in an equipment grid. 0-based, `(0, 0)` is the upper-left cell.
///
/// Ordered row-major (by `y`, then `x`), which is the grid scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// The size of an equipment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Row-major position of the `index`-th cell. `None` for a zero-width grid.
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if self.width == 0 {
            return None;
        }
        let width = self.width as usize;
        Some(Position::new((index % width) as u32, (index / width) as u32))
    }

    /// Row-major index of a cell, if it lies inside the grid.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    /// All cells in scan order.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let w = self.width;
        let h = self.height;
        (0..h).flat_map(move |y| (0..w).map(move |x| Position::new(x, y)))
    }
}

// ---------------------------------------------------------------------------
// EquipmentShape
// ---------------------------------------------------------------------------

/// The footprint of an equipment kind, anchored at its upper-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentShape {
    pub width: u32,
    pub height: u32,
}

impl EquipmentShape {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 1x1 shape.
    pub fn single() -> Self {
        Self::new(1, 1)
    }

    /// Iterate over all cells covered when anchored at `anchor`, row-major.
    pub fn tiles(&self, anchor: Position) -> impl Iterator<Item = Position> {
        let w = self.width;
        let h = self.height;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| Position::new(anchor.x + dx, anchor.y + dy)))
    }

    /// Whether the footprint anchored at `anchor` lies entirely inside the grid.
    pub fn fits(&self, anchor: Position, dims: GridDimensions) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let right = anchor.x as u64 + self.width as u64;
        let bottom = anchor.y as u64 + self.height as u64;
        right <= dims.width as u64 && bottom <= dims.height as u64
    }
}

// ---------------------------------------------------------------------------
// Placed equipment
// ---------------------------------------------------------------------------

/// A unit of equipment currently installed in a live grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEquipment {
    pub name: String,
    pub position: Position,
    pub shape: EquipmentShape,
    /// The unit's item state (charge, durability). Opaque to this crate.
    pub stack: ItemStack,
}

// ---------------------------------------------------------------------------
// GridConfiguration
// ---------------------------------------------------------------------------

/// Desired grid state: equipment kind -> anchor positions.
///
/// Each `(kind, position)` pair is one unit. Kinds iterate in name order;
/// positions keep insertion order, which is the order units are satisfied in.
/// Overlap freedom is not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfiguration {
    entries: BTreeMap<String, Vec<Position>>,
}

impl GridConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot what is currently installed in `grid`, in scan order.
    pub fn from_grid(grid: &dyn crate::host::EquipmentGrid) -> Self {
        let mut placed = grid.equipment();
        placed.sort_by_key(|p| p.position);
        let mut config = Self::new();
        for unit in placed {
            config.push(&unit.name, unit.position);
        }
        config
    }

    /// Append one unit of `kind` at `position`.
    pub fn push(&mut self, kind: &str, position: Position) {
        self.entries.entry(kind.to_string()).or_default().push(position);
    }

    /// Whether a unit of `kind` is wanted at `position`.
    pub fn contains(&self, kind: &str, position: Position) -> bool {
        self.entries
            .get(kind)
            .is_some_and(|positions| positions.contains(&position))
    }

    /// Positions wanted for `kind`, in insertion order.
    pub fn positions(&self, kind: &str) -> &[Position] {
        self.entries.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove one unit. Returns false if it was not present.
    pub fn remove(&mut self, kind: &str, position: Position) -> bool {
        let Some(positions) = self.entries.get_mut(kind) else {
            return false;
        };
        let Some(idx) = positions.iter().position(|p| *p == position) else {
            return false;
        };
        positions.remove(idx);
        if positions.is_empty() {
            self.entries.remove(kind);
        }
        true
    }

    /// Drop every unit of `kind`, returning its positions.
    pub fn remove_kind(&mut self, kind: &str) -> Vec<Position> {
        self.entries.remove(kind).unwrap_or_default()
    }

    /// Pop the first queued position for `kind`.
    pub fn pop_front(&mut self, kind: &str) -> Option<Position> {
        let positions = self.entries.get_mut(kind)?;
        if positions.is_empty() {
            return None;
        }
        let position = positions.remove(0);
        if positions.is_empty() {
            self.entries.remove(kind);
        }
        Some(position)
    }

    /// Iterate over kinds and their position lists.
    pub fn kinds(&self) -> impl Iterator<Item = (&str, &[Position])> {
        self.entries
            .iter()
            .map(|(kind, positions)| (kind.as_str(), positions.as_slice()))
    }

    /// Iterate over every unit as `(kind, position)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.entries
            .iter()
            .flat_map(|(kind, positions)| positions.iter().map(move |p| (kind.as_str(), *p)))
    }

    /// Total number of units.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Number of units wanted per kind.
    pub fn counts(&self) -> ItemCounts {
        self.entries
            .iter()
            .filter(|(_, positions)| !positions.is_empty())
            .map(|(kind, positions)| (kind.clone(), positions.len() as u32))
            .collect()
    }

    /// Append every unit of `other`, keeping its per-kind order.
    pub fn extend(&mut self, other: &GridConfiguration) {
        for (kind, position) in other.iter() {
            self.push(kind, position);
        }
    }

    /// Equality ignoring position order within a kind.
    pub fn same_units(&self, other: &GridConfiguration) -> bool {
        let as_sets = |c: &GridConfiguration| -> BTreeMap<String, BTreeSet<Position>> {
            c.entries
                .iter()
                .filter(|(_, p)| !p.is_empty())
                .map(|(k, p)| (k.clone(), p.iter().copied().collect()))
                .collect()
        };
        self.len() == other.len() && as_sets(self) == as_sets(other)
    }
}

impl<'a> FromIterator<(&'a str, Position)> for GridConfiguration {
    fn from_iter<I: IntoIterator<Item = (&'a str, Position)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (kind, position) in iter {
            config.push(kind, position);
        }
        config
    }
}
