//! Placeholder records and the signals they carry.

use serde::{Deserialize, Serialize};

/// Slot holding the equipment kind anchored at a cell.
pub const PRIMARY_SLOT: u8 = 1;

/// Highest filter slot a placeholder exposes (one primary plus four
/// decorative slots).
pub const MAX_SLOT: u8 = 5;

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// What a signal refers to. Only item signals name physical things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Item,
    Fluid,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub name: String,
}

impl Signal {
    pub fn item(name: &str) -> Self {
        Self {
            kind: SignalKind::Item,
            name: name.to_string(),
        }
    }

    pub fn virtual_signal(name: &str) -> Self {
        Self {
            kind: SignalKind::Virtual,
            name: name.to_string(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.kind == SignalKind::Virtual
    }
}

/// A signal set in one filter slot (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFilter {
    #[serde(rename = "index")]
    pub slot: u8,
    pub signal: Signal,
}

// ---------------------------------------------------------------------------
// TemplateRecord
// ---------------------------------------------------------------------------

/// One placeholder cell of an encoded template.
///
/// `x`/`y` are the coordinates stored in the template, which may be offset
/// or shuffled by the blueprint round trip; consumers sort by them and
/// re-derive the cell from the sorted rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Placeholder entity kind.
    #[serde(rename = "name")]
    pub kind: String,
    /// Row-major cell index at encode time.
    pub index: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub filters: Vec<SignalFilter>,
}

impl TemplateRecord {
    /// An empty placeholder.
    pub fn placeholder(kind: &str, index: u32, x: i32, y: i32) -> Self {
        Self {
            kind: kind.to_string(),
            index,
            x,
            y,
            filters: Vec::new(),
        }
    }

    /// The signal in `slot`, if any.
    pub fn filter(&self, slot: u8) -> Option<&Signal> {
        self.filters
            .iter()
            .find(|f| f.slot == slot)
            .map(|f| &f.signal)
    }

    /// The equipment kind anchored here.
    pub fn primary(&self) -> Option<&Signal> {
        self.filter(PRIMARY_SLOT)
    }

    /// Set `slot`, replacing whatever was there.
    pub fn set_filter(&mut self, slot: u8, signal: Signal) {
        match self.filters.iter_mut().find(|f| f.slot == slot) {
            Some(existing) => existing.signal = signal,
            None => {
                self.filters.push(SignalFilter { slot, signal });
                self.filters.sort_by_key(|f| f.slot);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Sort records into grid scan order by stored `(y, x)`. Ties keep their
/// input order.
pub fn sort_records(records: &mut [TemplateRecord]) {
    records.sort_by_key(|r| (r.y, r.x));
}
