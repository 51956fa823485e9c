//! Snapshot support for the delivery registry.
//!
//! Outstanding requests are saved with the host's game state and restored on
//! load. The encoding is `bitcode` behind a versioned header. The scheduler
//! and buffered events are not part of a snapshot.

use crate::delivery::{DeliveryRequest, DeliveryService};
use loadout_core::fixed::Ticks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Magic number identifying a delivery registry snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x10AD_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version {0} (this build reads {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Pipeline tick at the time the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistrySnapshot {
    header: SnapshotHeader,
    requests: Vec<DeliveryRequest>,
}

impl DeliveryService {
    /// Encode every outstanding request.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let snapshot = RegistrySnapshot {
            header: SnapshotHeader::new(self.tick),
            requests: self.requests.values().cloned().collect(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Replace the registry with a decoded snapshot and re-sync the
    /// scheduler. On error the registry is left untouched.
    ///
    /// Handles in the snapshot are trusted as-is; the next tick tears down
    /// any request whose target or container did not survive the load.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
        let snapshot: RegistrySnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let mut requests = BTreeMap::new();
        for request in snapshot.requests {
            requests.insert(request.target, request);
        }
        log::info!("restored {} delivery requests", requests.len());
        self.requests = requests;
        self.tick = snapshot.header.tick;
        self.sync_schedule();
        Ok(())
    }
}
