//! A portable template: grid size plus its placeholder records.
//!
//! The host's blueprint-string format is treated as an opaque boundary; this
//! type is what crosses it. With the `blueprint-io` feature it can be saved
//! and loaded as JSON.

use crate::record::TemplateRecord;
use loadout_core::grid::GridDimensions;
use serde::{Deserialize, Serialize};

/// Error type for template save/load I/O operations.
#[cfg(feature = "blueprint-io")]
#[derive(Debug, thiserror::Error)]
pub enum BlueprintIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("deserialization error: {0}")]
    Deserialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub width: u32,
    pub height: u32,
    pub records: Vec<TemplateRecord>,
}

impl Template {
    pub fn new(dims: GridDimensions, records: Vec<TemplateRecord>) -> Self {
        Self {
            width: dims.width,
            height: dims.height,
            records,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }

    #[cfg(feature = "blueprint-io")]
    pub fn to_json(&self) -> Result<String, BlueprintIoError> {
        serde_json::to_string(self).map_err(BlueprintIoError::Serialize)
    }

    #[cfg(feature = "blueprint-io")]
    pub fn from_json(json: &str) -> Result<Self, BlueprintIoError> {
        serde_json::from_str(json).map_err(BlueprintIoError::Deserialize)
    }

    /// Save this template to a JSON file.
    #[cfg(feature = "blueprint-io")]
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), BlueprintIoError> {
        let json = serde_json::to_string_pretty(self).map_err(BlueprintIoError::Serialize)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a template from a JSON file.
    #[cfg(feature = "blueprint-io")]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, BlueprintIoError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
