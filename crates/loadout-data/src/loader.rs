//! Loads engine settings and the equipment catalog from a data directory.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_loadout`] which ties them together.

use crate::schema::{EngineConfig, EquipmentData, TomlEquipment};
use loadout_core::catalog::{CatalogBuilder, CatalogError, EquipmentCatalog};
use loadout_core::grid::EquipmentShape;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Base name of the settings file.
pub const SETTINGS_FILE: &str = "loadout";

/// Base name of the equipment catalog file.
pub const EQUIPMENT_FILE: &str = "equipment";

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The catalog contents were rejected (duplicate kind, zero-sized shape).
    #[error("invalid catalog in {file}: {source}")]
    Catalog {
        file: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml`, or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `ConflictingFormats` if more than
/// one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read the equipment list. TOML files hold it under `[[equipment]]`; RON
/// and JSON files hold a bare list.
pub fn deserialize_equipment(path: &Path) -> Result<Vec<EquipmentData>, DataLoadError> {
    match detect_format(path)? {
        Format::Toml => Ok(deserialize_file::<TomlEquipment>(path)?.equipment),
        Format::Ron | Format::Json => deserialize_file(path),
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Everything read from a data directory.
#[derive(Debug, Clone)]
pub struct Loadout {
    pub config: EngineConfig,
    pub catalog: EquipmentCatalog,
}

/// Build a catalog from parsed entries. `file` is only used in errors.
pub fn build_catalog(entries: &[EquipmentData], file: &Path) -> Result<EquipmentCatalog, DataLoadError> {
    let catalog_error = |source| DataLoadError::Catalog {
        file: file.to_path_buf(),
        source,
    };
    let mut builder = CatalogBuilder::new();
    for entry in entries {
        builder
            .register(&entry.name, EquipmentShape::new(entry.width, entry.height))
            .map_err(catalog_error)?;
    }
    builder.build().map_err(catalog_error)
}

/// Load settings and the equipment catalog from `dir`.
///
/// The settings file is optional and falls back to defaults. The equipment
/// file is required.
pub fn load_loadout(dir: &Path) -> Result<Loadout, DataLoadError> {
    let config = match find_data_file(dir, SETTINGS_FILE)? {
        Some(path) => deserialize_file(&path)?,
        None => {
            log::debug!("no settings file in {}, using defaults", dir.display());
            EngineConfig::default()
        }
    };

    let path = find_data_file(dir, EQUIPMENT_FILE)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: EQUIPMENT_FILE,
        dir: dir.to_path_buf(),
    })?;
    let entries = deserialize_equipment(&path)?;
    let catalog = build_catalog(&entries, &path)?;
    log::info!("loaded {} equipment kinds from {}", catalog.len(), path.display());

    Ok(Loadout { config, catalog })
}

// ===========================================================================
// Tests
// ===========================================================================
