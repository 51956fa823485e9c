//! On-disk formats for engine settings and the equipment catalog.

use loadout_engine::DeliveryConfig;
use loadout_template::TemplateConfig;
use serde::{Deserialize, Serialize};

// ===========================================================================
// Settings
// ===========================================================================

/// Top-level settings read from `loadout.{ron,toml,json}`. Every field is
/// optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub delivery: DeliveryConfig,
    pub template: TemplateConfig,
}

// ===========================================================================
// Equipment catalog
// ===========================================================================

/// One equipment kind in `equipment.{ron,toml,json}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EquipmentData {
    pub name: String,
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
}

fn default_side() -> u32 {
    1
}

/// TOML wrapper: `[[equipment]]` array of tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlEquipment {
    pub equipment: Vec<EquipmentData>,
}
