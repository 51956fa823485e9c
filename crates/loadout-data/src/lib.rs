pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Loadout, load_loadout};
pub use schema::{EngineConfig, EquipmentData};
