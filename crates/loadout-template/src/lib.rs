//! Equipment-grid templates: encoding, decoding, and validation.
//!
//! A template describes a target equipment layout as one placeholder record
//! per grid cell. The [`codec::TemplateCodec`] turns a live grid or a
//! [`GridConfiguration`](loadout_core::grid::GridConfiguration) into records
//! and back; the [`validate::TemplateValidator`] decides whether a template
//! can be applied to a grid of a given size.

use serde::{Deserialize, Serialize};

pub mod blueprint;
pub mod codec;
pub mod record;
pub mod validate;

#[cfg(feature = "blueprint-io")]
pub use blueprint::BlueprintIoError;
pub use blueprint::Template;
pub use codec::{BorderPalette, TemplateCodec, decode};
pub use record::{Signal, SignalFilter, SignalKind, TemplateRecord};
pub use validate::{TemplateError, TemplateValidator};

/// Template settings shared by the codec and validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Entity kind every placeholder record must have.
    pub placeholder_kind: String,
    pub palette: BorderPalette,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            placeholder_kind: "constant-combinator".to_string(),
            palette: BorderPalette::default(),
        }
    }
}

impl TemplateConfig {
    pub fn codec<'a>(&'a self, shapes: &'a dyn loadout_core::catalog::ShapeLookup) -> TemplateCodec<'a> {
        TemplateCodec::new(shapes, self)
    }

    pub fn validator<'a>(
        &'a self,
        shapes: &'a dyn loadout_core::catalog::ShapeLookup,
    ) -> TemplateValidator<'a> {
        TemplateValidator::new(shapes, &self.placeholder_kind)
    }
}
