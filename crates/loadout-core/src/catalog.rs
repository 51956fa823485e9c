use crate::grid::EquipmentShape;
use std::collections::HashMap;

/// Read-only lookup of an equipment kind's footprint by name.
pub trait ShapeLookup {
    fn shape(&self, name: &str) -> Option<EquipmentShape>;

    fn is_equipment(&self, name: &str) -> bool {
        self.shape(name).is_some()
    }
}

/// An equipment kind definition in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentDef {
    pub name: String,
    pub shape: EquipmentShape,
}

/// Builder for constructing an immutable [`EquipmentCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    defs: Vec<EquipmentDef>,
    name_to_index: HashMap<String, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an equipment kind. Returns an error on a duplicate name.
    pub fn register(&mut self, name: &str, shape: EquipmentShape) -> Result<&mut Self, CatalogError> {
        if self.name_to_index.contains_key(name) {
            return Err(CatalogError::Duplicate(name.to_string()));
        }
        self.name_to_index.insert(name.to_string(), self.defs.len());
        self.defs.push(EquipmentDef {
            name: name.to_string(),
            shape,
        });
        Ok(self)
    }

    /// Replace the shape of an already registered kind.
    pub fn mutate<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut EquipmentDef),
    {
        let idx = *self
            .name_to_index
            .get(name)
            .ok_or(CatalogError::NotFound(name.to_string()))?;
        f(&mut self.defs[idx]);
        Ok(())
    }

    /// Finalize. Every shape must have a positive width and height.
    pub fn build(self) -> Result<EquipmentCatalog, CatalogError> {
        for def in &self.defs {
            if def.shape.width == 0 || def.shape.height == 0 {
                return Err(CatalogError::EmptyShape(def.name.clone()));
            }
        }
        Ok(EquipmentCatalog {
            defs: self.defs,
            name_to_index: self.name_to_index,
        })
    }
}

/// Immutable equipment catalog. Frozen after build().
#[derive(Debug, Clone, Default)]
pub struct EquipmentCatalog {
    defs: Vec<EquipmentDef>,
    name_to_index: HashMap<String, usize>,
}

impl EquipmentCatalog {
    pub fn get(&self, name: &str) -> Option<&EquipmentDef> {
        self.name_to_index.get(name).map(|&i| &self.defs[i])
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EquipmentDef> {
        self.defs.iter()
    }
}

impl ShapeLookup for EquipmentCatalog {
    fn shape(&self, name: &str) -> Option<EquipmentShape> {
        self.get(name).map(|def| def.shape)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate equipment kind: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("equipment kind {0} has a zero-sized shape")]
    EmptyShape(String),
}
