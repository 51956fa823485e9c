//! Structural validation of an encoded template against a target grid.
//!
//! Runs at template-authoring time; reconciliation assumes its input already
//! passed. Rules are checked in a fixed order and the first failure wins.

use crate::record::{MAX_SLOT, PRIMARY_SLOT, SignalKind, TemplateRecord, sort_records};
use loadout_core::catalog::ShapeLookup;
use loadout_core::grid::{GridDimensions, Position};

/// Why a template does not fit a grid. `record` is the rank in scan order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template has no records")]
    Empty,
    #[error("template has {actual} records, grid has {expected} cells")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("record {record} is a {kind}, not a placeholder")]
    NotPlaceholder { record: usize, kind: String },
    #[error("record {record} has {count} filters")]
    TooManyFilters { record: usize, count: usize },
    #[error("record {record} uses filter slot {slot}")]
    InvalidSlot { record: usize, slot: u8 },
    #[error("record {record} sets filter slot {slot} twice")]
    DuplicateSlot { record: usize, slot: u8 },
    #[error("record {record} anchors unknown equipment {name}")]
    UnknownEquipment { record: usize, name: String },
    #[error("record {record} decorates slot {slot} with non-virtual signal {name}")]
    PhysicalDecoration { record: usize, slot: u8, name: String },
    #[error("{name} at {position:?} extends past the grid")]
    OutOfBounds { name: String, position: Position },
    #[error("{name} at {position:?} overlaps earlier equipment")]
    Overlap { name: String, position: Position },
}

/// Checks templates against grid dimensions.
pub struct TemplateValidator<'a> {
    shapes: &'a dyn ShapeLookup,
    placeholder_kind: &'a str,
}

impl<'a> TemplateValidator<'a> {
    pub fn new(shapes: &'a dyn ShapeLookup, placeholder_kind: &'a str) -> Self {
        Self {
            shapes,
            placeholder_kind,
        }
    }

    pub fn is_valid(&self, dims: GridDimensions, records: &[TemplateRecord]) -> bool {
        match self.check(dims, records) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("template rejected: {e}");
                false
            }
        }
    }

    /// Validate, reporting the first rule that fails.
    pub fn check(&self, dims: GridDimensions, records: &[TemplateRecord]) -> Result<(), TemplateError> {
        if records.is_empty() {
            return Err(TemplateError::Empty);
        }
        if records.len() != dims.cell_count() {
            return Err(TemplateError::CellCountMismatch {
                expected: dims.cell_count(),
                actual: records.len(),
            });
        }

        let mut sorted = records.to_vec();
        sort_records(&mut sorted);

        for (i, record) in sorted.iter().enumerate() {
            if record.kind != self.placeholder_kind {
                return Err(TemplateError::NotPlaceholder {
                    record: i,
                    kind: record.kind.clone(),
                });
            }
        }

        for (i, record) in sorted.iter().enumerate() {
            self.check_filters(i, record)?;
        }

        let mut occupied = vec![false; dims.cell_count()];
        for (i, record) in sorted.iter().enumerate() {
            let Some(signal) = record.primary() else {
                continue;
            };
            let Some(anchor) = dims.position_of(i) else {
                continue;
            };
            let shape = self
                .shapes
                .shape(&signal.name)
                .ok_or_else(|| TemplateError::UnknownEquipment {
                    record: i,
                    name: signal.name.clone(),
                })?;
            if !shape.fits(anchor, dims) {
                return Err(TemplateError::OutOfBounds {
                    name: signal.name.clone(),
                    position: anchor,
                });
            }
            for tile in shape.tiles(anchor) {
                let Some(cell) = dims.index_of(tile) else {
                    continue;
                };
                if occupied[cell] {
                    return Err(TemplateError::Overlap {
                        name: signal.name.clone(),
                        position: anchor,
                    });
                }
                occupied[cell] = true;
            }
        }

        Ok(())
    }

    fn check_filters(&self, i: usize, record: &TemplateRecord) -> Result<(), TemplateError> {
        if record.filters.len() > MAX_SLOT as usize {
            return Err(TemplateError::TooManyFilters {
                record: i,
                count: record.filters.len(),
            });
        }
        let mut seen = [false; MAX_SLOT as usize + 1];
        for filter in &record.filters {
            let slot = filter.slot;
            if slot < PRIMARY_SLOT || slot > MAX_SLOT {
                return Err(TemplateError::InvalidSlot { record: i, slot });
            }
            if seen[slot as usize] {
                return Err(TemplateError::DuplicateSlot { record: i, slot });
            }
            seen[slot as usize] = true;

            let signal = &filter.signal;
            if slot == PRIMARY_SLOT {
                if signal.kind != SignalKind::Item || !self.shapes.is_equipment(&signal.name) {
                    return Err(TemplateError::UnknownEquipment {
                        record: i,
                        name: signal.name.clone(),
                    });
                }
            } else if !signal.is_virtual() {
                return Err(TemplateError::PhysicalDecoration {
                    record: i,
                    slot,
                    name: signal.name.clone(),
                });
            }
        }
        Ok(())
    }
}
