//! Conversion between grid configurations and flat placeholder records.
//!
//! A template is one placeholder per grid cell in row-major order. The
//! anchor cell of every equipment unit carries the unit's kind as an item
//! signal in slot 1. The bordered variant additionally paints every other
//! cell of the unit's footprint with virtual colour signals so the layout
//! is readable when the placeholders are viewed in the world.

use crate::TemplateConfig;
use crate::record::{PRIMARY_SLOT, Signal, TemplateRecord, sort_records};
use loadout_core::catalog::ShapeLookup;
use loadout_core::grid::{EquipmentShape, GridConfiguration, GridDimensions, Position};
use loadout_core::host::EquipmentGrid;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Border palette
// ---------------------------------------------------------------------------

/// Colours used to outline units in the bordered variant.
///
/// The `n`-th unit (in insertion order) is outlined with
/// `colors[n % colors.len()]`; inner edges of a footprint use `filler`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderPalette {
    pub colors: Vec<String>,
    pub filler: String,
}

impl Default for BorderPalette {
    fn default() -> Self {
        Self {
            colors: [
                "signal-red",
                "signal-green",
                "signal-blue",
                "signal-yellow",
                "signal-pink",
                "signal-cyan",
                "signal-white",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            filler: "signal-black".to_string(),
        }
    }
}

impl BorderPalette {
    /// Border colour for the `n`-th unit. `None` if the palette is empty.
    pub fn border(&self, n: usize) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[n % self.colors.len()].as_str())
    }
}

/// Decorative slots, one per cell side.
const TOP_SLOT: u8 = 2;
const RIGHT_SLOT: u8 = 3;
const BOTTOM_SLOT: u8 = 4;
const LEFT_SLOT: u8 = 5;

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Encodes grids into template records and decodes them back.
pub struct TemplateCodec<'a> {
    shapes: &'a dyn ShapeLookup,
    config: &'a TemplateConfig,
}

impl<'a> TemplateCodec<'a> {
    pub fn new(shapes: &'a dyn ShapeLookup, config: &'a TemplateConfig) -> Self {
        Self { shapes, config }
    }

    /// Encode the equipment currently installed in `grid`.
    ///
    /// Always yields `width * height` records. Units are rendered in scan
    /// order, so border colours do not depend on how the host lists them.
    pub fn encode(&self, grid: &dyn EquipmentGrid, with_borders: bool) -> Vec<TemplateRecord> {
        let mut units: Vec<(String, Position, EquipmentShape)> = grid
            .equipment()
            .into_iter()
            .map(|unit| (unit.name, unit.position, unit.shape))
            .collect();
        units.sort_by_key(|(_, position, _)| *position);
        self.render(grid.dimensions(), &units, with_borders)
    }

    /// Encode a configuration for a grid of size `dims`. Shapes come from
    /// the lookup; unknown kinds render as 1x1.
    pub fn encode_configuration(
        &self,
        configuration: &GridConfiguration,
        dims: GridDimensions,
        with_borders: bool,
    ) -> Vec<TemplateRecord> {
        let mut units: Vec<(String, Position, EquipmentShape)> = configuration
            .iter()
            .map(|(kind, position)| {
                let shape = self.shapes.shape(kind).unwrap_or_else(EquipmentShape::single);
                (kind.to_string(), position, shape)
            })
            .collect();
        units.sort_by_key(|(_, position, _)| *position);
        self.render(dims, &units, with_borders)
    }

    /// Decode records into a configuration. See [`decode`].
    pub fn decode(&self, records: &[TemplateRecord], grid_width: u32) -> GridConfiguration {
        decode(records, grid_width)
    }

    fn render(
        &self,
        dims: GridDimensions,
        units: &[(String, Position, EquipmentShape)],
        with_borders: bool,
    ) -> Vec<TemplateRecord> {
        let kind = self.config.placeholder_kind.as_str();
        let mut records: Vec<TemplateRecord> = dims
            .cells()
            .enumerate()
            .map(|(i, cell)| TemplateRecord::placeholder(kind, i as u32, cell.x as i32, cell.y as i32))
            .collect();

        for (name, anchor, _) in units {
            if let Some(i) = dims.index_of(*anchor) {
                records[i].set_filter(PRIMARY_SLOT, Signal::item(name));
            }
        }

        if with_borders {
            for (n, (_, anchor, shape)) in units.iter().enumerate() {
                let Some(border) = self.config.palette.border(n) else {
                    break;
                };
                self.paint(&mut records, dims, *anchor, *shape, border);
            }
        }

        records
    }

    /// Outline one footprint. Cells that already carry a signal are left
    /// alone, so anchors keep only their primary filter.
    fn paint(
        &self,
        records: &mut [TemplateRecord],
        dims: GridDimensions,
        anchor: Position,
        shape: EquipmentShape,
        border: &str,
    ) {
        let filler = self.config.palette.filler.as_str();
        let last_x = anchor.x + shape.width.saturating_sub(1);
        let last_y = anchor.y + shape.height.saturating_sub(1);

        for tile in shape.tiles(anchor) {
            let Some(i) = dims.index_of(tile) else {
                continue;
            };
            let record = &mut records[i];
            if !record.is_empty() {
                continue;
            }
            let side = |on_edge: bool| {
                Signal::virtual_signal(if on_edge { border } else { filler })
            };
            record.set_filter(TOP_SLOT, side(tile.y == anchor.y));
            record.set_filter(RIGHT_SLOT, side(tile.x == last_x));
            record.set_filter(BOTTOM_SLOT, side(tile.y == last_y));
            record.set_filter(LEFT_SLOT, side(tile.x == anchor.x));
        }
    }
}

/// Decode records into a configuration.
///
/// Records are sorted by their stored `(y, x)`; the record of sorted rank
/// `i` maps to cell `(i % grid_width, i / grid_width)` regardless of the
/// coordinates it carried. Only the primary slot is read, and units are
/// inserted in sorted order.
pub fn decode(records: &[TemplateRecord], grid_width: u32) -> GridConfiguration {
    let mut configuration = GridConfiguration::new();
    if grid_width == 0 {
        return configuration;
    }
    let mut sorted = records.to_vec();
    sort_records(&mut sorted);

    let width = grid_width as usize;
    for (i, record) in sorted.iter().enumerate() {
        if let Some(signal) = record.primary() {
            let position = Position::new((i % width) as u32, (i / width) as u32);
            configuration.push(&signal.name, position);
        }
    }
    configuration
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadout_core::test_utils::*;

    fn config() -> TemplateConfig {
        TemplateConfig::default()
    }

    #[test]
    fn empty_grid_encodes_empty_placeholders() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let grid = TestGrid::new(GridDimensions::new(1, 1), test_catalog());

        let records = codec.encode(&grid, false);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
        assert_eq!(records[0].kind, "constant-combinator");
    }

    #[test]
    fn encode_marks_anchor_only() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let mut grid = TestGrid::new(GridDimensions::new(3, 2), test_catalog());
        assert!(grid.put(&loadout_core::item::ItemStack::single(SHIELD), pos(1, 0)));

        let records = codec.encode(&grid, false);
        assert_eq!(records.len(), 6);
        assert_eq!(records[1].primary(), Some(&Signal::item(SHIELD)));
        let marked = records.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(marked, 1);
    }

    #[test]
    fn border_colours_follow_layout_not_install_order() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let dims = GridDimensions::new(4, 4);
        let layout = [(SHIELD, pos(0, 0)), (BATTERY, pos(2, 0)), (SOLAR, pos(3, 3))];

        let mut forward = TestGrid::new(dims, test_catalog());
        for (kind, at) in layout {
            assert!(forward.put(&loadout_core::item::ItemStack::single(kind), at));
        }
        let mut backward = TestGrid::new(dims, test_catalog());
        for (kind, at) in layout.into_iter().rev() {
            assert!(backward.put(&loadout_core::item::ItemStack::single(kind), at));
        }

        let records = codec.encode(&forward, true);
        assert_eq!(records, codec.encode(&backward, true));
        let configuration: GridConfiguration = layout.into_iter().collect();
        assert_eq!(records, codec.encode_configuration(&configuration, dims, true));
    }

    #[test]
    fn records_carry_row_major_coordinates() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let records =
            codec.encode_configuration(&GridConfiguration::new(), GridDimensions::new(3, 2), false);
        let coords: Vec<(u32, i32, i32)> = records.iter().map(|r| (r.index, r.x, r.y)).collect();
        assert_eq!(
            coords,
            vec![(0, 0, 0), (1, 1, 0), (2, 2, 0), (3, 0, 1), (4, 1, 1), (5, 2, 1)]
        );
    }

    #[test]
    fn bordered_2x2_outlines_non_anchor_cells() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let configuration: GridConfiguration = [(SHIELD, pos(0, 0))].into_iter().collect();

        let records = codec.encode_configuration(&configuration, GridDimensions::new(2, 2), true);

        // Anchor: primary only.
        assert_eq!(records[0].filters.len(), 1);
        // (1,0): top and right on the outline, bottom and left inner.
        let red = Signal::virtual_signal("signal-red");
        let black = Signal::virtual_signal("signal-black");
        assert_eq!(records[1].filter(2), Some(&red));
        assert_eq!(records[1].filter(3), Some(&red));
        assert_eq!(records[1].filter(4), Some(&black));
        assert_eq!(records[1].filter(5), Some(&black));
        // (0,1): bottom and left on the outline.
        assert_eq!(records[2].filter(2), Some(&black));
        assert_eq!(records[2].filter(4), Some(&red));
        assert_eq!(records[2].filter(5), Some(&red));
        assert!(records[3].primary().is_none());
        assert_eq!(records[3].filters.len(), 4);
    }

    #[test]
    fn border_colours_cycle_by_unit() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        // Eight batteries (1x2) side by side: the eighth wraps to red again.
        let configuration: GridConfiguration =
            (0..8).map(|x| (BATTERY, pos(x, 0))).collect();
        let records = codec.encode_configuration(&configuration, GridDimensions::new(8, 2), true);

        let lower = |x: usize| records[8 + x].filter(2).map(|s| s.name.clone());
        assert_eq!(lower(0), Some("signal-black".to_string()));
        assert_eq!(records[8].filter(4).map(|s| s.name.as_str()), Some("signal-red"));
        assert_eq!(records[9].filter(4).map(|s| s.name.as_str()), Some("signal-green"));
        assert_eq!(records[15].filter(4).map(|s| s.name.as_str()), Some("signal-red"));
    }

    #[test]
    fn decode_uses_sorted_rank_not_stored_coordinates() {
        // Stored coordinates are offset and shuffled; only their order matters.
        let mut a = TemplateRecord::placeholder("constant-combinator", 0, 10, 5);
        a.set_filter(1, Signal::item(SOLAR));
        let b = TemplateRecord::placeholder("constant-combinator", 1, 11, 5);
        let mut c = TemplateRecord::placeholder("constant-combinator", 2, 10, 6);
        c.set_filter(1, Signal::item(BATTERY));
        let d = TemplateRecord::placeholder("constant-combinator", 3, 11, 6);

        let configuration = decode(&[d, c, b, a], 2);
        assert_eq!(configuration.positions(SOLAR), &[pos(0, 0)]);
        assert_eq!(configuration.positions(BATTERY), &[pos(0, 1)]);
    }

    #[test]
    fn decode_ignores_decorative_slots() {
        let mut record = TemplateRecord::placeholder("constant-combinator", 0, 0, 0);
        record.set_filter(2, Signal::virtual_signal("signal-red"));
        assert!(decode(&[record], 1).is_empty());
    }

    #[test]
    fn decode_zero_width_is_empty() {
        let mut record = TemplateRecord::placeholder("constant-combinator", 0, 0, 0);
        record.set_filter(1, Signal::item(SOLAR));
        assert!(decode(&[record], 0).is_empty());
    }

    #[test]
    fn bordered_decodes_to_anchors() {
        let catalog = test_catalog();
        let cfg = config();
        let codec = TemplateCodec::new(&catalog, &cfg);
        let configuration: GridConfiguration =
            [(SHIELD, pos(0, 0)), (BATTERY, pos(2, 0)), (SOLAR, pos(3, 1))]
                .into_iter()
                .collect();
        let records = codec.encode_configuration(&configuration, GridDimensions::new(4, 2), true);
        assert!(codec.decode(&records, 4).same_units(&configuration));
    }
}
