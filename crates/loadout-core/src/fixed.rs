use crate::id::SurfaceId;
use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of host simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization and tests.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and logging.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// A world coordinate on a surface, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: Fixed64,
    pub y: Fixed64,
}

impl MapPosition {
    pub fn new(x: Fixed64, y: Fixed64) -> Self {
        Self { x, y }
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(f64_to_fixed64(x), f64_to_fixed64(y))
    }
}

/// Where something is: a surface plus a position on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub surface: SurfaceId,
    pub position: MapPosition,
}

impl Location {
    pub fn new(surface: SurfaceId, position: MapPosition) -> Self {
        Self { surface, position }
    }

    pub fn same_surface(&self, other: &Location) -> bool {
        self.surface == other.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_round_trip() {
        let v = f64_to_fixed64(12.5);
        assert_eq!(fixed64_to_f64(v), 12.5);
    }

    #[test]
    fn map_position_from_f64() {
        let p = MapPosition::from_f64(-3.5, 7.25);
        assert_eq!(fixed64_to_f64(p.x), -3.5);
        assert_eq!(fixed64_to_f64(p.y), 7.25);
    }

    #[test]
    fn same_surface_ignores_position() {
        let a = Location::new(SurfaceId(1), MapPosition::from_f64(0.0, 0.0));
        let b = Location::new(SurfaceId(1), MapPosition::from_f64(100.0, -40.0));
        let c = Location::new(SurfaceId(2), MapPosition::from_f64(0.0, 0.0));
        assert!(a.same_surface(&b));
        assert!(!a.same_surface(&c));
    }
}
