//! Unit conversion between canvas pixels and physical lengths.
//!
//! The canvas is measured in screen pixels at the standard 96 DPI,
//! while the plotter and the DXF interchange format work in
//! millimeters. Canvas Y grows downward; CAD Y grows upward, so the
//! CAD conversions also flip the vertical axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Point;

/// Pixels per centimeter at 96 DPI (96 / 2.54).
pub const PIXELS_PER_CM: f64 = 96.0 / 2.54;

/// Pixels per millimeter (the DXF interchange scale).
pub const PIXELS_PER_MM: f64 = PIXELS_PER_CM / 10.0;

/// Physical length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalUnit {
    /// Millimeters
    Mm,
    /// Centimeters
    Cm,
}

impl fmt::Display for PhysicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mm => write!(f, "mm"),
            Self::Cm => write!(f, "cm"),
        }
    }
}

impl FromStr for PhysicalUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeters" => Ok(Self::Mm),
            "cm" | "centimeters" => Ok(Self::Cm),
            _ => Err(format!("Unknown physical unit: {}", s)),
        }
    }
}

impl PhysicalUnit {
    /// Pixels per one of this unit.
    fn pixels_per_unit(self) -> f64 {
        match self {
            Self::Mm => PIXELS_PER_MM,
            Self::Cm => PIXELS_PER_CM,
        }
    }
}

/// Convert a pixel length to a physical length.
pub fn pixels_to_physical(px: f64, unit: PhysicalUnit) -> f64 {
    px / unit.pixels_per_unit()
}

/// Convert a physical length to a pixel length.
pub fn physical_to_pixels(value: f64, unit: PhysicalUnit) -> f64 {
    value * unit.pixels_per_unit()
}

/// Convert a canvas pixel point to CAD millimeter coordinates.
///
/// Divides by the mm scale and negates Y (canvas Y grows downward).
pub fn to_cad_point(p: Point) -> (f64, f64) {
    (p.x / PIXELS_PER_MM, -p.y / PIXELS_PER_MM)
}

/// Convert CAD millimeter coordinates back to a canvas pixel point.
pub fn from_cad_point(x: f64, y: f64) -> Point {
    Point::new(x * PIXELS_PER_MM, -y * PIXELS_PER_MM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn relative_eq(a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= 1e-6 * scale
    }

    #[test]
    fn test_pixels_per_cm_constant() {
        // 96 DPI over 2.54 cm/inch.
        assert!((PIXELS_PER_CM - 37.795275591).abs() < 1e-6);
        assert!((PIXELS_PER_MM - 3.7795275591).abs() < 1e-7);
    }

    #[test]
    fn test_physical_conversion() {
        assert!(relative_eq(pixels_to_physical(PIXELS_PER_CM, PhysicalUnit::Cm), 1.0));
        assert!(relative_eq(pixels_to_physical(PIXELS_PER_MM, PhysicalUnit::Mm), 1.0));
        assert!(relative_eq(physical_to_pixels(2.0, PhysicalUnit::Cm), 2.0 * PIXELS_PER_CM));
    }

    #[test]
    fn test_cad_point_flips_y() {
        let (x, y) = to_cad_point(Point::new(0.0, PIXELS_PER_MM));
        assert!(relative_eq(x, 0.0));
        assert!(relative_eq(y, -1.0));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("mm".parse::<PhysicalUnit>().unwrap(), PhysicalUnit::Mm);
        assert_eq!(" CM ".parse::<PhysicalUnit>().unwrap(), PhysicalUnit::Cm);
        assert!("furlong".parse::<PhysicalUnit>().is_err());
    }

    proptest! {
        #[test]
        fn prop_cad_round_trip(x in -1e5f64..1e5, y in -1e5f64..1e5) {
            let p = Point::new(x, y);
            let (cx, cy) = to_cad_point(p);
            let back = from_cad_point(cx, cy);
            prop_assert!(relative_eq(back.x, p.x));
            prop_assert!(relative_eq(back.y, p.y));
        }

        #[test]
        fn prop_length_round_trip(v in 0.0f64..1e5) {
            for unit in [PhysicalUnit::Mm, PhysicalUnit::Cm] {
                let back = physical_to_pixels(pixels_to_physical(v, unit), unit);
                prop_assert!(relative_eq(back, v));
            }
        }
    }
}
