//! Pen colors and the AutoCAD Color Index (ACI) palette.
//!
//! DXF files identify colors through a small integer index rather than
//! RGB values. Plotter drawings only ever use a handful of pens, so the
//! mapping is a fixed 7-entry table. Both directions are total: an
//! unmapped color degrades to a defined default instead of erroring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB pen color.
///
/// Serialized as a `"#RRGGBB"` hex string in the JSON document schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Creates a color from its red, green and blue components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with '#': {}", s))?;
        if hex.len() != 6 {
            return Err(format!("Color must be #RRGGBB: {}", s));
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("Invalid hex digit: {}", e))
        };
        Ok(Rgb {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Convert an RGB pen color to its AutoCAD Color Index.
///
/// Exact match against the 7-entry palette; anything else maps to 7.
/// Pure black also maps to 7 - in the AutoCAD convention index 7 is
/// "white/black", drawn in whichever color contrasts with the canvas.
pub fn to_aci(color: Rgb) -> u8 {
    match (color.r, color.g, color.b) {
        (255, 0, 0) => 1,
        (255, 255, 0) => 2,
        (0, 255, 0) => 3,
        (0, 255, 255) => 4,
        (0, 0, 255) => 5,
        (255, 0, 255) => 6,
        (0, 0, 0) => 7,
        (255, 255, 255) => 7,
        _ => 7,
    }
}

/// Convert an AutoCAD Color Index back to an RGB pen color.
///
/// Index 7 comes back as black (the canvas is white), and any index
/// outside the palette degrades to black as well.
pub fn from_aci(index: u8) -> Rgb {
    match index {
        1 => Rgb::RED,
        2 => Rgb::YELLOW,
        3 => Rgb::GREEN,
        4 => Rgb::CYAN,
        5 => Rgb::BLUE,
        6 => Rgb::MAGENTA,
        7 => Rgb::BLACK,
        _ => Rgb::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color: Rgb = "#ff8001".parse().unwrap();
        assert_eq!(color, Rgb::new(255, 128, 1));
        assert_eq!(color.to_string(), "#FF8001");
    }

    #[test]
    fn test_hex_rejects_malformed() {
        assert!("ff0000".parse::<Rgb>().is_err());
        assert!("#ff00".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_palette_round_trip() {
        for index in 1..=6u8 {
            assert_eq!(to_aci(from_aci(index)), index);
        }
        // Index 7 is the white/black pair; it comes back as black.
        assert_eq!(from_aci(7), Rgb::BLACK);
        assert_eq!(to_aci(Rgb::BLACK), 7);
        assert_eq!(to_aci(Rgb::WHITE), 7);
    }

    #[test]
    fn test_unmapped_color_defaults_to_seven() {
        let odd = Rgb::new(17, 99, 204);
        assert_eq!(to_aci(odd), 7);
        // Deterministic across repeated calls.
        assert_eq!(to_aci(odd), to_aci(odd));
    }

    #[test]
    fn test_unknown_index_defaults_to_black() {
        assert_eq!(from_aci(0), Rgb::BLACK);
        assert_eq!(from_aci(42), Rgb::BLACK);
        assert_eq!(from_aci(255), Rgb::BLACK);
    }
}
