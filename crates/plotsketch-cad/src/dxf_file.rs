//! In-memory representation of a DXF drawing.
//!
//! Entities carry modelspace coordinates in drawing units (millimeters
//! for everything plotsketch writes) together with their layer name and
//! AutoCAD color index. Group code 62 colors keep their raw value so
//! the importer can resolve the ByLayer/ByBlock sentinels itself.

use plotsketch_core::Point;

/// Drawing unit recorded in the `$INSUNITS` header variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DxfUnit {
    Unitless,
    Inches,
    Feet,
    #[default]
    Millimeters,
    Centimeters,
    Meters,
}

impl DxfUnit {
    /// Decode an `$INSUNITS` value; unknown codes fall back to mm.
    pub fn from_insunits(code: i32) -> Self {
        match code {
            0 => Self::Unitless,
            1 => Self::Inches,
            2 => Self::Feet,
            4 => Self::Millimeters,
            5 => Self::Centimeters,
            6 => Self::Meters,
            _ => Self::Millimeters,
        }
    }

    /// The `$INSUNITS` value for this unit.
    pub fn to_insunits(self) -> i32 {
        match self {
            Self::Unitless => 0,
            Self::Inches => 1,
            Self::Feet => 2,
            Self::Millimeters => 4,
            Self::Centimeters => 5,
            Self::Meters => 6,
        }
    }

    /// Multiplier converting one of this unit into millimeters.
    /// Unitless drawings are taken to already be in millimeters.
    pub fn to_mm_factor(self) -> f64 {
        match self {
            Self::Unitless => 1.0,
            Self::Inches => 25.4,
            Self::Feet => 304.8,
            Self::Millimeters => 1.0,
            Self::Centimeters => 10.0,
            Self::Meters => 1000.0,
        }
    }
}

/// DXF header variables plotsketch cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfHeader {
    /// `$ACADVER` marker (AC1024 = R2010).
    pub version: String,
    /// `$INSUNITS` drawing unit.
    pub unit: DxfUnit,
}

impl Default for DxfHeader {
    fn default() -> Self {
        Self {
            version: "AC1024".to_string(),
            unit: DxfUnit::Millimeters,
        }
    }
}

/// A layer entry from the TABLES section.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfLayer {
    pub name: String,
    /// Default color index for entities on this layer.
    pub color: i16,
}

/// LINE entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfLine {
    pub start: Point,
    pub end: Point,
    pub layer: String,
    pub color: i16,
}

/// CIRCLE entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfCircle {
    pub center: Point,
    pub radius: f64,
    pub layer: String,
    pub color: i16,
}

/// ARC entity. Angles are in degrees, counter-clockwise from +X.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub layer: String,
    pub color: i16,
}

/// ELLIPSE entity. The major axis is a vector relative to the center;
/// parameters are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfEllipse {
    pub center: Point,
    pub major_axis: (f64, f64),
    /// Minor-to-major axis ratio.
    pub ratio: f64,
    pub start_param: f64,
    pub end_param: f64,
    pub layer: String,
    pub color: i16,
}

/// SPLINE entity reduced to its control polygon and degree.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfSpline {
    pub control_points: Vec<Point>,
    pub degree: usize,
    pub layer: String,
    pub color: i16,
}

/// LWPOLYLINE or legacy POLYLINE/VERTEX/SEQEND entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfPolyline {
    pub vertices: Vec<Point>,
    pub closed: bool,
    /// True for LWPOLYLINE, false for the legacy POLYLINE form.
    pub lightweight: bool,
    pub layer: String,
    pub color: i16,
}

/// Entity type discriminant, mainly for statistics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxfEntityType {
    Line,
    Circle,
    Arc,
    Ellipse,
    Spline,
    LwPolyline,
    Polyline,
    Unsupported,
}

/// A modelspace entity.
#[derive(Debug, Clone, PartialEq)]
pub enum DxfEntity {
    Line(DxfLine),
    Circle(DxfCircle),
    Arc(DxfArc),
    Ellipse(DxfEllipse),
    Spline(DxfSpline),
    Polyline(DxfPolyline),
    /// Anything the importer does not understand. Tallied, never an
    /// error.
    Unsupported {
        type_name: String,
    },
}

impl DxfEntity {
    pub fn entity_type(&self) -> DxfEntityType {
        match self {
            DxfEntity::Line(_) => DxfEntityType::Line,
            DxfEntity::Circle(_) => DxfEntityType::Circle,
            DxfEntity::Arc(_) => DxfEntityType::Arc,
            DxfEntity::Ellipse(_) => DxfEntityType::Ellipse,
            DxfEntity::Spline(_) => DxfEntityType::Spline,
            DxfEntity::Polyline(p) => {
                if p.lightweight {
                    DxfEntityType::LwPolyline
                } else {
                    DxfEntityType::Polyline
                }
            }
            DxfEntity::Unsupported { .. } => DxfEntityType::Unsupported,
        }
    }

    /// Layer this entity sits on, if it carries one.
    pub fn layer(&self) -> Option<&str> {
        match self {
            DxfEntity::Line(e) => Some(&e.layer),
            DxfEntity::Circle(e) => Some(&e.layer),
            DxfEntity::Arc(e) => Some(&e.layer),
            DxfEntity::Ellipse(e) => Some(&e.layer),
            DxfEntity::Spline(e) => Some(&e.layer),
            DxfEntity::Polyline(e) => Some(&e.layer),
            DxfEntity::Unsupported { .. } => None,
        }
    }

    /// Raw group 62 color, if the entity carries one.
    pub fn color(&self) -> Option<i16> {
        match self {
            DxfEntity::Line(e) => Some(e.color),
            DxfEntity::Circle(e) => Some(e.color),
            DxfEntity::Arc(e) => Some(e.color),
            DxfEntity::Ellipse(e) => Some(e.color),
            DxfEntity::Spline(e) => Some(e.color),
            DxfEntity::Polyline(e) => Some(e.color),
            DxfEntity::Unsupported { .. } => None,
        }
    }
}

/// A parsed or to-be-written DXF drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DxfFile {
    pub header: DxfHeader,
    pub layers: Vec<DxfLayer>,
    pub entities: Vec<DxfEntity>,
}

impl DxfFile {
    /// Creates an empty drawing with the default header (mm, R2010).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: DxfLayer) {
        self.layers.push(layer);
    }

    pub fn add_entity(&mut self, entity: DxfEntity) {
        self.entities.push(entity);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Names of all layers defined in the TABLES section.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Default color of the named layer, if defined.
    pub fn layer_color(&self, name: &str) -> Option<i16> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion_inches_to_mm() {
        let factor = DxfUnit::Inches.to_mm_factor();
        assert!((factor - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_unit_insunits_round_trip() {
        for unit in [
            DxfUnit::Unitless,
            DxfUnit::Inches,
            DxfUnit::Feet,
            DxfUnit::Millimeters,
            DxfUnit::Centimeters,
            DxfUnit::Meters,
        ] {
            assert_eq!(DxfUnit::from_insunits(unit.to_insunits()), unit);
        }
        assert_eq!(DxfUnit::from_insunits(99), DxfUnit::Millimeters);
    }

    #[test]
    fn test_header_default() {
        let header = DxfHeader::default();
        assert_eq!(header.version, "AC1024");
        assert_eq!(header.unit, DxfUnit::Millimeters);
    }

    #[test]
    fn test_file_layers() {
        let mut file = DxfFile::new();
        assert_eq!(file.entity_count(), 0);

        file.add_layer(DxfLayer {
            name: "STROKES".to_string(),
            color: 7,
        });
        file.add_entity(DxfEntity::Line(DxfLine {
            start: Point::new(0.0, 0.0),
            end: Point::new(1.0, 1.0),
            layer: "STROKES".to_string(),
            color: 256,
        }));

        assert_eq!(file.entity_count(), 1);
        assert_eq!(file.layer_names(), vec!["STROKES"]);
        assert_eq!(file.layer_color("STROKES"), Some(7));
        assert_eq!(file.layer_color("MISSING"), None);
    }

    #[test]
    fn test_entity_type_distinguishes_polyline_forms() {
        let mut poly = DxfPolyline {
            vertices: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            closed: false,
            lightweight: true,
            layer: "0".to_string(),
            color: 256,
        };
        assert_eq!(
            DxfEntity::Polyline(poly.clone()).entity_type(),
            DxfEntityType::LwPolyline
        );
        poly.lightweight = false;
        assert_eq!(
            DxfEntity::Polyline(poly).entity_type(),
            DxfEntityType::Polyline
        );
    }
}
