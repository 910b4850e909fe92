//! Sketch document model.
//!
//! The document is the unit of persistence and interchange: an ordered
//! list of freehand strokes, an ordered list of parametric shapes, and
//! the physical canvas size. The surrounding editor owns the document
//! and pushes completed gestures into it; an in-progress gesture never
//! lives here, so the collections only ever hold finished elements.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Rgb;
use crate::error::{Result, SketchError};

/// Represents a 2D point in canvas pixel space.
///
/// Serialized as a `[x, y]` pair in the JSON document schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// One continuous freehand pen path.
///
/// Captured when a pointer drag completes; immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Ordered pen positions in pixel space.
    pub points: Vec<Point>,
    /// Pen color.
    pub color: Rgb,
    /// Stroke width in pixels.
    pub width: f64,
}

/// Kinds of parametric shapes the editor can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Circle,
    Rectangle,
    Triangle,
}

/// A parametric shape defined by the two endpoints of a drag gesture.
///
/// `start`/`end` are interpreted per kind:
/// - `Line`: literal endpoints.
/// - `Circle`: `start` is the center, radius is the distance to `end`.
/// - `Rectangle`: opposite corners, axis-aligned.
/// - `Triangle`: isosceles, apex above the midpoint of the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Rgb,
    /// Outline width in pixels.
    pub width: f64,
}

impl Shape {
    /// Circle radius in pixels. Zero for other kinds.
    pub fn radius(&self) -> f64 {
        match self.kind {
            ShapeKind::Circle => self.start.distance_to(&self.end),
            _ => 0.0,
        }
    }

    /// Corner points of the closed outline, in drawing order.
    ///
    /// Rectangles yield four corners, triangles three. Lines and
    /// circles have no polygonal outline and yield an empty list.
    pub fn corners(&self) -> Vec<Point> {
        let (s, e) = (self.start, self.end);
        match self.kind {
            ShapeKind::Rectangle => vec![
                s,
                Point::new(e.x, s.y),
                e,
                Point::new(s.x, e.y),
            ],
            ShapeKind::Triangle => {
                let mid_x = (s.x + e.x) / 2.0;
                vec![
                    Point::new(mid_x, s.y),
                    Point::new(s.x, e.y),
                    Point::new(e.x, e.y),
                ]
            }
            ShapeKind::Line | ShapeKind::Circle => Vec::new(),
        }
    }
}

/// Physical canvas dimensions in centimeters.
///
/// Governs the scrollable extent of the drawing surface and, through
/// the fixed pixels-per-cm scale, the physical size of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width_cm: 30.0,
            height_cm: 20.0,
        }
    }
}

impl CanvasSize {
    fn validate(&self) -> Result<()> {
        if !(self.width_cm > 0.0 && self.height_cm > 0.0) {
            return Err(SketchError::invalid_geometry(format!(
                "Canvas dimensions must be positive: {} x {} cm",
                self.width_cm, self.height_cm
            )));
        }
        Ok(())
    }
}

/// The authoritative in-memory sketch document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchDocument {
    #[serde(default)]
    pub canvas_size: CanvasSize,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl SketchDocument {
    /// Creates an empty document with the default canvas size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given canvas size.
    pub fn with_canvas_size(canvas_size: CanvasSize) -> Self {
        Self {
            canvas_size,
            ..Self::default()
        }
    }

    /// Appends a completed freehand stroke.
    ///
    /// A stroke needs at least two recorded points and a positive
    /// width; otherwise the document is left untouched.
    pub fn add_stroke(&mut self, points: Vec<Point>, color: Rgb, width: f64) -> Result<()> {
        if points.len() < 2 {
            return Err(SketchError::invalid_geometry(format!(
                "A stroke needs at least 2 points, got {}",
                points.len()
            )));
        }
        if !(width > 0.0) {
            return Err(SketchError::invalid_geometry(format!(
                "Stroke width must be positive, got {}",
                width
            )));
        }
        debug!(points = points.len(), %color, width, "adding stroke");
        self.strokes.push(Stroke {
            points,
            color,
            width,
        });
        Ok(())
    }

    /// Appends a completed parametric shape.
    ///
    /// A circle whose start and end coincide has zero radius and is
    /// rejected; the document is left untouched on failure.
    pub fn add_shape(
        &mut self,
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: Rgb,
        width: f64,
    ) -> Result<()> {
        if kind == ShapeKind::Circle && start == end {
            return Err(SketchError::invalid_geometry(
                "Circle with coincident start and end has zero radius",
            ));
        }
        if !(width > 0.0) {
            return Err(SketchError::invalid_geometry(format!(
                "Shape width must be positive, got {}",
                width
            )));
        }
        debug!(?kind, %color, width, "adding shape");
        self.shapes.push(Shape {
            kind,
            start,
            end,
            color,
            width,
        });
        Ok(())
    }

    /// Empties both element collections, keeping the canvas size.
    /// Idempotent.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.shapes.clear();
    }

    /// Wholesale-replaces this document with another, as the importer
    /// does after a load.
    ///
    /// Atomic: the replacement is validated first, and on failure the
    /// current contents are left untouched.
    pub fn replace(&mut self, other: SketchDocument) -> Result<()> {
        other.validate()?;
        *self = other;
        Ok(())
    }

    /// Checks every document invariant without mutating anything.
    pub fn validate(&self) -> Result<()> {
        self.canvas_size.validate()?;
        for (i, stroke) in self.strokes.iter().enumerate() {
            if stroke.points.len() < 2 {
                return Err(SketchError::invalid_geometry(format!(
                    "Stroke {} has {} points, need at least 2",
                    i,
                    stroke.points.len()
                )));
            }
            if !(stroke.width > 0.0) {
                return Err(SketchError::invalid_geometry(format!(
                    "Stroke {} has non-positive width {}",
                    i, stroke.width
                )));
            }
        }
        for (i, shape) in self.shapes.iter().enumerate() {
            if shape.kind == ShapeKind::Circle && shape.start == shape.end {
                return Err(SketchError::invalid_geometry(format!(
                    "Shape {} is a zero-radius circle",
                    i
                )));
            }
            if !(shape.width > 0.0) {
                return Err(SketchError::invalid_geometry(format!(
                    "Shape {} has non-positive width {}",
                    i, shape.width
                )));
            }
        }
        Ok(())
    }

    /// True when the document holds no strokes and no shapes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty()
    }

    /// Total number of drawable elements.
    pub fn element_count(&self) -> usize {
        self.strokes.len() + self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stroke() {
        let mut doc = SketchDocument::new();
        doc.add_stroke(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            Rgb::BLACK,
            2.0,
        )
        .unwrap();
        assert_eq!(doc.strokes.len(), 1);
    }

    #[test]
    fn test_add_stroke_rejects_single_point() {
        let mut doc = SketchDocument::new();
        let err = doc
            .add_stroke(vec![Point::new(1.0, 1.0)], Rgb::BLACK, 2.0)
            .unwrap_err();
        assert!(matches!(err, SketchError::InvalidGeometry { .. }));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_add_zero_radius_circle_leaves_document_unchanged() {
        let mut doc = SketchDocument::new();
        doc.add_shape(
            ShapeKind::Line,
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Rgb::RED,
            2.0,
        )
        .unwrap();

        let before = doc.clone();
        let err = doc
            .add_shape(
                ShapeKind::Circle,
                Point::new(5.0, 5.0),
                Point::new(5.0, 5.0),
                Rgb::RED,
                2.0,
            )
            .unwrap_err();
        assert!(matches!(err, SketchError::InvalidGeometry { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut doc = SketchDocument::new();
        doc.add_shape(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Rgb::BLUE,
            1.0,
        )
        .unwrap();
        doc.clear();
        assert!(doc.is_empty());
        doc.clear();
        assert!(doc.is_empty());
        assert_eq!(doc.canvas_size, CanvasSize::default());
    }

    #[test]
    fn test_replace_is_atomic() {
        let mut doc = SketchDocument::new();
        doc.add_stroke(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            Rgb::GREEN,
            3.0,
        )
        .unwrap();
        let before = doc.clone();

        // A document holding an invalid stroke must be rejected whole.
        let bad = SketchDocument {
            strokes: vec![Stroke {
                points: vec![Point::new(0.0, 0.0)],
                color: Rgb::BLACK,
                width: 2.0,
            }],
            ..SketchDocument::new()
        };
        assert!(doc.replace(bad).is_err());
        assert_eq!(doc, before);

        let good = SketchDocument::with_canvas_size(CanvasSize {
            width_cm: 10.0,
            height_cm: 10.0,
        });
        doc.replace(good.clone()).unwrap();
        assert_eq!(doc, good);
    }

    #[test]
    fn test_triangle_corners() {
        let shape = Shape {
            kind: ShapeKind::Triangle,
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 10.0),
            color: Rgb::BLACK,
            width: 1.0,
        };
        let corners = shape.corners();
        assert_eq!(corners.len(), 3);
        assert_eq!(corners[0], Point::new(5.0, 0.0));
        assert_eq!(corners[1], Point::new(0.0, 10.0));
        assert_eq!(corners[2], Point::new(10.0, 10.0));
    }

    #[test]
    fn test_rectangle_corners_are_axis_aligned() {
        let shape = Shape {
            kind: ShapeKind::Rectangle,
            start: Point::new(1.0, 2.0),
            end: Point::new(7.0, 9.0),
            color: Rgb::BLACK,
            width: 1.0,
        };
        let corners = shape.corners();
        assert_eq!(corners.len(), 4);
        assert_eq!(corners[1], Point::new(7.0, 2.0));
        assert_eq!(corners[3], Point::new(1.0, 9.0));
    }

    #[test]
    fn test_circle_radius() {
        let shape = Shape {
            kind: ShapeKind::Circle,
            start: Point::new(100.0, 100.0),
            end: Point::new(150.0, 100.0),
            color: Rgb::BLACK,
            width: 1.0,
        };
        assert_eq!(shape.radius(), 50.0);
    }
}
