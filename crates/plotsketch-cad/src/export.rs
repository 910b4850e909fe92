//! DXF export.
//!
//! Writes a [`SketchDocument`] as an R2010 drawing in millimeters.
//! Freehand strokes land on the STROKES layer as open polylines;
//! parametric shapes land on the SHAPES layer, with rectangles and
//! triangles rendered as closed polylines carrying an explicit
//! closing vertex so pen plotters that ignore the closed flag still
//! draw the full outline.

use std::path::Path;

use tracing::debug;

use plotsketch_core::{to_aci, to_cad_point, Point, Shape, ShapeKind, SketchDocument, Stroke};

use crate::dxf_file::{DxfCircle, DxfEntity, DxfFile, DxfLayer, DxfLine, DxfPolyline};
use crate::error::Result;
use crate::writer::DxfWriter;

/// Layer that receives freehand strokes.
pub const STROKES_LAYER: &str = "STROKES";

/// Layer that receives parametric shapes.
pub const SHAPES_LAYER: &str = "SHAPES";

/// Converts sketch documents into DXF drawings.
pub struct CadExporter;

impl CadExporter {
    /// Build the DXF drawing for a document.
    pub fn to_dxf(doc: &SketchDocument) -> DxfFile {
        let mut file = DxfFile::new();
        file.add_layer(DxfLayer {
            name: STROKES_LAYER.to_string(),
            color: 7,
        });
        file.add_layer(DxfLayer {
            name: SHAPES_LAYER.to_string(),
            color: 1,
        });

        for stroke in &doc.strokes {
            if let Some(entity) = stroke_entity(stroke) {
                file.add_entity(entity);
            }
        }
        for shape in &doc.shapes {
            file.add_entity(shape_entity(shape));
        }

        debug!(
            strokes = doc.strokes.len(),
            shapes = doc.shapes.len(),
            entities = file.entity_count(),
            "built DXF drawing"
        );
        file
    }

    /// Render a document as an ASCII DXF string.
    pub fn export_str(doc: &SketchDocument) -> String {
        DxfWriter::write_to_string(&Self::to_dxf(doc))
    }

    /// Export a document to a DXF file on disk.
    pub fn export_file(doc: &SketchDocument, path: impl AsRef<Path>) -> Result<()> {
        DxfWriter::write_file(&Self::to_dxf(doc), path)
    }
}

fn cad(p: Point) -> Point {
    let (x, y) = to_cad_point(p);
    Point::new(x, y)
}

fn stroke_entity(stroke: &Stroke) -> Option<DxfEntity> {
    if stroke.points.len() < 2 {
        return None;
    }
    Some(DxfEntity::Polyline(DxfPolyline {
        vertices: stroke.points.iter().map(|p| cad(*p)).collect(),
        closed: false,
        lightweight: true,
        layer: STROKES_LAYER.to_string(),
        color: to_aci(stroke.color) as i16,
    }))
}

fn shape_entity(shape: &Shape) -> DxfEntity {
    let color = to_aci(shape.color) as i16;
    match shape.kind {
        ShapeKind::Line => DxfEntity::Line(DxfLine {
            start: cad(shape.start),
            end: cad(shape.end),
            layer: SHAPES_LAYER.to_string(),
            color,
        }),
        ShapeKind::Circle => DxfEntity::Circle(DxfCircle {
            center: cad(shape.start),
            radius: shape.radius() / plotsketch_core::PIXELS_PER_MM,
            layer: SHAPES_LAYER.to_string(),
            color,
        }),
        ShapeKind::Rectangle | ShapeKind::Triangle => {
            let corners = shape.corners();
            let mut vertices: Vec<Point> = corners.iter().map(|p| cad(*p)).collect();
            if let Some(&first) = vertices.first() {
                vertices.push(first);
            }
            DxfEntity::Polyline(DxfPolyline {
                vertices,
                closed: true,
                lightweight: true,
                layer: SHAPES_LAYER.to_string(),
                color,
            })
        }
    }
}
