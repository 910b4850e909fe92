//! DXF import.
//!
//! Converts a parsed [`DxfFile`] back into a [`SketchDocument`]:
//! LINE and CIRCLE become parametric shapes, everything else that can
//! be flattened becomes a freehand stroke. A file that fails the
//! strict parse automatically goes through the recovery pass before
//! the import is given up on.
//!
//! Conversion failures never abort the import. Each entity that
//! cannot be converted is tallied in [`ImportStats`] and skipped, so
//! one bad entity does not cost the rest of the drawing.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use plotsketch_core::{from_aci, from_cad_point, Point, Rgb, ShapeKind, SketchDocument};

use crate::dxf_file::{DxfEntity, DxfFile};
use crate::error::{CadError, Result};
use crate::flatten::{flatten_arc, flatten_ellipse, flatten_spline, DEFAULT_CHORD_TOLERANCE_MM};
use crate::parser::DxfParser;

/// Default pen width assigned to imported geometry, in pixels.
pub const DEFAULT_STROKE_WIDTH_PX: f64 = 2.0;

/// Phase of an import run, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    Parsing,
    Recovering,
    Converting,
    Done,
    Aborted,
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportState::Idle => "idle",
            ImportState::Parsing => "parsing",
            ImportState::Recovering => "recovering",
            ImportState::Converting => "converting",
            ImportState::Done => "done",
            ImportState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Per-entity-type tallies for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub lwpolylines: usize,
    pub polylines: usize,
    pub lines: usize,
    pub circles: usize,
    pub arcs: usize,
    pub ellipses: usize,
    pub splines: usize,
    /// Entity types the importer does not understand.
    pub unsupported: usize,
    /// Entities of a supported type that could not be converted.
    pub failed: usize,
    /// True when the strict parse failed and the recovery pass ran.
    pub recovered: bool,
    /// Anomalies the recovery pass skipped over.
    pub residual_errors: usize,
}

impl ImportStats {
    /// Total entities successfully converted.
    pub fn converted(&self) -> usize {
        self.lwpolylines
            + self.polylines
            + self.lines
            + self.circles
            + self.arcs
            + self.ellipses
            + self.splines
    }

    /// One-line human readable report.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        for (label, count) in [
            ("LWPOLYLINE", self.lwpolylines),
            ("POLYLINE", self.polylines),
            ("LINE", self.lines),
            ("CIRCLE", self.circles),
            ("ARC", self.arcs),
            ("ELLIPSE", self.ellipses),
            ("SPLINE", self.splines),
        ] {
            if count > 0 {
                parts.push(format!("{}: {}", label, count));
            }
        }
        if parts.is_empty() {
            parts.push("no entities".to_string());
        }
        let mut summary = format!("Imported {} entities ({})", self.converted(), parts.join(", "));
        if self.unsupported > 0 {
            summary.push_str(&format!(", {} unsupported", self.unsupported));
        }
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        if self.recovered {
            summary.push_str(&format!(
                ", recovered from a damaged file ({} errors skipped)",
                self.residual_errors
            ));
        }
        summary
    }
}

/// Converts DXF drawings into sketch documents.
#[derive(Debug, Clone)]
pub struct CadImporter {
    /// Chord tolerance for ellipse and spline flattening, in mm.
    pub chord_tolerance_mm: f64,
    /// Pen width assigned to imported geometry, in pixels.
    pub stroke_width_px: f64,
}

impl Default for CadImporter {
    fn default() -> Self {
        Self {
            chord_tolerance_mm: DEFAULT_CHORD_TOLERANCE_MM,
            stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
        }
    }
}

impl CadImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a DXF file from disk into a fresh document.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<(SketchDocument, ImportStats)> {
        let content = fs::read_to_string(path.as_ref())?;
        self.import_str(&content)
    }

    /// Import DXF content into a fresh document with the default
    /// canvas size.
    pub fn import_str(&self, content: &str) -> Result<(SketchDocument, ImportStats)> {
        let mut doc = SketchDocument::new();
        let stats = self.import_into(content, &mut doc)?;
        Ok((doc, stats))
    }

    /// Import DXF content into an existing document, replacing its
    /// strokes and shapes but keeping its canvas size. The document is
    /// only modified when the whole import succeeds.
    pub fn import_into(&self, content: &str, doc: &mut SketchDocument) -> Result<ImportStats> {
        let mut state = ImportState::Idle;
        let mut stats = ImportStats::default();

        transition(&mut state, ImportState::Parsing);
        let file = match DxfParser::parse(content) {
            Ok(file) => file,
            Err(CadError::StructuralParse { reason }) => {
                warn!(%reason, "strict DXF parse failed, attempting recovery");
                transition(&mut state, ImportState::Recovering);
                match DxfParser::recover(content) {
                    Ok((file, residual)) => {
                        stats.recovered = true;
                        stats.residual_errors = residual;
                        file
                    }
                    Err(err) => {
                        transition(&mut state, ImportState::Aborted);
                        return Err(err);
                    }
                }
            }
            Err(err) => {
                transition(&mut state, ImportState::Aborted);
                return Err(err);
            }
        };

        transition(&mut state, ImportState::Converting);
        let mut incoming = SketchDocument::with_canvas_size(doc.canvas_size);
        let scale = file.header.unit.to_mm_factor();
        for entity in &file.entities {
            if let Err(err) = self.convert_entity(entity, &file, scale, &mut incoming, &mut stats) {
                warn!(entity = ?entity.entity_type(), %err, "skipping entity");
                stats.failed += 1;
            }
        }

        doc.replace(incoming)?;
        transition(&mut state, ImportState::Done);
        debug!(summary = %stats.summary(), "import finished");
        Ok(stats)
    }

    fn convert_entity(
        &self,
        entity: &DxfEntity,
        file: &DxfFile,
        scale: f64,
        doc: &mut SketchDocument,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let color = from_aci(resolve_aci(entity, file));
        match entity {
            DxfEntity::Line(line) => {
                doc.add_shape(
                    ShapeKind::Line,
                    to_pixels(line.start, scale),
                    to_pixels(line.end, scale),
                    color,
                    self.stroke_width_px,
                )?;
                stats.lines += 1;
            }
            DxfEntity::Circle(circle) => {
                // The radius handle sits due east of the center.
                let start = to_pixels(circle.center, scale);
                let end = to_pixels(
                    Point::new(circle.center.x + circle.radius, circle.center.y),
                    scale,
                );
                doc.add_shape(ShapeKind::Circle, start, end, color, self.stroke_width_px)?;
                stats.circles += 1;
            }
            DxfEntity::Arc(arc) => {
                let points = flatten_arc(arc)?;
                self.add_stroke(doc, points, scale, color)?;
                stats.arcs += 1;
            }
            DxfEntity::Ellipse(ellipse) => {
                let points = flatten_ellipse(ellipse, self.chord_tolerance_mm)?;
                self.add_stroke(doc, points, scale, color)?;
                stats.ellipses += 1;
            }
            DxfEntity::Spline(spline) => {
                let points = flatten_spline(spline, self.chord_tolerance_mm)?;
                self.add_stroke(doc, points, scale, color)?;
                stats.splines += 1;
            }
            DxfEntity::Polyline(poly) => {
                let mut points = poly.vertices.clone();
                if points.len() < 2 {
                    return Err(CadError::flattening(
                        "POLYLINE",
                        format!("{} vertices, need at least 2", points.len()),
                    ));
                }
                if poly.closed && points.first() != points.last() {
                    points.push(points[0]);
                }
                self.add_stroke(doc, points, scale, color)?;
                if poly.lightweight {
                    stats.lwpolylines += 1;
                } else {
                    stats.polylines += 1;
                }
            }
            DxfEntity::Unsupported { type_name } => {
                debug!(%type_name, "unsupported entity type");
                stats.unsupported += 1;
            }
        }
        Ok(())
    }

    fn add_stroke(
        &self,
        doc: &mut SketchDocument,
        points: Vec<Point>,
        scale: f64,
        color: Rgb,
    ) -> Result<()> {
        let pixels = points.into_iter().map(|p| to_pixels(p, scale)).collect();
        doc.add_stroke(pixels, color, self.stroke_width_px)?;
        Ok(())
    }
}

fn transition(state: &mut ImportState, next: ImportState) {
    debug!(from = %state, to = %next, "import state");
    *state = next;
}

/// Drawing-unit point to canvas pixels, normalizing to mm first.
fn to_pixels(p: Point, scale: f64) -> Point {
    from_cad_point(p.x * scale, p.y * scale)
}

/// Resolve the raw group 62 value against the layer table. ByLayer
/// (256), ByBlock (0) and out-of-range values fall back through the
/// layer color to white/black (7).
fn resolve_aci(entity: &DxfEntity, file: &DxfFile) -> u8 {
    let raw = match entity.color() {
        Some(color) => color,
        None => return 7,
    };
    let resolved = if raw == 256 || raw == 0 {
        entity
            .layer()
            .and_then(|name| file.layer_color(name))
            .unwrap_or(7)
    } else {
        raw
    };
    u8::try_from(resolved).unwrap_or(7)
}
