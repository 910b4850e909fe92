//! ASCII DXF output.
//!
//! Emits the minimal R2010 skeleton the rest of the toolchain and
//! common CAD viewers expect: a HEADER section with `$ACADVER` and
//! `$INSUNITS`, a TABLES section defining the layers, the ENTITIES
//! section and the EOF marker. Everything written here parses back
//! through [`crate::parser::DxfParser`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::dxf_file::{DxfEntity, DxfFile, DxfPolyline};
use crate::error::Result;

/// Writer for the ASCII DXF format.
pub struct DxfWriter;

impl DxfWriter {
    /// Render the drawing as an ASCII DXF document.
    pub fn write_to_string(file: &DxfFile) -> String {
        let mut out = Emitter::default();

        out.pair(0, "SECTION");
        out.pair(2, "HEADER");
        out.pair(9, "$ACADVER");
        out.pair(1, &file.header.version);
        out.pair(9, "$INSUNITS");
        out.int(70, file.header.unit.to_insunits() as i64);
        out.pair(0, "ENDSEC");

        out.pair(0, "SECTION");
        out.pair(2, "TABLES");
        out.pair(0, "TABLE");
        out.pair(2, "LAYER");
        out.int(70, file.layers.len() as i64);
        for layer in &file.layers {
            out.pair(0, "LAYER");
            out.pair(2, &layer.name);
            out.int(70, 0);
            out.int(62, layer.color as i64);
            out.pair(6, "CONTINUOUS");
        }
        out.pair(0, "ENDTAB");
        out.pair(0, "ENDSEC");

        out.pair(0, "SECTION");
        out.pair(2, "ENTITIES");
        for entity in &file.entities {
            write_entity(&mut out, entity);
        }
        out.pair(0, "ENDSEC");
        out.pair(0, "EOF");

        out.buffer
    }

    /// Write the drawing to a file on disk.
    pub fn write_file(file: &DxfFile, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::write_to_string(file))?;
        debug!(
            path = %path.display(),
            entities = file.entity_count(),
            "wrote DXF file"
        );
        Ok(())
    }
}

#[derive(Default)]
struct Emitter {
    buffer: String,
}

impl Emitter {
    fn pair(&mut self, code: i32, value: &str) {
        self.buffer.push_str(&format!("{}\n{}\n", code, value));
    }

    fn int(&mut self, code: i32, value: i64) {
        self.buffer.push_str(&format!("{}\n{}\n", code, value));
    }

    fn float(&mut self, code: i32, value: f64) {
        self.buffer.push_str(&format!("{}\n{:.6}\n", code, value));
    }

    fn common(&mut self, layer: &str, color: i16) {
        self.pair(8, layer);
        self.int(62, color as i64);
    }
}

fn write_entity(out: &mut Emitter, entity: &DxfEntity) {
    match entity {
        DxfEntity::Line(line) => {
            out.pair(0, "LINE");
            out.common(&line.layer, line.color);
            out.float(10, line.start.x);
            out.float(20, line.start.y);
            out.float(11, line.end.x);
            out.float(21, line.end.y);
        }
        DxfEntity::Circle(circle) => {
            out.pair(0, "CIRCLE");
            out.common(&circle.layer, circle.color);
            out.float(10, circle.center.x);
            out.float(20, circle.center.y);
            out.float(40, circle.radius);
        }
        DxfEntity::Arc(arc) => {
            out.pair(0, "ARC");
            out.common(&arc.layer, arc.color);
            out.float(10, arc.center.x);
            out.float(20, arc.center.y);
            out.float(40, arc.radius);
            out.float(50, arc.start_angle);
            out.float(51, arc.end_angle);
        }
        DxfEntity::Ellipse(ellipse) => {
            out.pair(0, "ELLIPSE");
            out.common(&ellipse.layer, ellipse.color);
            out.float(10, ellipse.center.x);
            out.float(20, ellipse.center.y);
            out.float(11, ellipse.major_axis.0);
            out.float(21, ellipse.major_axis.1);
            out.float(40, ellipse.ratio);
            out.float(41, ellipse.start_param);
            out.float(42, ellipse.end_param);
        }
        DxfEntity::Spline(spline) => {
            out.pair(0, "SPLINE");
            out.common(&spline.layer, spline.color);
            out.int(71, spline.degree as i64);
            out.int(73, spline.control_points.len() as i64);
            for point in &spline.control_points {
                out.float(10, point.x);
                out.float(20, point.y);
            }
        }
        DxfEntity::Polyline(poly) => write_polyline(out, poly),
        // Foreign entities are never re-emitted.
        DxfEntity::Unsupported { .. } => {}
    }
}

fn write_polyline(out: &mut Emitter, poly: &DxfPolyline) {
    if poly.lightweight {
        out.pair(0, "LWPOLYLINE");
        out.common(&poly.layer, poly.color);
        out.int(90, poly.vertices.len() as i64);
        out.int(70, poly.closed as i64);
        for vertex in &poly.vertices {
            out.float(10, vertex.x);
            out.float(20, vertex.y);
        }
    } else {
        out.pair(0, "POLYLINE");
        out.common(&poly.layer, poly.color);
        out.int(70, poly.closed as i64);
        for vertex in &poly.vertices {
            out.pair(0, "VERTEX");
            out.pair(8, &poly.layer);
            out.float(10, vertex.x);
            out.float(20, vertex.y);
        }
        out.pair(0, "SEQEND");
    }
}
