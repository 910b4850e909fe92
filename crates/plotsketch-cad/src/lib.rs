//! # Plotsketch CAD
//!
//! DXF interchange for plotsketch documents:
//!
//! - **Export**: sketch -> ASCII DXF (R2010, millimeters, STROKES and
//!   SHAPES layers)
//! - **Import**: DXF -> sketch, flattening curved entities to strokes
//!   and recovering what it can from structurally damaged files
//!
//! The parser and writer are self-contained and handle exactly the
//! subset of DXF the drawing robot toolchain exchanges.

pub mod dxf_file;
pub mod error;
pub mod export;
pub mod flatten;
pub mod import;
pub mod parser;
pub mod writer;

pub use dxf_file::{
    DxfArc, DxfCircle, DxfEllipse, DxfEntity, DxfEntityType, DxfFile, DxfHeader, DxfLayer,
    DxfLine, DxfPolyline, DxfSpline, DxfUnit,
};
pub use error::{CadError, Result};
pub use export::{CadExporter, SHAPES_LAYER, STROKES_LAYER};
pub use flatten::{ARC_SEGMENTS, DEFAULT_CHORD_TOLERANCE_MM};
pub use import::{CadImporter, ImportState, ImportStats, DEFAULT_STROKE_WIDTH_PX};
pub use parser::DxfParser;
pub use writer::DxfWriter;
