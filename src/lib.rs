//! # Plotsketch
//!
//! An interactive 2-D sketch tool for a pen drawing robot:
//! - Freehand strokes and parametric shapes on a physical canvas
//! - Pixel to millimeter mapping with the CAD Y-axis flip
//! - Bidirectional DXF interchange with recovery for damaged files
//!
//! ## Architecture
//!
//! Plotsketch is organized as a workspace with multiple crates:
//!
//! 1. **plotsketch-core** - Document model, units, colors, JSON schema
//! 2. **plotsketch-cad** - DXF parser, writer, importer, exporter
//! 3. **plotsketch** - Command line binary that integrates the crates

pub use plotsketch_cad::{
    CadError, CadExporter, CadImporter, DxfFile, DxfParser, DxfWriter, ImportState, ImportStats,
    ARC_SEGMENTS, DEFAULT_CHORD_TOLERANCE_MM, DEFAULT_STROKE_WIDTH_PX, SHAPES_LAYER,
    STROKES_LAYER,
};
pub use plotsketch_core::{
    from_aci, from_cad_point, physical_to_pixels, pixels_to_physical, to_aci, to_cad_point,
    CanvasSize, PhysicalUnit, Point, Rgb, Shape, ShapeKind, SketchDocument, SketchError, Stroke,
    PIXELS_PER_CM, PIXELS_PER_MM,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support
/// - INFO level default
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
