//! # Plotsketch Core
//!
//! Core document model for the plotsketch drawing-robot editor:
//!
//! - **Model**: freehand strokes, parametric shapes, canvas size
//! - **Units**: pixel <-> mm/cm conversion and the CAD Y-axis flip
//! - **Colors**: RGB pens and the 7-entry AutoCAD color index palette
//! - **Serialization**: the JSON document schema
//!
//! The UI layer owns a [`SketchDocument`] and pushes completed
//! gestures into it; the `plotsketch-cad` crate converts the same
//! document to and from DXF.

pub mod color;
pub mod error;
pub mod model;
pub mod serialization;
pub mod units;

pub use color::{from_aci, to_aci, Rgb};
pub use error::{Result, SketchError};
pub use model::{CanvasSize, Point, Shape, ShapeKind, SketchDocument, Stroke};
pub use units::{
    from_cad_point, physical_to_pixels, pixels_to_physical, to_cad_point, PhysicalUnit,
    PIXELS_PER_CM, PIXELS_PER_MM,
};
