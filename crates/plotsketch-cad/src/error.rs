//! Error handling for DXF interchange.
//!
//! Per-entity failures during import (a curve that cannot be
//! flattened, an unsupported entity) are recovered locally and tallied
//! in the import statistics; only file-level failures surface as
//! errors and abort the operation.

use plotsketch_core::SketchError;
use thiserror::Error;

/// DXF interchange error type
#[derive(Error, Debug)]
pub enum CadError {
    /// Standard I/O error (file unreadable, destination unwritable)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file violates the DXF group-code grammar
    #[error("Structural parse error: {reason}")]
    StructuralParse {
        /// What broke the grammar.
        reason: String,
    },

    /// A single curve entity could not be rendered to a polyline
    #[error("Failed to flatten {entity}: {reason}")]
    FlatteningFailed {
        /// The entity type that failed.
        entity: String,
        /// Why flattening produced no usable polyline.
        reason: String,
    },

    /// Sketch model error surfaced during conversion
    #[error(transparent)]
    Sketch(#[from] SketchError),
}

impl CadError {
    /// Create a `StructuralParse` error from a string message
    pub fn structural(reason: impl Into<String>) -> Self {
        CadError::StructuralParse {
            reason: reason.into(),
        }
    }

    /// Create a `FlatteningFailed` error for the given entity type
    pub fn flattening(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        CadError::FlatteningFailed {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using CadError
pub type Result<T> = std::result::Result<T, CadError>;
