//! Error handling for the sketch document model.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Sketch model error type
///
/// Represents errors raised by document mutation and the JSON
/// document schema. Malformed geometry is rejected before the
/// document is touched, so a failed operation never leaves a
/// partially-built element behind.
#[derive(Error, Debug)]
pub enum SketchError {
    /// Malformed stroke or shape input
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the element was rejected.
        reason: String,
    },

    /// JSON document schema error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SketchError {
    /// Create an `InvalidGeometry` error from a string message
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        SketchError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

/// Result type using SketchError
pub type Result<T> = std::result::Result<T, SketchError>;
