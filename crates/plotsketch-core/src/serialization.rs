//! JSON document schema.
//!
//! The debug/interchange format mirrors the in-memory document
//! directly:
//!
//! ```json
//! {
//!   "canvas_size": { "width_cm": 30.0, "height_cm": 20.0 },
//!   "strokes": [ { "points": [[0,0],[5,5]], "color": "#000000", "width": 2.0 } ],
//!   "shapes":  [ { "type": "line", "start": [0,0], "end": [10,10],
//!                  "color": "#FF0000", "width": 2.0 } ]
//! }
//! ```
//!
//! Unknown top-level keys are ignored; missing `strokes`/`shapes`
//! default to empty.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::SketchDocument;

impl SketchDocument {
    /// Serialize the document to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document from JSON and validate its invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SketchDocument = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Save the document to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "saved sketch document");
        Ok(())
    }

    /// Load a document from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let doc = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            strokes = doc.strokes.len(),
            shapes = doc.shapes.len(),
            "loaded sketch document"
        );
        Ok(doc)
    }
}
