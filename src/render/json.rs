//! JSON rendering for analyzed documents.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Document, Figure};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Convert a list of figures to a JSON array.
pub fn figures_to_json(figures: &[Figure], format: JsonFormat) -> Result<String> {
    serialize(figures, format)
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
