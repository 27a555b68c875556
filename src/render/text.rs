//! Plain text rendering for analyzed documents.

use crate::error::Result;
use crate::model::Document;

use super::RenderOptions;

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut parts = Vec::new();

    if options.include_abstract {
        if let Some(ref abstract_text) = doc.abstract_text {
            parts.push(abstract_text.clone());
        }
    }

    for section in &doc.sections {
        if let Some(ref title) = section.title {
            parts.push(title.clone());
        }
        for (text, page) in &section.paragraphs {
            if options.page_markers {
                parts.push(format!("[{}] {}", page + 1, text));
            } else {
                parts.push(text.clone());
            }
        }
    }

    if options.include_figures {
        for figure in &doc.figures {
            parts.push(format!("[{}, page {}] {}", figure.name(), figure.page + 1, figure.caption));
        }
    }

    Ok(parts.join("\n\n").trim().to_string())
}
