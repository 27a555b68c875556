//! Rendering module for converting analyzed documents to output formats.

mod json;
mod markdown;
mod options;
mod text;

pub use json::{figures_to_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
pub use text::to_text;
