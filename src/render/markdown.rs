//! Markdown rendering for analyzed documents.

use crate::error::Result;
use crate::model::{Document, DocumentSection, FailedCaption, FailureReason, Figure};

use super::RenderOptions;

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
///
/// Layout: the abstract, one heading per section followed by its
/// paragraphs, then a "Figures" list and optionally an "Unmatched captions"
/// list. Page numbers are shown 1-indexed.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_abstract {
            if let Some(ref abstract_text) = doc.abstract_text {
                output.push_str(&self.heading("Abstract", 1));
                output.push_str(&self.escape(abstract_text));
                output.push_str("\n\n");
            }
        }

        for section in &doc.sections {
            self.render_section(&mut output, section);
        }

        if self.options.include_figures && !doc.figures.is_empty() {
            output.push_str(&self.heading("Figures", 1));
            for figure in &doc.figures {
                self.render_figure(&mut output, figure);
            }
            output.push('\n');
        }

        if self.options.include_failed_captions && !doc.failed_captions.is_empty() {
            output.push_str(&self.heading("Unmatched captions", 1));
            for failed in &doc.failed_captions {
                self.render_failed(&mut output, failed);
            }
            output.push('\n');
        }

        Ok(output.trim().to_string())
    }

    fn render_section(&self, output: &mut String, section: &DocumentSection) {
        if let Some(ref title) = section.title {
            output.push_str(&self.heading(title, section.level.max(1)));
        }
        for (text, _) in &section.paragraphs {
            if text.trim().is_empty() {
                continue;
            }
            output.push_str(&self.escape(text));
            output.push_str("\n\n");
        }
    }

    fn render_figure(&self, output: &mut String, figure: &Figure) {
        output.push_str(&format!(
            "- **{}** (page {}): {}\n",
            figure.name(),
            figure.page + 1,
            self.escape(caption_body(&figure.caption, &figure.label))
        ));
    }

    fn render_failed(&self, output: &mut String, failed: &FailedCaption) {
        let text = if failed.text.is_empty() {
            failed.label.as_str()
        } else {
            failed.text.as_str()
        };
        output.push_str(&format!(
            "- page {}: {} ({})\n",
            failed.page + 1,
            self.escape(text),
            reason_text(failed.reason)
        ));
    }

    fn heading(&self, text: &str, level: u8) -> String {
        let level = level.min(self.options.max_heading_level).max(1);
        format!("{} {}\n\n", "#".repeat(level as usize), text.trim())
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Caption text with its label removed.
fn caption_body<'a>(caption: &'a str, label: &str) -> &'a str {
    caption
        .strip_prefix(label)
        .map(str::trim_start)
        .filter(|body| !body.is_empty())
        .unwrap_or(caption)
}

fn reason_text(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::EmptyBody => "empty caption",
        FailureReason::OverlapsCaption => "overlaps another caption",
        FailureReason::NoGraphicMatched => "no graphic found",
    }
}

/// Escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
