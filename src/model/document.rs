//! Document-level output types.

use super::{BBox, DocumentLayout, FailedCaption, Figure};
use serde::{Deserialize, Serialize};

/// A logical paragraph of running text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    /// Page the paragraph starts on
    pub page: u32,
    /// Layout column the paragraph starts in
    pub column: usize,
    /// Box of the first fragment
    pub bbox: BBox,
    /// Box of the last fragment (differs from `bbox` after rebuilding)
    pub end_bbox: BBox,
    /// Page the paragraph ends on
    pub end_page: u32,
    /// Column the paragraph ends in
    pub end_column: usize,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, page: u32, column: usize, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            page,
            column,
            bbox,
            end_bbox: bbox,
            end_page: page,
            end_column: column,
        }
    }
}

/// A detected section heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTitle {
    pub text: String,
    pub page: u32,
    pub column: usize,
    pub bbox: BBox,
    /// Heading depth (1 = top level)
    pub level: u8,
}

/// A titled run of paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    /// Section heading; `None` for text before the first heading
    pub title: Option<String>,

    /// Heading depth of `title` (0 when untitled)
    #[serde(default)]
    pub level: u8,

    /// Paragraph text paired with the page it starts on
    pub paragraphs: Vec<(String, u32)>,
}

impl DocumentSection {
    pub fn new(title: Option<String>) -> Self {
        let level = if title.is_some() { 1 } else { 0 };
        Self {
            title,
            level,
            paragraphs: Vec::new(),
        }
    }

    /// Start a section under a heading of the given depth.
    pub fn titled(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: Some(title.into()),
            level,
            paragraphs: Vec::new(),
        }
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>, page: u32) {
        self.paragraphs.push((text.into(), page));
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Paragraph texts joined by blank lines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|(p, _)| p.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Figures of a document together with the captions that found no figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureResults {
    pub figures: Vec<Figure>,
    pub failed_captions: Vec<FailedCaption>,
}

impl FigureResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty() && self.failed_captions.is_empty()
    }
}

/// Figures and failed captions found on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFigures {
    pub page: u32,
    pub figures: Vec<Figure>,
    pub failed_captions: Vec<FailedCaption>,
}

impl PageFigures {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }
}

/// A fully analyzed paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Number of pages in the input
    pub page_count: u32,

    /// Matched figures and tables, in page order
    pub figures: Vec<Figure>,

    /// Captions that were reported instead of matched
    pub failed_captions: Vec<FailedCaption>,

    /// Abstract text, when the input classified an abstract block
    pub abstract_text: Option<String>,

    /// Sections in reading order
    pub sections: Vec<DocumentSection>,

    /// Layout calibration; `None` when figure detection was skipped
    pub layout: Option<DocumentLayout>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Figures found on `page` (0-indexed).
    pub fn figures_on_page(&self, page: u32) -> impl Iterator<Item = &Figure> {
        self.figures.iter().filter(move |f| f.page == page)
    }

    /// Plain text of all sections, headings included.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref abstract_text) = self.abstract_text {
            parts.push(abstract_text.clone());
        }
        for section in &self.sections {
            if let Some(ref title) = section.title {
                parts.push(title.clone());
            }
            if !section.is_empty() {
                parts.push(section.plain_text());
            }
        }
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.figures.is_empty());
        assert!(doc.sections.is_empty());
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn test_plain_text_order() {
        let mut doc = Document::new();
        doc.abstract_text = Some("We study things.".to_string());
        let mut intro = DocumentSection::new(Some("1 Introduction".to_string()));
        intro.add_paragraph("First.", 0);
        intro.add_paragraph("Second.", 1);
        doc.sections.push(intro);

        assert_eq!(
            doc.plain_text(),
            "We study things.\n\n1 Introduction\n\nFirst.\n\nSecond."
        );
    }
}
