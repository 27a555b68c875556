//! # paperfig
//!
//! Figure, table and section extraction for scientific papers.
//!
//! This library takes the page layout of a paper (text blocks with line
//! boxes, plus vector and raster drawing primitives) and finds every
//! captioned figure and table together with the graphics it refers to. It
//! also rebuilds the running text into titled sections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperfig::{extract_document_file, render};
//!
//! fn main() -> paperfig::Result<()> {
//!     // Load pages and analyze them
//!     let doc = extract_document_file("paper.pages.json")?;
//!
//!     for figure in &doc.figures {
//!         println!("{} on page {}: {}", figure.name(), figure.page, figure.caption);
//!     }
//!
//!     // Convert to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Caption detection**: "Figure 3:", "Fig. 3.", "Table IV." and friends
//! - **Figure matching**: captions paired with nearby graphics in the same column
//! - **Failure reporting**: captions without a figure are returned, not dropped
//! - **Sections**: headings, abstract and paragraphs rebuilt across columns
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod error;
pub mod io;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use io::{load_pages, load_pages_bytes, load_pages_file};
pub use model::{
    BBox, Document, DocumentSection, FailedCaption, FailureReason, Figure, FigureKind,
    FigureResults, Page,
};
pub use parser::{
    CancellationToken, DiagnosticLogger, FigureExtractor, LogDiagnostics, PageSelection,
    ParseOptions, Thresholds,
};
pub use render::{JsonFormat, RenderOptions};

use std::path::Path;
use std::sync::Arc;

/// Extract figures and tables from pages with default options.
///
/// Captions that found no figure are discarded; use
/// [`extract_figures_with_failures`] to keep them.
///
/// # Example
///
/// ```no_run
/// use paperfig::{extract_figures, load_pages_file};
///
/// let pages = load_pages_file("paper.pages.json").unwrap();
/// for figure in extract_figures(pages).unwrap() {
///     println!("{}: {:?}", figure.name(), figure.bbox);
/// }
/// ```
pub fn extract_figures(pages: Vec<Page>) -> Result<Vec<Figure>> {
    FigureExtractor::default().extract_figures(pages)
}

/// Extract figures and the captions that could not be matched.
pub fn extract_figures_with_failures(pages: Vec<Page>) -> Result<FigureResults> {
    FigureExtractor::default().extract_figures_with_failures(pages)
}

/// Extract figures, abstract and sections from pages with default options.
pub fn extract_document(pages: Vec<Page>) -> Result<Document> {
    FigureExtractor::default().extract_document(pages)
}

/// Extract with custom options.
///
/// # Example
///
/// ```no_run
/// use paperfig::{extract_document_with_options, load_pages_file, ParseOptions};
///
/// let options = ParseOptions::new()
///     .with_allow_ocr(true)
///     .sequential();
/// let pages = load_pages_file("paper.pages.json").unwrap();
/// let doc = extract_document_with_options(pages, options).unwrap();
/// ```
pub fn extract_document_with_options(pages: Vec<Page>, options: ParseOptions) -> Result<Document> {
    FigureExtractor::new(options).extract_document(pages)
}

/// Load a page JSON file and extract the document.
///
/// # Example
///
/// ```no_run
/// use paperfig::extract_document_file;
///
/// let doc = extract_document_file("paper.pages.json").unwrap();
/// println!("Figures: {}", doc.figures.len());
/// ```
pub fn extract_document_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let pages = load_pages_file(path)?;
    extract_document(pages)
}

/// Load a page JSON file and render the document to Markdown.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = extract_document_file(path)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Load a page JSON file and render the document to JSON.
///
/// # Example
///
/// ```no_run
/// use paperfig::{to_json, JsonFormat};
///
/// let json = to_json("paper.pages.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("paper.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = extract_document_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for analyzing and rendering papers.
///
/// # Example
///
/// ```no_run
/// use paperfig::{PageSelection, Paperfig};
///
/// let markdown = Paperfig::new()
///     .allow_ocr(true)
///     .with_pages(PageSelection::parse("1-4").unwrap())
///     .with_failed_captions()
///     .parse_file("paper.pages.json")?
///     .to_markdown()?;
/// # Ok::<(), paperfig::Error>(())
/// ```
pub struct Paperfig {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    diagnostics: Option<Arc<dyn DiagnosticLogger>>,
    cancel: Option<CancellationToken>,
}

impl Paperfig {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            diagnostics: None,
            cancel: None,
        }
    }

    /// Accept pages whose only text is invisible OCR text.
    pub fn allow_ocr(mut self, allow: bool) -> Self {
        self.parse_options = self.parse_options.with_allow_ocr(allow);
        self
    }

    /// Keep near-white fills as graphics.
    pub fn keep_white_graphics(mut self) -> Self {
        self.parse_options = self.parse_options.with_ignore_white_graphics(false);
        self
    }

    /// Detect section titles before captions.
    pub fn section_titles_first(mut self) -> Self {
        self.parse_options = self.parse_options.with_section_titles_first(true);
        self
    }

    /// Keep paragraphs as the input split them.
    pub fn without_paragraph_rebuild(mut self) -> Self {
        self.parse_options = self.parse_options.with_rebuild_paragraphs(false);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Set the spacing-relative tolerances.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.parse_options = self.parse_options.with_thresholds(thresholds);
        self
    }

    /// List unmatched captions in rendered output.
    pub fn with_failed_captions(mut self) -> Self {
        self.render_options = self.render_options.with_failed_captions(true);
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Attach a diagnostics sink.
    pub fn with_diagnostics(mut self, logger: Arc<dyn DiagnosticLogger>) -> Self {
        self.diagnostics = Some(logger);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Analyze in-memory pages and return a result wrapper.
    pub fn parse(self, pages: Vec<Page>) -> Result<PaperfigResult> {
        let mut extractor = FigureExtractor::new(self.parse_options);
        if let Some(logger) = self.diagnostics {
            extractor = extractor.with_diagnostics(logger);
        }
        if let Some(token) = self.cancel {
            extractor = extractor.with_cancellation(token);
        }
        let document = extractor.extract_document(pages)?;
        Ok(PaperfigResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Load a page JSON file and analyze it.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<PaperfigResult> {
        let pages = load_pages_file(path)?;
        self.parse(pages)
    }

    /// Analyze pages given as JSON bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<PaperfigResult> {
        let pages = load_pages_bytes(data)?;
        self.parse(pages)
    }
}

impl Default for Paperfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of analyzing a paper.
pub struct PaperfigResult {
    /// The analyzed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl PaperfigResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Matched figures as a JSON array.
    pub fn figures_json(&self, format: JsonFormat) -> Result<String> {
        render::figures_to_json(&self.document.figures, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
