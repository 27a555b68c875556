//! The extraction pipeline.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{
    CaptionCandidate, Document, DocumentLayout, Figure, FigureResults, LineRef, Page, PageFigures,
};

use super::cancel::CancellationToken;
use super::caption_builder::CaptionBuilder;
use super::captions::{group_by_page, CaptionDetector};
use super::diagnostics::{DiagnosticLogger, NoDiagnostics};
use super::figures::FigureDetector;
use super::graphics::GraphicsExtractor;
use super::layout::{FontStatistics, LayoutEstimator};
use super::options::ParseOptions;
use super::regions::RegionClassifier;
use super::sections::{
    PageText, ParagraphRebuilder, SectionTitleExtractor, SectionedTextBuilder, TextExclusions,
    TextUnit,
};
use super::text;

/// Everything the per-page stages produced for a document.
#[derive(Debug, Clone)]
pub(crate) struct DocumentContent {
    pub layout: Option<DocumentLayout>,
    pub page_count: u32,
    /// Figure results of the selected pages, in page order
    pub figures: Vec<PageFigures>,
    /// Running text of every page, in page order
    pub text: Vec<PageText>,
}

impl DocumentContent {
    /// Check that the page numbers seen across all results are exactly `0..N`.
    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for page in self.text.iter().map(|t| t.page) {
            if !seen.insert(page) {
                return Err(Error::PageNumbering(format!(
                    "page {} produced twice",
                    page
                )));
            }
        }
        let mut figure_pages = BTreeSet::new();
        for page in self.figures.iter().map(|f| f.page) {
            if !figure_pages.insert(page) {
                return Err(Error::PageNumbering(format!(
                    "figures of page {} produced twice",
                    page
                )));
            }
            seen.insert(page);
        }

        let expected: BTreeSet<u32> = (0..self.page_count).collect();
        if seen != expected {
            return Err(Error::PageNumbering(format!(
                "expected pages 0..{}, found {:?}",
                self.page_count, seen
            )));
        }
        Ok(())
    }
}

/// Results of one page.
struct PageOutcome {
    figures: Option<PageFigures>,
    text: PageText,
}

/// Shared, read-only inputs of the per-page stages.
struct PageContext<'a> {
    layout: Option<&'a DocumentLayout>,
    candidates: &'a BTreeMap<u32, Vec<CaptionCandidate>>,
    titles: &'a SectionTitleExtractor,
}

/// Extracts figures, tables and sections from a document's pages.
///
/// # Example
///
/// ```
/// use paperfig::model::{BBox, Page, Primitive, TextBlock, TextLine};
/// use paperfig::{FigureExtractor, ParseOptions};
///
/// let mut page = Page::letter(0);
/// page.add_block(TextBlock::body(
///     (0..12)
///         .map(|i| {
///             let y = 420.0 + i as f32 * 12.0;
///             TextLine::new("Some running body text.", BBox::new(50.0, y, 560.0, y + 10.0), 10.0)
///         })
///         .collect(),
/// ));
/// page.add_block(TextBlock::body(vec![TextLine::new(
///     "Figure 1: Results.",
///     BBox::new(50.0, 400.0, 300.0, 410.0),
///     10.0,
/// )]));
/// page.add_primitive(Primitive::stroke(BBox::new(100.0, 100.0, 400.0, 380.0)));
///
/// let extractor = FigureExtractor::new(ParseOptions::default().with_allow_ocr(false));
/// let figures = extractor.extract_figures(vec![page])?;
/// assert_eq!(figures.len(), 1);
/// assert_eq!(figures[0].caption, "Figure 1: Results.");
/// # Ok::<(), paperfig::Error>(())
/// ```
pub struct FigureExtractor {
    options: ParseOptions,
    diagnostics: Arc<dyn DiagnosticLogger>,
    cancel: Option<CancellationToken>,
}

impl FigureExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            diagnostics: Arc::new(NoDiagnostics),
            cancel: None,
        }
    }

    /// Send intermediate per-page results to `logger`.
    pub fn with_diagnostics(mut self, logger: Arc<dyn DiagnosticLogger>) -> Self {
        self.diagnostics = logger;
        self
    }

    /// Stop the parse with [`Error::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Extract the matched figures and tables.
    pub fn extract_figures(&self, pages: Vec<Page>) -> Result<Vec<Figure>> {
        Ok(self.extract_figures_with_failures(pages)?.figures)
    }

    /// Extract figures together with the captions that matched nothing.
    pub fn extract_figures_with_failures(&self, pages: Vec<Page>) -> Result<FigureResults> {
        let content = self.analyze(pages)?;
        Ok(collect_figures(content.figures))
    }

    /// Extract figures and the sectioned text of the document.
    pub fn extract_document(&self, pages: Vec<Page>) -> Result<Document> {
        let content = self.analyze(pages)?;
        Ok(self.assemble(content))
    }

    /// Run every stage over the document.
    pub(crate) fn analyze(&self, mut pages: Vec<Page>) -> Result<DocumentContent> {
        pages.sort_by_key(|p| p.number);
        validate_numbering(&pages)?;

        let options = &self.options;
        let layout = LayoutEstimator::new(options.thresholds.clone()).estimate(&pages);
        match &layout {
            Some(l) => log::debug!(
                "Layout: spacing {:.2}, {} column(s), body {:.1}pt",
                l.median_line_spacing,
                l.columns.len(),
                l.body_font_size
            ),
            None => log::info!("Too little text to calibrate the layout; skipping figure detection"),
        }

        let titles = SectionTitleExtractor::new(FontStatistics::from_pages(&pages));

        let title_lines: HashMap<u32, HashSet<LineRef>> = if options.detect_section_titles_first {
            pages
                .iter()
                .map(|p| (p.number, titles.title_lines(p, &TextExclusions::default())))
                .collect()
        } else {
            HashMap::new()
        };

        let candidates = match &layout {
            Some(l) => {
                let detector =
                    CaptionDetector::new(l, &options.thresholds).excluding(&title_lines);
                group_by_page(detector.detect(&pages, &options.pages))
            }
            None => BTreeMap::new(),
        };

        let context = PageContext {
            layout: layout.as_ref(),
            candidates: &candidates,
            titles: &titles,
        };

        let mut outcomes: Vec<PageOutcome> = if options.parallel {
            pages
                .par_iter()
                .map(|page| self.process_page(page, &context))
                .collect::<Result<Vec<_>>>()?
        } else {
            pages
                .iter()
                .map(|page| self.process_page(page, &context))
                .collect::<Result<Vec<_>>>()?
        };
        outcomes.sort_by_key(|o| o.text.page);

        let mut figures = Vec::new();
        let mut text = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            figures.extend(outcome.figures);
            text.push(outcome.text);
        }

        let content = DocumentContent {
            layout,
            page_count: pages.len() as u32,
            figures,
            text,
        };
        content.validate()?;
        Ok(content)
    }

    /// Run the per-page stages.
    fn process_page(&self, page: &Page, context: &PageContext<'_>) -> Result<PageOutcome> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Error::Cancelled);
        }

        let options = &self.options;
        let mut exclusions = TextExclusions::default();

        let figures = if options.pages.includes(page.number) {
            let graphics = GraphicsExtractor::new(options, context.layout).extract(page)?;
            self.diagnostics.log_graphics(page.number, &graphics);

            let mut result = PageFigures::new(page.number);
            if let Some(layout) = context.layout {
                let candidates = context
                    .candidates
                    .get(&page.number)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                let built = CaptionBuilder::new(layout, &options.thresholds).build(page, candidates);
                self.diagnostics
                    .log_captions(page.number, &built.captions, &built.failed);

                let regions =
                    RegionClassifier::new(layout).classify(page, &graphics, &built.captions);
                self.diagnostics.log_regions(page.number, &regions);

                let matched = FigureDetector::new(layout, &options.thresholds).detect(
                    page,
                    &regions,
                    &built.captions,
                );
                self.diagnostics
                    .log_figures(page.number, &matched.figures, &matched.failed);

                exclusions.lines = built
                    .captions
                    .iter()
                    .flat_map(|c| c.lines.iter().copied())
                    .collect();
                exclusions.boxes = matched.figures.iter().map(|f| f.bbox).collect();

                result.figures = matched.figures;
                result.failed_captions = built.failed;
                result.failed_captions.extend(matched.failed);
                result.failed_captions.sort_by(|a, b| {
                    a.bbox
                        .y1
                        .partial_cmp(&b.bbox.y1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            Some(result)
        } else {
            None
        };

        let text = SectionedTextBuilder::new(context.layout, context.titles)
            .page_text(page, &exclusions);

        Ok(PageOutcome { figures, text })
    }

    /// Build the output document.
    fn assemble(&self, content: DocumentContent) -> Document {
        let mut abstract_parts = Vec::new();
        let mut units: Vec<TextUnit> = Vec::new();
        for page_text in content.text {
            abstract_parts.extend(page_text.abstract_parts);
            units.extend(page_text.units);
        }

        if let (true, Some(layout)) = (self.options.rebuild_paragraphs, content.layout.as_ref()) {
            units = ParagraphRebuilder::new(layout, self.options.thresholds.paragraph_indent_factor)
                .rebuild(units);
        }

        let abstract_text = if abstract_parts.is_empty() {
            None
        } else {
            Some(text::join_fragments(abstract_parts.iter().map(String::as_str)))
        };

        let sections = SectionedTextBuilder::build(units);

        let results = collect_figures(content.figures);
        Document {
            page_count: content.page_count,
            figures: results.figures,
            failed_captions: results.failed_captions,
            abstract_text,
            sections,
            layout: content.layout,
        }
    }
}

impl Default for FigureExtractor {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Input pages must be numbered `0..N` once sorted.
fn validate_numbering(pages: &[Page]) -> Result<()> {
    for (i, page) in pages.iter().enumerate() {
        if page.number != i as u32 {
            return Err(Error::PageNumbering(format!(
                "expected page {}, found page {}",
                i, page.number
            )));
        }
    }
    Ok(())
}

fn collect_figures(pages: Vec<PageFigures>) -> FigureResults {
    let mut results = FigureResults::new();
    for page in pages {
        results.figures.extend(page.figures);
        results.failed_captions.extend(page.failed_captions);
    }
    results
}
