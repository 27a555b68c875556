//! Parsing options and configuration.

use std::ops::RangeInclusive;

/// Environment variable consulted for the default of [`ParseOptions::allow_ocr`].
pub const ALLOW_OCR_ENV: &str = "PAPERFIG_ALLOW_OCR";

/// Options for extracting figures and sections from a document.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Proceed on image-only pages instead of failing the parse
    pub allow_ocr: bool,

    /// Drop fills painted in the page background color before clustering
    pub ignore_white_graphics: bool,

    /// Strip section titles before looking for captions
    pub detect_section_titles_first: bool,

    /// Join paragraphs split across columns and pages
    pub rebuild_paragraphs: bool,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Pages to run figure detection on (0-indexed)
    pub pages: PageSelection,

    /// Layout-relative heuristic thresholds
    pub thresholds: Thresholds,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow or disallow image-only pages.
    pub fn with_allow_ocr(mut self, allow: bool) -> Self {
        self.allow_ocr = allow;
        self
    }

    /// Enable or disable background fill filtering.
    pub fn with_ignore_white_graphics(mut self, ignore: bool) -> Self {
        self.ignore_white_graphics = ignore;
        self
    }

    /// Choose whether section titles are stripped before caption detection.
    pub fn with_section_titles_first(mut self, first: bool) -> Self {
        self.detect_section_titles_first = first;
        self
    }

    /// Enable or disable paragraph reconstruction.
    pub fn with_rebuild_paragraphs(mut self, rebuild: bool) -> Self {
        self.rebuild_paragraphs = rebuild;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set heuristic thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_ocr: allow_ocr_from_env(),
            ignore_white_graphics: true,
            detect_section_titles_first: false,
            rebuild_paragraphs: true,
            parallel: true,
            pages: PageSelection::All,
            thresholds: Thresholds::default(),
        }
    }
}

/// Read the OCR default from [`ALLOW_OCR_ENV`].
fn allow_ocr_from_env() -> bool {
    std::env::var(ALLOW_OCR_ENV)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Heuristic tolerances, each a multiple of the median line spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Largest line pitch that still continues a caption
    pub caption_gap_factor: f32,
    /// How far from the column margin a caption may start
    pub caption_margin_factor: f32,
    /// Adjacency tolerance when clustering graphics
    pub graphic_merge_factor: f32,
    /// Vertical search window between a caption and its graphic
    pub figure_search_factor: f32,
    /// Narrowest empty band accepted as a column gutter
    pub gutter_factor: f32,
    /// Narrowest column accepted by column detection
    pub min_column_width_factor: f32,
    /// How far from the column margin a continued paragraph may start
    pub paragraph_indent_factor: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            caption_gap_factor: 1.5,
            caption_margin_factor: 1.0,
            graphic_merge_factor: 0.5,
            figure_search_factor: 8.0,
            gutter_factor: 1.0,
            min_column_width_factor: 8.0,
            paragraph_indent_factor: 1.0,
        }
    }
}

/// Page selection for figure detection.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 0-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (0-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Whether every page is selected.
    pub fn is_all(&self) -> bool {
        matches!(self, PageSelection::All)
    }

    /// Parse a page selection string (e.g., "0-9", "0,2,4-6").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Check for simple range (e.g., "0-9")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                if start > end {
                    return Err(format!("Range start {} is after end {}", start, end));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Parse comma-separated list with possible ranges
        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }
}
