//! Caption candidate detection.
//!
//! A caption candidate is a line that opens with a caption keyword, a number
//! and a separator ("Figure 3:", "Fig. 2.", "Table IV -"), placed where a
//! caption can start: at the column margin or centered in the column.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{CaptionCandidate, DocumentLayout, FigureKind, LineRef, Page, TextLine};

use super::options::{PageSelection, Thresholds};

fn caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<kw>Figure|FIGURE|Fig\.?|FIG\.?|Table|TABLE|Tab\.?)\s*(?P<num>\d+|[IVX]+)\s*[:.\-–—|]",
        )
        .unwrap()
    })
}

/// Label information parsed from a caption opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLabel {
    pub kind: FigureKind,
    pub number: Option<u32>,
    /// The matched prefix, trimmed (e.g. "Figure 3:")
    pub label: String,
    /// Byte offset where the caption body starts
    pub body_start: usize,
}

/// Parse a caption label from the start of `text`.
pub fn match_caption_label(text: &str) -> Option<CaptionLabel> {
    let caps = caption_regex().captures(text)?;
    let whole = caps.get(0)?;
    let keyword = caps.name("kw")?.as_str();
    let number = caps.name("num")?.as_str();

    let kind = if keyword.starts_with('T') {
        FigureKind::Table
    } else {
        FigureKind::Figure
    };
    let number = number.parse::<u32>().ok().or_else(|| parse_roman(number));

    Some(CaptionLabel {
        kind,
        number,
        label: whole.as_str().trim().to_string(),
        body_start: whole.end(),
    })
}

/// Parse an upper-case Roman numeral.
fn parse_roman(s: &str) -> Option<u32> {
    let value = |c: char| match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        _ => None,
    };
    let digits: Vec<u32> = s.chars().map(value).collect::<Option<_>>()?;
    if digits.is_empty() {
        return None;
    }
    let mut total = 0;
    for (i, &d) in digits.iter().enumerate() {
        match digits.get(i + 1) {
            Some(&next) if next > d => total -= d as i64,
            _ => total += d as i64,
        }
    }
    u32::try_from(total).ok().filter(|n| *n > 0)
}

/// Finds caption candidates across a document.
pub struct CaptionDetector<'a> {
    layout: &'a DocumentLayout,
    thresholds: &'a Thresholds,
    excluded: Option<&'a HashMap<u32, HashSet<LineRef>>>,
}

impl<'a> CaptionDetector<'a> {
    /// Create a new caption detector.
    pub fn new(layout: &'a DocumentLayout, thresholds: &'a Thresholds) -> Self {
        Self {
            layout,
            thresholds,
            excluded: None,
        }
    }

    /// Skip the given lines (keyed by page), e.g. lines already taken as
    /// section titles.
    pub fn excluding(mut self, excluded: &'a HashMap<u32, HashSet<LineRef>>) -> Self {
        self.excluded = Some(excluded);
        self
    }

    /// Detect candidates on every selected page, ordered by page, then y, then x.
    pub fn detect(&self, pages: &[Page], selection: &PageSelection) -> Vec<CaptionCandidate> {
        let mut candidates: Vec<CaptionCandidate> = pages
            .iter()
            .filter(|p| selection.includes(p.number))
            .flat_map(|p| self.detect_page(p))
            .collect();

        candidates = filter_inconsistent(candidates);

        candidates.sort_by(|a, b| {
            a.page
                .cmp(&b.page)
                .then(
                    a.anchor
                        .y1
                        .partial_cmp(&b.anchor.y1)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(
                    a.anchor
                        .x1
                        .partial_cmp(&b.anchor.x1)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        log::debug!("CaptionDetector: {} candidate(s)", candidates.len());
        candidates
    }

    /// Detect candidates on one page.
    pub fn detect_page(&self, page: &Page) -> Vec<CaptionCandidate> {
        let excluded = self.excluded.and_then(|e| e.get(&page.number));
        page.lines()
            .filter(|(_, block, line)| block.kind.is_content() && line.bbox.is_finite())
            .filter(|(line_ref, _, _)| !excluded.is_some_and(|e| e.contains(line_ref)))
            .filter_map(|(line_ref, _, line)| {
                let label = match_caption_label(&line.text)?;
                if !self.is_caption_position(line) {
                    log::debug!(
                        "CaptionDetector: page {} rejected '{}' (not at margin)",
                        page.number,
                        label.label
                    );
                    return None;
                }
                Some(CaptionCandidate {
                    page: page.number,
                    kind: label.kind,
                    number: label.number,
                    label: label.label,
                    line: line_ref,
                    anchor: line.bbox,
                    opens_block: line_ref.line == 0,
                })
            })
            .collect()
    }

    /// Whether a line starts at its column's margin or is centered in it.
    fn is_caption_position(&self, line: &TextLine) -> bool {
        let Some(column) = self.layout.column(self.layout.column_of(&line.bbox)) else {
            return true;
        };
        let tolerance = self.layout.scaled(self.thresholds.caption_margin_factor);

        let left_indent = line.bbox.x1 - column.left;
        if left_indent.abs() <= tolerance {
            return true;
        }

        let right_indent = column.right - line.bbox.x2;
        left_indent > 0.0 && right_indent > -tolerance && (left_indent - right_indent).abs() <= tolerance
    }
}

/// Drop candidates that share a label with a block-opening candidate.
///
/// Body text that wraps so a line starts with "Figure 3." produces a second
/// candidate for the same figure; the real caption almost always opens its
/// own block.
fn filter_inconsistent(candidates: Vec<CaptionCandidate>) -> Vec<CaptionCandidate> {
    let mut opens: HashMap<(FigureKind, u32), bool> = HashMap::new();
    for c in &candidates {
        if let Some(n) = c.number {
            *opens.entry((c.kind, n)).or_insert(false) |= c.opens_block;
        }
    }

    candidates
        .into_iter()
        .filter(|c| match c.number {
            Some(n) if !c.opens_block && opens.get(&(c.kind, n)).copied().unwrap_or(false) => {
                log::debug!(
                    "CaptionDetector: page {} dropped duplicate '{}'",
                    c.page,
                    c.label
                );
                false
            }
            _ => true,
        })
        .collect()
}

/// Group candidates by page, keeping their order within each page.
pub fn group_by_page(candidates: Vec<CaptionCandidate>) -> BTreeMap<u32, Vec<CaptionCandidate>> {
    let mut grouped: BTreeMap<u32, Vec<CaptionCandidate>> = BTreeMap::new();
    for c in candidates {
        grouped.entry(c.page).or_default().push(c);
    }
    grouped
}
