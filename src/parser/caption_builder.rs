//! Extends caption candidates into full caption blocks.

use std::collections::{HashMap, HashSet};

use crate::model::{
    BBox, Caption, CaptionCandidate, DocumentLayout, FailedCaption, FailureReason, LineRef, Page,
};

use super::captions::match_caption_label;
use super::layout::{order_lines, OrderedLine};
use super::options::Thresholds;
use super::text;

/// Vertical offset, in line spacings, within which two fragments share a
/// baseline.
const BASELINE_FACTOR: f32 = 0.25;

/// Captions built on one page, plus the candidates that could not be built.
#[derive(Debug, Clone, Default)]
pub struct BuiltCaptions {
    pub captions: Vec<Caption>,
    pub failed: Vec<FailedCaption>,
}

/// Builds captions from their anchor lines.
pub struct CaptionBuilder<'a> {
    layout: &'a DocumentLayout,
    thresholds: &'a Thresholds,
}

impl<'a> CaptionBuilder<'a> {
    pub fn new(layout: &'a DocumentLayout, thresholds: &'a Thresholds) -> Self {
        Self { layout, thresholds }
    }

    /// Build every candidate of `page`.
    ///
    /// Candidates are handled top to bottom, so when two captions collide
    /// the one that starts higher on the page is kept.
    pub fn build(&self, page: &Page, candidates: &[CaptionCandidate]) -> BuiltCaptions {
        let ordered = order_lines(page, Some(self.layout));
        let position: HashMap<_, _> = ordered
            .iter()
            .enumerate()
            .map(|(i, l)| (l.line, i))
            .collect();
        let anchors: HashSet<_> = candidates.iter().map(|c| c.line).collect();

        let mut sorted: Vec<&CaptionCandidate> = candidates.iter().collect();
        sorted.sort_by(|a, b| {
            a.anchor
                .y1
                .partial_cmp(&b.anchor.y1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.anchor
                        .x1
                        .partial_cmp(&b.anchor.x1)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut built = BuiltCaptions::default();
        for candidate in sorted {
            let Some(&start) = position.get(&candidate.line) else {
                built.failed.push(FailedCaption::from_candidate(
                    candidate,
                    "",
                    candidate.anchor,
                    FailureReason::EmptyBody,
                ));
                continue;
            };

            let (lines, bbox) = self.consume(page, &ordered, start, &anchors);
            let (full, body) = caption_text(page, &lines);

            if body.is_empty() {
                log::debug!(
                    "CaptionBuilder: page {} '{}' has no body",
                    page.number,
                    candidate.label
                );
                built.failed.push(FailedCaption::from_candidate(
                    candidate,
                    full,
                    bbox,
                    FailureReason::EmptyBody,
                ));
                continue;
            }

            if built.captions.iter().any(|c| c.bbox.overlaps(&bbox)) {
                log::debug!(
                    "CaptionBuilder: page {} '{}' overlaps an earlier caption",
                    page.number,
                    candidate.label
                );
                built.failed.push(FailedCaption::from_candidate(
                    candidate,
                    full,
                    bbox,
                    FailureReason::OverlapsCaption,
                ));
                continue;
            }

            built.captions.push(Caption {
                candidate: candidate.clone(),
                text: full,
                bbox,
                lines,
            });
        }

        built
    }

    /// Consume lines after the anchor until a stop rule fires.
    fn consume(
        &self,
        page: &Page,
        ordered: &[OrderedLine],
        start: usize,
        anchors: &HashSet<LineRef>,
    ) -> (Vec<LineRef>, BBox) {
        let anchor = &ordered[start];
        let max_pitch = self.layout.scaled(self.thresholds.caption_gap_factor);
        let spacing = self.layout.median_line_spacing;
        let baseline_tolerance = spacing * BASELINE_FACTOR;

        let mut lines = vec![anchor.line];
        let mut bbox = anchor.bbox;
        let mut prev = anchor.bbox;

        for next in &ordered[start + 1..] {
            if next.column != anchor.column || anchors.contains(&next.line) {
                break;
            }
            let is_content = page
                .blocks
                .get(next.line.block)
                .is_some_and(|b| b.kind.is_content());
            if !is_content {
                break;
            }
            let pitch = next.bbox.y1 - prev.y1;

            // A fragment continuing the current line on the same baseline
            if pitch.abs() <= baseline_tolerance
                && next.bbox.x1 >= prev.x1
                && next.bbox.x1 - prev.x2 <= spacing
            {
                lines.push(next.line);
                bbox = bbox.union(&next.bbox);
                prev = prev.union(&next.bbox);
                continue;
            }

            if pitch <= 0.0 || pitch > max_pitch {
                break;
            }
            if next.bbox.horizontal_overlap(&bbox) <= 0.0 {
                break;
            }
            lines.push(next.line);
            bbox = bbox.union(&next.bbox);
            prev = next.bbox;
        }

        (lines, bbox)
    }
}

/// Full caption text and the body that follows the label.
fn caption_text(page: &Page, lines: &[LineRef]) -> (String, String) {
    let texts: Vec<&str> = lines
        .iter()
        .filter_map(|l| page.line(*l))
        .map(|l| l.text.as_str())
        .collect();

    let full = text::normalize(&text::join_fragments(texts.iter().copied()));

    let anchor_rest = texts
        .first()
        .and_then(|t| match_caption_label(t).map(|label| &t[label.body_start..]))
        .unwrap_or("");
    let body = text::normalize(&text::join_fragments(
        std::iter::once(anchor_rest).chain(texts.iter().skip(1).copied()),
    ));

    (full, body)
}
