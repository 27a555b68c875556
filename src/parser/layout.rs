//! Document layout estimation.
//!
//! This module derives the document-wide calibration every later stage scales
//! its tolerances by: the median line spacing, the column geometry, and the
//! dominant body font size.

use std::collections::HashMap;

use crate::model::{BBox, BlockKind, Column, DocumentLayout, LineRef, Page};

use super::options::Thresholds;

/// Fewest lines a document needs before a layout is estimated.
const MIN_LAYOUT_LINES: usize = 10;

/// Fewest line-spacing samples a document needs before a layout is estimated.
const MIN_SPACING_SAMPLES: usize = 5;

/// Share of lines allowed to cross a gutter (full-width titles and the like).
const GUTTER_NOISE_RATIO: f32 = 0.05;

/// Upper bound on occupancy slices across the text extent.
const MAX_SLICES: usize = 1 << 16;

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Font sizes larger than body (potential headings)
    pub heading_sizes: Vec<f32>,
    /// All observed font sizes with character-weighted frequency
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Collect statistics from the content lines of every page.
    pub fn from_pages(pages: &[Page]) -> Self {
        let mut stats = Self::default();
        for page in pages {
            for (_, block, line) in page.lines() {
                if block.kind.is_content() {
                    stats.add_size(line.font_size, line.text.chars().count());
                }
            }
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation weighted by character count.
    pub fn add_size(&mut self, size: f32, weight: usize) {
        if !size.is_finite() || size <= 0.0 || weight == 0 {
            return;
        }
        let key = (size * 10.0).round() as i32; // Round to 0.1 precision
        *self.size_histogram.entry(key).or_insert(0) += weight;
    }

    /// Calculate body size and heading sizes.
    pub fn analyze(&mut self) {
        // Find the most common font size (body text); ties go to the smaller size
        let Some((body_key, _)) = self
            .size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        else {
            self.body_size = 10.0;
            return;
        };
        self.body_size = *body_key as f32 / 10.0;

        // Find sizes larger than body (potential headings)
        let mut larger_sizes: Vec<f32> = self
            .size_histogram
            .keys()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
        larger_sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        self.heading_sizes = larger_sizes;
    }

    /// Get heading level for a font size (1-6, or 0 for body text).
    pub fn get_heading_level(&self, font_size: f32) -> u8 {
        // Headings must be noticeably larger than body text
        if font_size < self.body_size + 1.0 {
            return 0;
        }

        // Find position in heading sizes (sorted largest first)
        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }

        // Larger than body but smaller than every known heading size
        5
    }
}

/// Estimates a [`DocumentLayout`] from all pages of a document.
pub struct LayoutEstimator {
    thresholds: Thresholds,
}

impl LayoutEstimator {
    /// Create a new layout estimator.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Estimate the layout, or `None` when the text is too sparse to calibrate.
    ///
    /// Line boxes are clipped to their page; lines entirely off the page are
    /// ignored.
    pub fn estimate(&self, pages: &[Page]) -> Option<DocumentLayout> {
        let lines: Vec<BBox> = pages
            .iter()
            .flat_map(|page| {
                let bounds = page.bounds();
                page.lines()
                    .filter(|(_, block, line)| block.kind.is_content() && !line.is_degenerate())
                    .filter_map(move |(_, _, line)| line.bbox.clip(&bounds))
                    .filter(|bbox| bbox.width() > 0.0 && bbox.height() > 0.0)
            })
            .collect();

        if lines.len() < MIN_LAYOUT_LINES {
            log::debug!(
                "Layout: only {} usable lines (need {}), no layout",
                lines.len(),
                MIN_LAYOUT_LINES
            );
            return None;
        }

        let mut samples = line_spacing_samples(pages);
        if samples.len() < MIN_SPACING_SAMPLES {
            log::debug!(
                "Layout: only {} spacing samples (need {}), no layout",
                samples.len(),
                MIN_SPACING_SAMPLES
            );
            return None;
        }
        let spacing = median(&mut samples)?;

        let stats = FontStatistics::from_pages(pages);
        let columns = self.detect_columns(&lines, spacing);

        log::debug!(
            "Layout: spacing={:.2}, body font={:.1}, {} column(s)",
            spacing,
            stats.body_size,
            columns.len()
        );
        for col in &columns {
            log::debug!(
                "  Column {}: left={:.1}, right={:.1}",
                col.index,
                col.left,
                col.right
            );
        }

        Some(DocumentLayout::new(spacing, columns, stats.body_size))
    }

    /// Detect columns from the horizontal occupancy of every line.
    ///
    /// The text extent is cut into thin vertical slices; runs of slices that
    /// (almost) no line crosses are gutter candidates. Gutters are accepted
    /// widest first as long as every resulting column stays wide enough and
    /// holds enough lines.
    fn detect_columns(&self, lines: &[BBox], spacing: f32) -> Vec<Column> {
        let min_x = lines
            .iter()
            .map(|l| l.x1)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(0.0);
        let max_x = lines
            .iter()
            .map(|l| l.x2)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(0.0);

        let single = vec![Column::new(min_x, max_x, 0)];
        let extent = max_x - min_x;
        if extent <= 0.0 {
            return single;
        }

        let slice_width = (spacing * 0.25)
            .max(0.5)
            .max(extent / MAX_SLICES as f32);
        let num_slices = ((extent / slice_width) as usize + 1).min(MAX_SLICES + 1);
        let mut slice_occupancy = vec![0usize; num_slices];

        for line in lines {
            let start_slice = ((line.x1 - min_x) / slice_width) as usize;
            let end_slice = ((line.x2 - min_x) / slice_width) as usize;
            for slot in slice_occupancy
                .iter_mut()
                .take(end_slice.min(num_slices - 1) + 1)
                .skip(start_slice)
            {
                *slot += 1;
            }
        }

        let noise = (lines.len() as f32 * GUTTER_NOISE_RATIO) as usize;
        let min_gutter = spacing * self.thresholds.gutter_factor;

        // Interior runs of empty slices: (left x, right x)
        let mut gutters: Vec<(f32, f32)> = Vec::new();
        let mut run_start: Option<usize> = None;
        for (i, &occupancy) in slice_occupancy.iter().enumerate() {
            if occupancy <= noise {
                if run_start.is_none() {
                    run_start = Some(i);
                }
            } else if let Some(start) = run_start.take() {
                if start > 0 {
                    let left = min_x + start as f32 * slice_width;
                    let right = min_x + i as f32 * slice_width;
                    if right - left >= min_gutter {
                        gutters.push((left, right));
                    }
                }
            }
        }

        if gutters.is_empty() {
            log::debug!("No gutter wider than {:.1}, single column", min_gutter);
            return single;
        }

        // Widest gutters first
        gutters.sort_by(|a, b| {
            (b.1 - b.0)
                .partial_cmp(&(a.1 - a.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let min_width = spacing * self.thresholds.min_column_width_factor;
        let min_lines = (lines.len() / 10).max(2);
        let mut accepted: Vec<(f32, f32)> = Vec::new();

        for gutter in gutters {
            let mut trial = accepted.clone();
            trial.push(gutter);
            trial.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            let columns = columns_from_gutters(min_x, max_x, &trial);

            let valid = columns.iter().all(|c| {
                let count = lines
                    .iter()
                    .filter(|l| c.contains(l.center_x()))
                    .count();
                c.width() >= min_width && count >= min_lines
            });

            if valid {
                accepted = trial;
            } else {
                log::debug!(
                    "Rejected gutter at x={:.1}..{:.1}: column too narrow or too sparse",
                    gutter.0,
                    gutter.1
                );
            }
        }

        columns_from_gutters(min_x, max_x, &accepted)
    }
}

impl Default for LayoutEstimator {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Build columns between sorted gutters.
fn columns_from_gutters(min_x: f32, max_x: f32, gutters: &[(f32, f32)]) -> Vec<Column> {
    let mut columns = Vec::with_capacity(gutters.len() + 1);
    let mut left = min_x;
    for (index, &(gutter_left, gutter_right)) in gutters.iter().enumerate() {
        columns.push(Column::new(left, gutter_left, index));
        left = gutter_right;
    }
    columns.push(Column::new(left, max_x, gutters.len()));
    columns
}

/// Top-to-top distances between consecutive lines of the same block.
fn line_spacing_samples(pages: &[Page]) -> Vec<f32> {
    let mut samples = Vec::new();
    for page in pages {
        for block in page.blocks.iter().filter(|b| {
            b.kind.is_content() || b.kind == BlockKind::Abstract
        }) {
            for pair in block.lines.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                if prev.is_degenerate() || next.is_degenerate() {
                    continue;
                }
                if prev.bbox.horizontal_overlap(&next.bbox) <= 0.0 {
                    continue;
                }
                let pitch = next.bbox.y1 - prev.bbox.y1;
                let limit = prev.font_size.max(next.font_size) * 3.0;
                if pitch > 0.0 && pitch < limit {
                    samples.push(pitch);
                }
            }
        }
    }
    samples
}

/// Median of a slice of finite values (sorts in place).
pub fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// A line reference annotated with its layout column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedLine {
    pub line: LineRef,
    pub column: usize,
    pub bbox: BBox,
}

/// Every line of a page in column reading order (column, then top, then left).
///
/// Without a layout all lines are placed in column 0.
pub fn order_lines(page: &Page, layout: Option<&DocumentLayout>) -> Vec<OrderedLine> {
    let mut ordered: Vec<OrderedLine> = page
        .lines()
        .filter(|(_, _, line)| line.bbox.is_finite())
        .map(|(line_ref, _, line)| OrderedLine {
            line: line_ref,
            column: layout.map(|l| l.column_of(&line.bbox)).unwrap_or(0),
            bbox: line.bbox,
        })
        .collect();

    ordered.sort_by(|a, b| {
        a.column
            .cmp(&b.column)
            .then(
                a.bbox
                    .y1
                    .partial_cmp(&b.bbox.y1)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                a.bbox
                    .x1
                    .partial_cmp(&b.bbox.x1)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    ordered
}
