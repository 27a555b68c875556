//! Matching captions to the graphics they describe.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::{
    BBox, Caption, DocumentLayout, FailedCaption, Figure, FigureKind, LineRef, Page, Region,
    RegionKind,
};

use super::options::Thresholds;

/// Horizontal gap, in line spacings, that separates two table cells.
const CELL_GAP_FACTOR: f32 = 0.5;

/// Tolerance, in line spacings, for cell edges to count as aligned.
const CELL_ALIGN_FACTOR: f32 = 0.5;

/// Fewest aligned multi-cell rows a text span needs to read as a table.
const MIN_TABLE_ROWS: usize = 2;

/// Search direction relative to a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Direction searched first for a caption kind.
    fn primary(kind: FigureKind) -> Self {
        match kind {
            FigureKind::Figure => Direction::Above,
            FigureKind::Table => Direction::Below,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }
}

/// What a caption was matched to.
enum Match {
    /// A graphic region, grown by adjacency later
    Graphic(usize),
    /// A table laid out as text: the text regions it touches and its extent
    Table { regions: Vec<usize>, span: BBox },
}

/// Figures found on a page and the captions left without one.
#[derive(Debug, Clone, Default)]
pub struct MatchedFigures {
    pub figures: Vec<Figure>,
    pub failed: Vec<FailedCaption>,
}

/// Matches built captions to classified regions.
pub struct FigureDetector<'a> {
    layout: &'a DocumentLayout,
    thresholds: &'a Thresholds,
}

impl<'a> FigureDetector<'a> {
    pub fn new(layout: &'a DocumentLayout, thresholds: &'a Thresholds) -> Self {
        Self { layout, thresholds }
    }

    /// Match every caption of a page.
    ///
    /// Captions are processed from the top of the page, left to right on
    /// equal tops; a region claimed by one caption is unavailable to the rest.
    pub fn detect(&self, page: &Page, regions: &[Region], captions: &[Caption]) -> MatchedFigures {
        let mut order: Vec<&Caption> = captions.iter().collect();
        order.sort_by(|a, b| {
            a.bbox
                .y1
                .partial_cmp(&b.bbox.y1)
                .unwrap_or(Ordering::Equal)
                .then(a.bbox.x1.partial_cmp(&b.bbox.x1).unwrap_or(Ordering::Equal))
        });

        let consumed: HashSet<LineRef> = captions
            .iter()
            .flat_map(|c| c.lines.iter().copied())
            .collect();
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut matched = MatchedFigures::default();

        for caption in order {
            let Some(found) = self.find_match(page, caption, regions, &claimed, &consumed) else {
                log::debug!(
                    "FigureDetector: page {} '{}' matched no graphic",
                    page.number,
                    caption.candidate.label
                );
                matched.failed.push(FailedCaption::unmatched(caption));
                continue;
            };

            let (group, boxes, bbox) = match found {
                Match::Graphic(seed) => {
                    let group = self.grow_group(seed, regions, &claimed);
                    let boxes: Vec<BBox> = group.iter().map(|&i| regions[i].bbox).collect();
                    let bbox = BBox::union_all(&boxes).unwrap_or(regions[seed].bbox);
                    (group, boxes, bbox)
                }
                Match::Table { regions, span } => (regions, vec![span], span),
            };
            claimed.extend(group.iter().copied());

            log::debug!(
                "FigureDetector: page {} '{}' matched {} region(s)",
                page.number,
                caption.candidate.label,
                boxes.len()
            );
            matched.figures.push(Figure {
                page: page.number,
                kind: caption.kind(),
                number: caption.number(),
                label: caption.candidate.label.clone(),
                caption: caption.text.clone(),
                caption_bbox: caption.bbox,
                regions: boxes,
                bbox,
            });
        }

        matched
    }

    /// Pick the best unclaimed region for a caption.
    fn find_match(
        &self,
        page: &Page,
        caption: &Caption,
        regions: &[Region],
        claimed: &HashSet<usize>,
        consumed: &HashSet<LineRef>,
    ) -> Option<Match> {
        let primary = Direction::primary(caption.kind());
        let graphic = self
            .nearest(caption, regions, claimed, RegionKind::Graphic, primary)
            .or_else(|| {
                self.nearest(caption, regions, claimed, RegionKind::Graphic, primary.opposite())
            });
        if let Some(index) = graphic {
            return Some(Match::Graphic(index));
        }

        // Tables drawn without rules are laid out as plain text
        if caption.kind() != FigureKind::Table {
            return None;
        }
        let start = self.nearest(caption, regions, claimed, RegionKind::Text, Direction::Below)?;
        let span = self.table_span(page, caption, &regions[start].bbox, consumed)?;
        let covered = regions
            .iter()
            .enumerate()
            .filter(|(i, r)| r.is_text() && !claimed.contains(i) && r.bbox.overlaps(&span))
            .map(|(i, _)| i)
            .collect();
        Some(Match::Table {
            regions: covered,
            span,
        })
    }

    /// Extent of the table starting at `start`, when the text there is laid
    /// out in aligned cells.
    ///
    /// The span ends at the first vertical gap wider than the caption gap.
    fn table_span(
        &self,
        page: &Page,
        caption: &Caption,
        start: &BBox,
        consumed: &HashSet<LineRef>,
    ) -> Option<BBox> {
        let spacing = self.layout.median_line_spacing;
        let max_gap = self.layout.scaled(self.thresholds.caption_gap_factor);

        let mut lines: Vec<BBox> = page
            .lines()
            .filter(|(line_ref, _, line)| {
                !consumed.contains(line_ref)
                    && line.bbox.is_finite()
                    && !line.text.trim().is_empty()
            })
            .map(|(_, _, line)| line.bbox)
            .filter(|b| b.center_y() >= start.y1 && self.layout.shares_column(b, &caption.bbox))
            .collect();
        lines.sort_by(|a, b| {
            a.y1.partial_cmp(&b.y1)
                .unwrap_or(Ordering::Equal)
                .then(a.x1.partial_cmp(&b.x1).unwrap_or(Ordering::Equal))
        });

        let mut rows: Vec<Vec<BBox>> = Vec::new();
        for line in lines {
            match rows.last_mut() {
                Some(row) if (line.center_y() - row[0].center_y()).abs() <= spacing * 0.5 => {
                    row.push(line)
                }
                Some(row) => {
                    let bottom = row.iter().map(|b| b.y2).fold(f32::MIN, f32::max);
                    if line.y1 - bottom > max_gap {
                        break;
                    }
                    rows.push(vec![line]);
                }
                None => rows.push(vec![line]),
            }
        }

        let cells: Vec<Vec<BBox>> = rows.iter().map(|row| row_cells(row, spacing)).collect();
        let header = cells.iter().find(|c| c.len() >= 2)?;
        let tolerance = spacing * CELL_ALIGN_FACTOR;
        let aligned = cells
            .iter()
            .filter(|row| row.len() >= 2)
            .filter(|row| {
                row.iter()
                    .filter(|cell| header.iter().any(|h| cells_align(h, cell, tolerance)))
                    .count()
                    >= 2
            })
            .count();

        if aligned < MIN_TABLE_ROWS || aligned * 2 < rows.len() {
            log::debug!(
                "FigureDetector: {} of {} row(s) below '{}' read as table cells",
                aligned,
                rows.len(),
                caption.candidate.label
            );
            return None;
        }

        let boxes: Vec<BBox> = rows.into_iter().flatten().collect();
        BBox::union_all(&boxes)
    }

    /// Nearest region of `kind` in `direction`, within the search window.
    ///
    /// Ties on vertical gap go to the region overlapping the caption more,
    /// then to the earlier region.
    fn nearest(
        &self,
        caption: &Caption,
        regions: &[Region],
        claimed: &HashSet<usize>,
        kind: RegionKind,
        direction: Direction,
    ) -> Option<usize> {
        let window = self.layout.scaled(self.thresholds.figure_search_factor);
        let c = &caption.bbox;

        regions
            .iter()
            .enumerate()
            .filter(|(i, r)| r.kind == kind && !claimed.contains(i))
            .filter(|(_, r)| match direction {
                Direction::Above => r.bbox.center_y() < c.center_y(),
                Direction::Below => r.bbox.center_y() > c.center_y(),
            })
            .filter(|(_, r)| self.layout.shares_column(&r.bbox, c))
            .map(|(i, r)| (i, r.bbox.vertical_gap(c), r.bbox.horizontal_overlap(c)))
            .filter(|&(_, gap, _)| gap <= window)
            .min_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then(b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
                    .then(a.0.cmp(&b.0))
            })
            .map(|(i, _, _)| i)
    }

    /// The chosen graphic plus every unclaimed graphic reachable through
    /// adjacency.
    fn grow_group(&self, seed: usize, regions: &[Region], claimed: &HashSet<usize>) -> Vec<usize> {
        let tolerance = self.layout.scaled(self.thresholds.graphic_merge_factor);
        let mut group = vec![seed];
        let mut frontier = vec![seed];

        while let Some(current) = frontier.pop() {
            let current_box = regions[current].bbox;
            for (i, r) in regions.iter().enumerate() {
                if r.is_graphic()
                    && !claimed.contains(&i)
                    && !group.contains(&i)
                    && r.bbox.is_adjacent(&current_box, tolerance)
                {
                    group.push(i);
                    frontier.push(i);
                }
            }
        }

        group.sort_unstable();
        group
    }
}

/// Merge the fragments of a row into cells, left to right.
fn row_cells(row: &[BBox], spacing: f32) -> Vec<BBox> {
    let mut fragments = row.to_vec();
    fragments.sort_by(|a, b| a.x1.partial_cmp(&b.x1).unwrap_or(Ordering::Equal));

    let mut cells: Vec<BBox> = Vec::with_capacity(fragments.len());
    for fragment in &fragments {
        match cells.last_mut() {
            Some(cell) if fragment.x1 - cell.x2 < spacing * CELL_GAP_FACTOR => {
                *cell = cell.union(fragment)
            }
            _ => cells.push(*fragment),
        }
    }
    cells
}

/// Cells share a column when their left edges, right edges or centers line up.
fn cells_align(a: &BBox, b: &BBox, tolerance: f32) -> bool {
    (a.x1 - b.x1).abs() <= tolerance
        || (a.x2 - b.x2).abs() <= tolerance
        || (a.center_x() - b.center_x()).abs() <= tolerance
}
