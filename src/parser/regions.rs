//! Page partitioning into disjoint text, caption, graphic and whitespace regions.

use std::collections::HashSet;

use crate::model::{BBox, Caption, DocumentLayout, GraphicsRegion, LineRef, Page, Region, RegionKind};

/// Share of a text block that must lie inside a graphic for the block to be
/// treated as part of the graphic (axis labels, legends, in-figure text).
const ABSORB_RATIO: f32 = 0.5;

/// Classifies the areas of a page.
pub struct RegionClassifier<'a> {
    layout: &'a DocumentLayout,
}

impl<'a> RegionClassifier<'a> {
    pub fn new(layout: &'a DocumentLayout) -> Self {
        Self { layout }
    }

    /// Partition `page` into pairwise-disjoint regions.
    ///
    /// Background graphics are page decoration and are left out. The result
    /// is ordered by column, then top edge, then left edge.
    pub fn classify(
        &self,
        page: &Page,
        graphics: &[GraphicsRegion],
        captions: &[Caption],
    ) -> Vec<Region> {
        let caption_boxes: Vec<BBox> = captions.iter().map(|c| c.bbox).collect();

        let mut graphic_boxes: Vec<BBox> = graphics
            .iter()
            .filter(|g| !g.is_likely_background)
            .map(|g| g.bbox)
            .collect();

        let mut text_boxes = Vec::new();
        for text in text_block_boxes(page, captions) {
            let absorbed = text.area() > 0.0
                && graphic_boxes.iter_mut().any(|g| {
                    let inside = g.intersection(&text).map(|i| i.area()).unwrap_or(0.0);
                    if inside >= text.area() * ABSORB_RATIO {
                        *g = g.union(&text);
                        true
                    } else {
                        false
                    }
                });
            if !absorbed {
                text_boxes.push(text);
            }
        }

        let graphic_boxes = merge_overlapping(graphic_boxes);
        let text_boxes = merge_overlapping(text_boxes);

        let graphic_pieces = subtract_all(&graphic_boxes, &caption_boxes);
        let mut text_cutters = caption_boxes.clone();
        text_cutters.extend(graphic_pieces.iter().copied());
        let text_pieces = subtract_all(&text_boxes, &text_cutters);

        let mut regions: Vec<Region> = Vec::new();
        regions.extend(caption_boxes.iter().map(|b| self.region(*b, RegionKind::Caption)));
        regions.extend(graphic_pieces.iter().map(|b| self.region(*b, RegionKind::Graphic)));
        regions.extend(text_pieces.iter().map(|b| self.region(*b, RegionKind::Text)));

        let occupied: Vec<BBox> = regions.iter().map(|r| r.bbox).collect();
        if let Some(content) = BBox::union_all(&occupied) {
            regions.extend(
                content
                    .subtract_all(&occupied)
                    .into_iter()
                    .filter(|b| b.area() > 0.0)
                    .map(|b| self.region(b, RegionKind::Whitespace)),
            );
        }

        regions.sort_by(|a, b| {
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

        log::debug!(
            "RegionClassifier: page {} -> {} caption, {} graphic, {} text region(s)",
            page.number,
            caption_boxes.len(),
            graphic_pieces.len(),
            text_pieces.len()
        );
        regions
    }

    fn region(&self, bbox: BBox, kind: RegionKind) -> Region {
        let mut region = Region::new(bbox, kind);
        region.column = Some(self.layout.column_of(&bbox));
        region
    }
}

/// Boxes of every text block, without the lines captions consumed.
fn text_block_boxes(page: &Page, captions: &[Caption]) -> Vec<BBox> {
    let consumed: HashSet<LineRef> = captions
        .iter()
        .flat_map(|c| c.lines.iter().copied())
        .collect();

    page.blocks
        .iter()
        .enumerate()
        .filter_map(|(b, block)| {
            let boxes: Vec<BBox> = block
                .lines
                .iter()
                .enumerate()
                .filter(|(l, line)| {
                    !consumed.contains(&LineRef::new(b, *l))
                        && line.bbox.is_finite()
                        && !line.text.trim().is_empty()
                })
                .map(|(_, line)| line.bbox)
                .collect();
            BBox::union_all(&boxes)
        })
        .collect()
}

/// Merge boxes that share area until none do.
fn merge_overlapping(mut boxes: Vec<BBox>) -> Vec<BBox> {
    loop {
        let mut merged_any = false;
        let mut out: Vec<BBox> = Vec::with_capacity(boxes.len());
        for b in boxes {
            match out.iter_mut().find(|o| o.overlaps(&b)) {
                Some(o) => {
                    *o = o.union(&b);
                    merged_any = true;
                }
                None => out.push(b),
            }
        }
        boxes = out;
        if !merged_any {
            return boxes;
        }
    }
}

/// Cut every box by every cutter.
fn subtract_all(boxes: &[BBox], cutters: &[BBox]) -> Vec<BBox> {
    boxes.iter().flat_map(|b| b.subtract_all(cutters)).collect()
}
