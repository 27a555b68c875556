//! Graphics extraction: filtering and clustering drawing primitives.

use crate::error::{Error, Result};
use crate::model::{
    BBox, Color, DocumentLayout, GraphicsOrigin, GraphicsRegion, Page, Primitive, PrimitiveKind,
};

use super::options::ParseOptions;

/// Share of the page an image or cluster must cover to count as full-page.
const FULL_PAGE_COVERAGE: f32 = 0.9;

/// Per-channel tolerance when comparing fill colors to the background.
const WHITE_TOLERANCE: u8 = 8;

/// Clusters a page's drawing primitives into graphics regions.
pub struct GraphicsExtractor<'a> {
    options: &'a ParseOptions,
    layout: Option<&'a DocumentLayout>,
}

impl<'a> GraphicsExtractor<'a> {
    /// Create an extractor. Without a layout primitives are clustered only
    /// when they touch.
    pub fn new(options: &'a ParseOptions, layout: Option<&'a DocumentLayout>) -> Self {
        Self { options, layout }
    }

    /// Extract the graphics regions of a page.
    ///
    /// Fails with [`Error::OcrDisallowed`] when the page is a scanned image
    /// and OCR pages are not allowed.
    pub fn extract(&self, page: &Page) -> Result<Vec<GraphicsRegion>> {
        let primitives = sanitize(page);
        self.check_ocr(page, &primitives)?;

        let boxes: Vec<(BBox, GraphicsOrigin)> = primitives
            .iter()
            .filter(|p| !(self.options.ignore_white_graphics && is_blank_fill(p, page.background)))
            .map(|p| {
                let origin = if p.is_image() {
                    GraphicsOrigin::Image
                } else {
                    GraphicsOrigin::Vector
                };
                (p.bbox, origin)
            })
            .collect();

        let dropped = primitives.len() - boxes.len();
        if dropped > 0 {
            log::debug!(
                "GraphicsExtractor: page {} dropped {} blank fill(s)",
                page.number,
                dropped
            );
        }

        let tolerance = self
            .layout
            .map(|l| l.scaled(self.options.thresholds.graphic_merge_factor))
            .unwrap_or(0.0);
        let regions = cluster_regions(page.number, &boxes, tolerance, page.area());

        log::debug!(
            "GraphicsExtractor: page {} -> {} region(s) from {} primitive(s)",
            page.number,
            regions.len(),
            boxes.len()
        );
        Ok(regions)
    }

    /// Fail or warn when the page is image-only.
    fn check_ocr(&self, page: &Page, primitives: &[Primitive]) -> Result<()> {
        if !is_ocr_page(page, primitives) {
            return Ok(());
        }
        if !self.options.allow_ocr {
            return Err(Error::OcrDisallowed { page: page.number });
        }
        log::warn!(
            "Page {} is an image-only page; its image is treated as background",
            page.number
        );
        Ok(())
    }
}

/// Drop primitives with non-finite or off-page boxes and clip the rest.
fn sanitize(page: &Page) -> Vec<Primitive> {
    let bounds = page.bounds();
    page.primitives
        .iter()
        .filter(|p| p.bbox.is_finite())
        .filter_map(|p| {
            p.bbox.clip(&bounds).map(|bbox| Primitive {
                bbox,
                ..p.clone()
            })
        })
        .collect()
}

/// Whether a fill is painted in the page background color or near-white.
fn is_blank_fill(primitive: &Primitive, background: Color) -> bool {
    if primitive.kind != PrimitiveKind::Fill {
        return false;
    }
    match primitive.color {
        Some(color) => {
            color.is_close_to(&background, WHITE_TOLERANCE)
                || color.is_close_to(&Color::WHITE, WHITE_TOLERANCE)
        }
        None => false,
    }
}

/// A page is image-only when one image covers nearly all of it, every vector
/// primitive lies inside that image, and the page has no usable text.
fn is_ocr_page(page: &Page, primitives: &[Primitive]) -> bool {
    let page_area = page.area();
    if page_area <= 0.0 {
        return false;
    }

    let Some(image) = primitives
        .iter()
        .filter(|p| p.is_image() && p.bbox.area() >= page_area * FULL_PAGE_COVERAGE)
        .map(|p| p.bbox)
        .next()
    else {
        return false;
    };

    let independent_vector = primitives
        .iter()
        .any(|p| !p.is_image() && !image.contains(&p.bbox));
    if independent_vector {
        return false;
    }

    page.lines()
        .all(|(_, _, line)| line.invisible || line.is_degenerate())
}

/// Cluster boxes into regions by tolerance adjacency.
///
/// Connected components are merged repeatedly until no two resulting regions
/// are adjacent, so clustering the output again returns it unchanged.
pub fn cluster_regions(
    page: u32,
    boxes: &[(BBox, GraphicsOrigin)],
    tolerance: f32,
    page_area: f32,
) -> Vec<GraphicsRegion> {
    let mut current: Vec<(BBox, GraphicsOrigin)> = boxes.to_vec();

    loop {
        let merged = merge_components(&current, tolerance);
        let stable = merged.len() == current.len();
        current = merged;
        if stable {
            break;
        }
    }

    current.sort_by(|a, b| {
        a.0.y1
            .partial_cmp(&b.0.y1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.x1.partial_cmp(&b.0.x1).unwrap_or(std::cmp::Ordering::Equal))
    });

    current
        .into_iter()
        .map(|(bbox, origin)| {
            let mut region = GraphicsRegion::new(page, bbox, origin);
            region.is_likely_background =
                page_area > 0.0 && bbox.area() >= page_area * FULL_PAGE_COVERAGE;
            region
        })
        .collect()
}

/// One round of union-find over pairwise adjacency.
fn merge_components(
    boxes: &[(BBox, GraphicsOrigin)],
    tolerance: f32,
) -> Vec<(BBox, GraphicsOrigin)> {
    let mut sets = DisjointSet::new(boxes.len());
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].0.is_adjacent(&boxes[j].0, tolerance) {
                sets.union(i, j);
            }
        }
    }

    let mut components: Vec<Option<(BBox, GraphicsOrigin)>> = vec![None; boxes.len()];
    for (i, &(bbox, origin)) in boxes.iter().enumerate() {
        let root = sets.find(i);
        components[root] = Some(match components[root] {
            Some((acc, acc_origin)) => {
                let origin = if acc_origin == GraphicsOrigin::Image {
                    acc_origin
                } else {
                    origin
                };
                (acc.union(&bbox), origin)
            }
            None => (bbox, origin),
        });
    }
    components.into_iter().flatten().collect()
}

/// Union-find with path compression.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb.max(ra)] = ra.min(rb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TextBlock, TextLine};

    fn layout() -> DocumentLayout {
        DocumentLayout::single_column(12.0, 50.0, 560.0, 10.0)
    }

    fn options() -> ParseOptions {
        ParseOptions::default().with_allow_ocr(false)
    }

    #[test]
    fn test_touching_strokes_form_one_region() {
        let layout = layout();
        let options = options();
        let mut page = Page::letter(0);
        // A plot frame: four rules and one bar inside
        page.add_primitive(Primitive::stroke(BBox::new(100.0, 100.0, 400.0, 100.0)));
        page.add_primitive(Primitive::stroke(BBox::new(100.0, 380.0, 400.0, 380.0)));
        page.add_primitive(Primitive::stroke(BBox::new(100.0, 100.0, 100.0, 380.0)));
        page.add_primitive(Primitive::stroke(BBox::new(400.0, 100.0, 400.0, 380.0)));
        page.add_primitive(Primitive::fill(BBox::new(150.0, 200.0, 180.0, 380.0), Color::BLACK));
        // Far away
        page.add_primitive(Primitive::stroke(BBox::new(100.0, 600.0, 400.0, 600.0)));

        let regions = GraphicsExtractor::new(&options, Some(&layout))
            .extract(&page)
            .unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].bbox, BBox::new(100.0, 100.0, 400.0, 380.0));
        assert_eq!(regions[0].origin, GraphicsOrigin::Vector);
        assert!(!regions[0].is_likely_background);
    }

    #[test]
    fn test_white_fills_dropped() {
        let layout = layout();
        let mut page = Page::letter(0);
        page.add_primitive(Primitive::fill(page.bounds(), Color::WHITE));

        let options = options();
        let regions = GraphicsExtractor::new(&options, Some(&layout))
            .extract(&page)
            .unwrap();
        assert!(regions.is_empty());

        let options = options.with_ignore_white_graphics(false);
        let regions = GraphicsExtractor::new(&options, Some(&layout))
            .extract(&page)
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_likely_background);
    }

    #[test]
    fn test_off_page_and_non_finite_dropped() {
        let layout = layout();
        let options = options();
        let mut page = Page::letter(0);
        page.add_primitive(Primitive::stroke(BBox::new(f32::NAN, 0.0, 10.0, 10.0)));
        page.add_primitive(Primitive::stroke(BBox::new(700.0, 100.0, 800.0, 200.0)));
        page.add_primitive(Primitive::image(BBox::new(-50.0, 100.0, 100.0, 200.0)));

        let regions = GraphicsExtractor::new(&options, Some(&layout))
            .extract(&page)
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, BBox::new(0.0, 100.0, 100.0, 200.0));
        assert_eq!(regions[0].origin, GraphicsOrigin::Image);
    }

    #[test]
    fn test_ocr_page_disallowed() {
        let mut page = Page::letter(4);
        page.add_primitive(Primitive::image(page.bounds()));

        let options = options();
        let err = GraphicsExtractor::new(&options, None)
            .extract(&page)
            .unwrap_err();
        assert!(matches!(err, Error::OcrDisallowed { page: 4 }));
    }

    #[test]
    fn test_ocr_page_allowed_becomes_background() {
        let mut page = Page::letter(0);
        page.add_primitive(Primitive::image(page.bounds()));
        let mut hidden = TextLine::new("scanned words", BBox::new(50.0, 50.0, 200.0, 60.0), 10.0);
        hidden.invisible = true;
        page.add_block(TextBlock::body(vec![hidden]));

        let options = options().with_allow_ocr(true);
        let regions = GraphicsExtractor::new(&options, None).extract(&page).unwrap();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_likely_background);
    }

    #[test]
    fn test_full_page_image_with_text_is_not_ocr() {
        let mut page = Page::letter(0);
        page.add_primitive(Primitive::image(page.bounds()));
        page.add_block(TextBlock::body(vec![TextLine::new(
            "real text",
            BBox::new(50.0, 50.0, 200.0, 60.0),
            10.0,
        )]));

        let options = options();
        assert!(GraphicsExtractor::new(&options, None).extract(&page).is_ok());
    }

    #[test]
    fn test_clustering_is_idempotent() {
        // Chain where a merged box becomes adjacent to a box it was not
        // adjacent to before
        let boxes = vec![
            (BBox::new(0.0, 0.0, 10.0, 10.0), GraphicsOrigin::Vector),
            (BBox::new(12.0, 0.0, 20.0, 10.0), GraphicsOrigin::Vector),
            (BBox::new(0.0, 30.0, 5.0, 40.0), GraphicsOrigin::Image),
            (BBox::new(5.0, 12.0, 18.0, 28.0), GraphicsOrigin::Vector),
            (BBox::new(100.0, 100.0, 110.0, 110.0), GraphicsOrigin::Vector),
        ];
        let once = cluster_regions(0, &boxes, 3.0, 1.0e6);
        let again: Vec<(BBox, GraphicsOrigin)> =
            once.iter().map(|r| (r.bbox, r.origin)).collect();
        let twice = cluster_regions(0, &again, 3.0, 1.0e6);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].bbox, BBox::new(0.0, 0.0, 20.0, 40.0));
        assert_eq!(once[0].origin, GraphicsOrigin::Image);
    }
}
