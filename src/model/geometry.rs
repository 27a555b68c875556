//! Axis-aligned boxes in page space.
//!
//! Page space has its origin at the top-left corner and `y` grows downward,
//! so `y1` is the top edge and `y2` the bottom edge of a box.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl BBox {
    /// Create a box from its edges.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.x1 + self.x2) * 0.5
    }

    pub fn center_y(&self) -> f32 {
        (self.y1 + self.y2) * 0.5
    }

    /// Whether all four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Union of an iterator of boxes, or `None` when it is empty.
    pub fn union_all<'a, I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Overlapping part of two boxes with positive area.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let b = Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if b.x1 < b.x2 && b.y1 < b.y2 {
            Some(b)
        } else {
            None
        }
    }

    /// Whether the boxes share interior area.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Whether the boxes touch or overlap once each is grown by `tolerance`.
    ///
    /// Zero-width strokes (horizontal and vertical rules) still count as
    /// adjacent because the comparison is inclusive.
    pub fn is_adjacent(&self, other: &Self, tolerance: f32) -> bool {
        self.x1 - tolerance <= other.x2
            && other.x1 - tolerance <= self.x2
            && self.y1 - tolerance <= other.y2
            && other.y1 - tolerance <= self.y2
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        other.x1 >= self.x1 && other.x2 <= self.x2 && other.y1 >= self.y1 && other.y2 <= self.y2
    }

    /// Length of the shared horizontal extent.
    pub fn horizontal_overlap(&self, other: &Self) -> f32 {
        (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0)
    }

    /// Empty vertical space between the boxes (0 when they overlap vertically).
    pub fn vertical_gap(&self, other: &Self) -> f32 {
        if self.y2 <= other.y1 {
            other.y1 - self.y2
        } else if other.y2 <= self.y1 {
            self.y1 - other.y2
        } else {
            0.0
        }
    }

    /// Clip this box to `bounds`, returning `None` when nothing remains.
    ///
    /// Degenerate (zero-width or zero-height) results are kept.
    pub fn clip(&self, bounds: &Self) -> Option<Self> {
        let b = Self {
            x1: self.x1.max(bounds.x1),
            y1: self.y1.max(bounds.y1),
            x2: self.x2.min(bounds.x2),
            y2: self.y2.min(bounds.y2),
        };
        if b.x1 <= b.x2 && b.y1 <= b.y2 {
            Some(b)
        } else {
            None
        }
    }

    /// Area of this box that lies outside `other`, as disjoint pieces.
    ///
    /// Produces at most four boxes: full-width bands above and below the
    /// overlap, then the left and right remainders beside it.
    pub fn subtract(&self, other: &Self) -> Vec<BBox> {
        let Some(cut) = self.intersection(other) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(4);
        if cut.y1 > self.y1 {
            pieces.push(BBox::new(self.x1, self.y1, self.x2, cut.y1));
        }
        if cut.y2 < self.y2 {
            pieces.push(BBox::new(self.x1, cut.y2, self.x2, self.y2));
        }
        if cut.x1 > self.x1 {
            pieces.push(BBox::new(self.x1, cut.y1, cut.x1, cut.y2));
        }
        if cut.x2 < self.x2 {
            pieces.push(BBox::new(cut.x2, cut.y1, self.x2, cut.y2));
        }
        pieces
    }

    /// Area of this box outside every box in `others`, as disjoint pieces.
    pub fn subtract_all(&self, others: &[BBox]) -> Vec<BBox> {
        others.iter().fold(vec![*self], |pieces, other| {
            pieces.iter().flat_map(|p| p.subtract(other)).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_area() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 15.0, 20.0);
        let u = a.union(&b);
        assert_eq!(u, BBox::new(0.0, 0.0, 15.0, 20.0));
        assert_eq!(u.area(), 300.0);
    }

    #[test]
    fn test_adjacency_tolerance() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(13.0, 0.0, 20.0, 10.0);
        assert!(!a.is_adjacent(&b, 2.0));
        assert!(a.is_adjacent(&b, 3.0));

        // A horizontal rule touching the box edge
        let rule = BBox::new(0.0, 10.0, 10.0, 10.0);
        assert!(a.is_adjacent(&rule, 0.0));
    }

    #[test]
    fn test_vertical_gap() {
        let a = BBox::new(0.0, 100.0, 10.0, 380.0);
        let b = BBox::new(0.0, 400.0, 10.0, 410.0);
        assert_eq!(a.vertical_gap(&b), 20.0);
        assert_eq!(b.vertical_gap(&a), 20.0);
        assert_eq!(a.vertical_gap(&a), 0.0);
    }

    #[test]
    fn test_subtract_inner_hole() {
        let outer = BBox::new(0.0, 0.0, 100.0, 100.0);
        let hole = BBox::new(40.0, 40.0, 60.0, 60.0);
        let pieces = outer.subtract(&hole);
        assert_eq!(pieces.len(), 4);

        let area: f32 = pieces.iter().map(|p| p.area()).sum();
        assert_eq!(area, outer.area() - hole.area());
        for (i, a) in pieces.iter().enumerate() {
            assert!(!a.overlaps(&hole));
            for b in &pieces[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_subtract_disjoint_and_covering() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.subtract(&BBox::new(20.0, 20.0, 30.0, 30.0)), vec![a]);
        assert!(a.subtract(&BBox::new(-1.0, -1.0, 11.0, 11.0)).is_empty());
    }

    #[test]
    fn test_subtract_all() {
        let a = BBox::new(0.0, 0.0, 100.0, 10.0);
        let cuts = [BBox::new(0.0, 0.0, 20.0, 10.0), BBox::new(80.0, 0.0, 100.0, 10.0)];
        assert_eq!(a.subtract_all(&cuts), vec![BBox::new(20.0, 0.0, 80.0, 10.0)]);
        assert_eq!(a.subtract_all(&[]), vec![a]);
    }

    #[test]
    fn test_clip_keeps_rules() {
        let page = BBox::new(0.0, 0.0, 612.0, 792.0);
        let rule = BBox::new(50.0, 100.0, 700.0, 100.0);
        assert_eq!(rule.clip(&page), Some(BBox::new(50.0, 100.0, 612.0, 100.0)));
        assert!(BBox::new(700.0, 0.0, 800.0, 10.0).clip(&page).is_none());
    }
}
