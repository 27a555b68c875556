//! Document-wide layout calibration.

use super::BBox;
use serde::{Deserialize, Serialize};

/// A detected column in the page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Left boundary X coordinate
    pub left: f32,
    /// Right boundary X coordinate
    pub right: f32,
    /// Column index (0 = leftmost)
    pub index: usize,
}

impl Column {
    pub fn new(left: f32, right: f32, index: usize) -> Self {
        Self { left, right, index }
    }

    /// Check if an X coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Horizontal distance from `x` to this column (0 inside it).
    fn distance(&self, x: f32) -> f32 {
        if x < self.left {
            self.left - x
        } else if x > self.right {
            x - self.right
        } else {
            0.0
        }
    }
}

/// Spatial calibration shared by every per-page stage.
///
/// All heuristic tolerances are multiples of `median_line_spacing`, so the
/// pipeline follows the document's own typography rather than absolute units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Median distance between the tops of consecutive body lines
    pub median_line_spacing: f32,

    /// Columns sorted left to right
    pub columns: Vec<Column>,

    /// Most common body font size
    pub body_font_size: f32,
}

impl DocumentLayout {
    pub fn new(median_line_spacing: f32, columns: Vec<Column>, body_font_size: f32) -> Self {
        Self {
            median_line_spacing,
            columns,
            body_font_size,
        }
    }

    /// A layout with one column spanning `left..right`.
    pub fn single_column(median_line_spacing: f32, left: f32, right: f32, body_font_size: f32) -> Self {
        Self::new(
            median_line_spacing,
            vec![Column::new(left, right, 0)],
            body_font_size,
        )
    }

    /// `factor` line spacings.
    pub fn scaled(&self, factor: f32) -> f32 {
        self.median_line_spacing * factor
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Column holding the center of `bbox`, or the nearest one.
    pub fn column_of(&self, bbox: &BBox) -> usize {
        let cx = bbox.center_x();
        if let Some(col) = self.columns.iter().find(|c| c.contains(cx)) {
            return col.index;
        }
        self.columns
            .iter()
            .min_by(|a, b| {
                a.distance(cx)
                    .partial_cmp(&b.distance(cx))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|c| c.index)
            .unwrap_or(0)
    }

    /// First and last column index that `bbox` horizontally overlaps.
    pub fn columns_spanned(&self, bbox: &BBox) -> (usize, usize) {
        let mut spanned = self
            .columns
            .iter()
            .filter(|c| bbox.x1 < c.right && bbox.x2 > c.left)
            .map(|c| c.index);
        match spanned.next() {
            Some(first) => {
                let last = spanned.last().unwrap_or(first);
                (first, last)
            }
            None => {
                let idx = self.column_of(bbox);
                (idx, idx)
            }
        }
    }

    /// Whether two boxes span at least one common column.
    pub fn shares_column(&self, a: &BBox, b: &BBox) -> bool {
        let (a_first, a_last) = self.columns_spanned(a);
        let (b_first, b_last) = self.columns_spanned(b);
        a_first <= b_last && b_first <= a_last
    }
}
