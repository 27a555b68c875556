//! Typed page-partitioning regions.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Classification of a page region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Text,
    Caption,
    Graphic,
    Whitespace,
}

/// A classified, non-overlapping area of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub bbox: BBox,
    pub kind: RegionKind,
    /// Layout column the region belongs to
    pub column: Option<usize>,
}

impl Region {
    pub fn new(bbox: BBox, kind: RegionKind) -> Self {
        Self {
            bbox,
            kind,
            column: None,
        }
    }

    pub fn is_graphic(&self) -> bool {
        self.kind == RegionKind::Graphic
    }

    pub fn is_text(&self) -> bool {
        self.kind == RegionKind::Text
    }
}
