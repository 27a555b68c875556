//! Caption, graphics and figure types.

use super::{BBox, LineRef};
use serde::{Deserialize, Serialize};

/// Whether a caption introduces a figure or a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    Figure,
    Table,
}

impl FigureKind {
    /// Human-readable name ("Figure", "Table").
    pub fn name(&self) -> &'static str {
        match self {
            FigureKind::Figure => "Figure",
            FigureKind::Table => "Table",
        }
    }
}

impl std::fmt::Display for FigureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A line opening that looks like the start of a caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCandidate {
    /// Page number (0-indexed)
    pub page: u32,

    /// Figure or table
    pub kind: FigureKind,

    /// Parsed number, if the label carried one that could be read
    pub number: Option<u32>,

    /// Matched label text (e.g. "Figure 3:")
    pub label: String,

    /// Line the caption starts on
    pub line: LineRef,

    /// Box of the anchor line; its top-left corner is the anchor position
    pub anchor: BBox,

    /// Whether the anchor line is the first line of its text block
    pub opens_block: bool,
}

impl CaptionCandidate {
    /// Display name such as "Figure 3" or "Table" when unnumbered.
    pub fn name(&self) -> String {
        match self.number {
            Some(n) => format!("{} {}", self.kind, n),
            None => self.kind.to_string(),
        }
    }
}

/// A caption candidate extended to its full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// The candidate this caption was built from
    pub candidate: CaptionCandidate,

    /// Full caption text including the label
    pub text: String,

    /// Bounding box of all consumed lines
    pub bbox: BBox,

    /// Every line consumed by the caption, anchor first
    pub lines: Vec<LineRef>,
}

impl Caption {
    pub fn page(&self) -> u32 {
        self.candidate.page
    }

    pub fn kind(&self) -> FigureKind {
        self.candidate.kind
    }

    pub fn number(&self) -> Option<u32> {
        self.candidate.number
    }
}

/// Why a caption did not become a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No caption body text could be delimited after the label
    EmptyBody,
    /// The caption overlapped a caption built earlier on the same page
    OverlapsCaption,
    /// No graphics region was found in the search window
    NoGraphicMatched,
}

/// A caption that was reported instead of matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCaption {
    pub page: u32,
    pub kind: FigureKind,
    pub number: Option<u32>,
    pub label: String,
    /// Caption text as far as it could be built
    pub text: String,
    pub bbox: BBox,
    pub reason: FailureReason,
}

impl FailedCaption {
    /// Record a built caption that found no graphic.
    pub fn unmatched(caption: &Caption) -> Self {
        Self {
            page: caption.page(),
            kind: caption.kind(),
            number: caption.number(),
            label: caption.candidate.label.clone(),
            text: caption.text.clone(),
            bbox: caption.bbox,
            reason: FailureReason::NoGraphicMatched,
        }
    }

    /// Record a candidate whose caption could not be built.
    pub fn from_candidate(
        candidate: &CaptionCandidate,
        text: impl Into<String>,
        bbox: BBox,
        reason: FailureReason,
    ) -> Self {
        Self {
            page: candidate.page,
            kind: candidate.kind,
            number: candidate.number,
            label: candidate.label.clone(),
            text: text.into(),
            bbox,
            reason,
        }
    }
}

/// Where a graphics region came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicsOrigin {
    /// A cluster of vector strokes and fills
    Vector,
    /// Contains at least one embedded raster image
    Image,
}

/// A clustered box of drawing primitives on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsRegion {
    pub page: u32,
    pub bbox: BBox,
    pub origin: GraphicsOrigin,
    /// The region covers (nearly) the whole page and is not a figure candidate
    pub is_likely_background: bool,
}

impl GraphicsRegion {
    pub fn new(page: u32, bbox: BBox, origin: GraphicsOrigin) -> Self {
        Self {
            page,
            bbox,
            origin,
            is_likely_background: false,
        }
    }
}

/// A caption matched to one or more graphics regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Page number (0-indexed)
    pub page: u32,

    pub kind: FigureKind,

    pub number: Option<u32>,

    /// Caption label (e.g. "Figure 3:")
    pub label: String,

    /// Full caption text
    pub caption: String,

    /// Caption bounding box
    pub caption_bbox: BBox,

    /// Boxes of the merged graphics regions, in claim order
    pub regions: Vec<BBox>,

    /// Union of `regions`
    pub bbox: BBox,
}

impl Figure {
    /// Display name such as "Figure 3".
    pub fn name(&self) -> String {
        match self.number {
            Some(n) => format!("{} {}", self.kind, n),
            None => self.kind.to_string(),
        }
    }
}
