//! Page-level input types.
//!
//! A [`Page`] is what the page-access collaborator hands to the pipeline:
//! classified text blocks with font metrics, plus drawing primitives with
//! paint information. Pages are not modified by the pipeline.

use super::BBox;
use serde::{Deserialize, Serialize};

/// A single page of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (0-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Base color of the page
    #[serde(default)]
    pub background: Color,

    /// Classified text blocks in the order the collaborator produced them
    #[serde(default)]
    pub blocks: Vec<TextBlock>,

    /// Drawing primitives in painting order
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            background: Color::WHITE,
            blocks: Vec::new(),
            primitives: Vec::new(),
        }
    }

    /// Create an empty page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a text block to the page.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block);
    }

    /// Add a drawing primitive to the page.
    pub fn add_primitive(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// The full page area.
    pub fn bounds(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Iterate over every line with its block and line index.
    pub fn lines(&self) -> impl Iterator<Item = (LineRef, &TextBlock, &TextLine)> + '_ {
        self.blocks.iter().enumerate().flat_map(|(b, block)| {
            block
                .lines
                .iter()
                .enumerate()
                .map(move |(l, line)| (LineRef::new(b, l), block, line))
        })
    }

    /// Look up a line by reference.
    pub fn line(&self, line_ref: LineRef) -> Option<&TextLine> {
        self.blocks
            .get(line_ref.block)
            .and_then(|b| b.lines.get(line_ref.line))
    }

    /// Total number of text lines on the page.
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }

    /// Check if the page has neither text nor graphics.
    pub fn is_empty(&self) -> bool {
        self.line_count() == 0 && self.primitives.is_empty()
    }
}

/// Position of a line inside a page: block index plus line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineRef {
    pub block: usize,
    pub line: usize,
}

impl LineRef {
    pub fn new(block: usize, line: usize) -> Self {
        Self { block, line }
    }
}

/// Classification tag attached to a text block by the page-access collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Running body text
    #[default]
    Body,
    /// The paper abstract
    Abstract,
    /// Document title
    Title,
    /// Running header
    Header,
    /// Running footer or page number
    Footer,
    /// Anything else the collaborator could not classify
    Other,
}

impl BlockKind {
    /// Whether blocks of this kind take part in caption and section analysis.
    pub fn is_content(&self) -> bool {
        matches!(self, BlockKind::Body | BlockKind::Other)
    }
}

/// A block of consecutive text lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block classification
    #[serde(default)]
    pub kind: BlockKind,

    /// Lines in reading order
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create a new text block.
    pub fn new(kind: BlockKind, lines: Vec<TextLine>) -> Self {
        Self { kind, lines }
    }

    /// Create a body text block.
    pub fn body(lines: Vec<TextLine>) -> Self {
        Self::new(BlockKind::Body, lines)
    }

    /// Bounding box of all lines, or `None` for an empty block.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::union_all(self.lines.iter().map(|l| &l.bbox))
    }

    /// Combined text of all lines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() || self.lines.iter().all(|l| l.text.trim().is_empty())
    }
}

/// A single positioned line of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    /// The text content
    pub text: String,

    /// Line bounding box
    pub bbox: BBox,

    /// Dominant font size in points
    pub font_size: f32,

    /// Font name (e.g., "Times-Bold")
    #[serde(default)]
    pub font_name: String,

    /// Explicit bold flag from the collaborator
    #[serde(default)]
    pub bold: bool,

    /// Text drawn in an invisible render mode (typical of OCR text layers)
    #[serde(default)]
    pub invisible: bool,
}

impl TextLine {
    /// Create a new line.
    pub fn new(text: impl Into<String>, bbox: BBox, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_size,
            font_name: String::new(),
            bold: false,
            invisible: false,
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Mark the line as bold.
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Whether the line is bold, either flagged or judged from the font name.
    pub fn is_bold(&self) -> bool {
        if self.bold {
            return true;
        }
        let name = self.font_name.to_lowercase();
        name.contains("bold") || name.contains("black") || name.contains("heavy")
    }

    /// Whether the line carries no usable geometry.
    pub fn is_degenerate(&self) -> bool {
        !self.bbox.is_finite() || self.bbox.width() <= 0.0 || self.bbox.height() <= 0.0
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Kind of drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// A stroked path (lines, curves, outlines)
    Stroke,
    /// A filled path
    Fill,
    /// An embedded raster image
    Image,
}

/// A drawing primitive with its painted extent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    /// Primitive kind
    pub kind: PrimitiveKind,

    /// Painted extent
    pub bbox: BBox,

    /// Fill color for `Fill` primitives
    #[serde(default)]
    pub color: Option<Color>,
}

impl Primitive {
    pub fn stroke(bbox: BBox) -> Self {
        Self {
            kind: PrimitiveKind::Stroke,
            bbox,
            color: None,
        }
    }

    pub fn fill(bbox: BBox, color: Color) -> Self {
        Self {
            kind: PrimitiveKind::Fill,
            bbox,
            color: Some(color),
        }
    }

    pub fn image(bbox: BBox) -> Self {
        Self {
            kind: PrimitiveKind::Image,
            bbox,
            color: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == PrimitiveKind::Image
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Whether every channel is within `tolerance` of `other`.
    pub fn is_close_to(&self, other: &Color, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y: f32) -> TextLine {
        TextLine::new(text, BBox::new(50.0, y, 300.0, y + 10.0), 10.0)
    }

    #[test]
    fn test_page_new() {
        let page = Page::new(0, 612.0, 792.0);
        assert_eq!(page.number, 0);
        assert_eq!(page.bounds(), BBox::new(0.0, 0.0, 612.0, 792.0));
        assert!(page.is_empty());
    }

    #[test]
    fn test_page_lines_and_lookup() {
        let mut page = Page::letter(0);
        page.add_block(TextBlock::body(vec![line("a", 100.0), line("b", 112.0)]));
        page.add_block(TextBlock::body(vec![line("c", 140.0)]));

        let refs: Vec<LineRef> = page.lines().map(|(r, _, _)| r).collect();
        assert_eq!(refs, vec![LineRef::new(0, 0), LineRef::new(0, 1), LineRef::new(1, 0)]);
        assert_eq!(page.line(LineRef::new(1, 0)).map(|l| l.text.as_str()), Some("c"));
        assert!(page.line(LineRef::new(2, 0)).is_none());
        assert_eq!(page.line_count(), 3);
    }

    #[test]
    fn test_bold_detection() {
        let plain = line("x", 0.0).with_font("Times-Roman");
        assert!(!plain.is_bold());
        assert!(line("x", 0.0).with_font("Helvetica-Bold").is_bold());
        assert!(line("x", 0.0).with_bold().is_bold());
    }

    #[test]
    fn test_block_bbox() {
        let block = TextBlock::body(vec![line("a", 100.0), line("b", 112.0)]);
        assert_eq!(block.bbox(), Some(BBox::new(50.0, 100.0, 300.0, 122.0)));
        assert!(TextBlock::body(vec![]).bbox().is_none());
    }

    #[test]
    fn test_page_json_defaults() {
        let json = r#"{
            "number": 0, "width": 612, "height": 792,
            "blocks": [{"lines": [{"text": "Hi", "bbox": {"x1": 0, "y1": 0, "x2": 10, "y2": 10}, "font_size": 10}]}],
            "primitives": [{"kind": "fill", "bbox": {"x1": 0, "y1": 0, "x2": 1, "y2": 1}}]
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.background, Color::WHITE);
        assert_eq!(page.blocks[0].kind, BlockKind::Body);
        assert!(!page.blocks[0].lines[0].invisible);
        assert_eq!(page.primitives[0].kind, PrimitiveKind::Fill);
    }

    #[test]
    fn test_color_tolerance() {
        assert!(Color::rgb(250, 252, 255).is_close_to(&Color::WHITE, 8));
        assert!(!Color::BLACK.is_close_to(&Color::WHITE, 8));
    }
}
