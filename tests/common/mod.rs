//! Page fixtures shared by the integration tests.

#![allow(dead_code)]

use paperfig::model::{BBox, BlockKind, Color, Page, Primitive, TextBlock, TextLine};

pub const SPACING: f32 = 12.0;

pub fn line(text: &str, x1: f32, y: f32, x2: f32) -> TextLine {
    TextLine::new(text, BBox::new(x1, y, x2, y + 10.0), 10.0)
}

pub fn heading(text: &str, x1: f32, y: f32) -> TextBlock {
    TextBlock::body(vec![line(text, x1, y, x1 + 120.0).with_bold()])
}

/// `count` body lines starting at `y0`; the last one reads `last`.
pub fn body(x1: f32, x2: f32, y0: f32, count: usize, last: &str) -> TextBlock {
    let lines = (0..count)
        .map(|i| {
            let text = if i + 1 == count {
                last
            } else {
                "running text of the paper"
            };
            line(text, x1, y0 + i as f32 * SPACING, x2)
        })
        .collect();
    TextBlock::body(lines)
}

pub fn caption(text: &str, x1: f32, y: f32, x2: f32) -> TextBlock {
    TextBlock::body(vec![line(text, x1, y, x2)])
}

/// Rows of a three-cell table, one block per row, `SPACING` apart.
pub fn table_rows(y0: f32, rows: usize) -> Vec<TextBlock> {
    (0..rows)
        .map(|r| {
            let y = y0 + r as f32 * SPACING;
            TextBlock::body(vec![
                line("Baseline", 50.0, y, 110.0),
                line("0.91", 200.0, y, 250.0),
                line("12 ms", 350.0, y, 420.0),
            ])
        })
        .collect()
}

pub fn stroke(x1: f32, y1: f32, x2: f32, y2: f32) -> Primitive {
    Primitive::stroke(BBox::new(x1, y1, x2, y2))
}

/// Single-column page with twelve body lines below y=420.
pub fn single_column_page(number: u32) -> Page {
    let mut page = Page::letter(number);
    page.add_block(body(50.0, 560.0, 420.0, 12, "and so the section ends."));
    page
}

/// Page with one vector figure and its caption underneath.
pub fn figure_page(number: u32) -> Page {
    let mut page = single_column_page(number);
    page.add_block(caption("Figure 1: Results.", 50.0, 400.0, 300.0));
    page.add_primitive(stroke(100.0, 100.0, 400.0, 380.0));
    page
}

/// Two-page, two-column paper with an abstract, two sections and a figure
/// in the right column of the second page.
pub fn two_column_paper() -> Vec<Page> {
    let mut first = Page::letter(0);
    first.add_block(TextBlock::new(
        BlockKind::Abstract,
        vec![
            line("We study figures", 50.0, 40.0, 290.0),
            line("in papers.", 50.0, 52.0, 200.0),
        ],
    ));
    first.add_block(heading("1 Introduction", 50.0, 100.0));
    first.add_block(body(50.0, 290.0, 120.0, 10, "the paragraph continues"));
    first.add_block(body(320.0, 560.0, 100.0, 10, "and ends here."));

    let mut second = Page::letter(1);
    second.add_block(heading("2 Method", 50.0, 100.0));
    second.add_block(body(50.0, 290.0, 120.0, 10, "first method paragraph."));
    second.add_block(caption("Figure 1: Architecture.", 320.0, 260.0, 520.0));
    second.add_block(body(320.0, 560.0, 290.0, 10, "second method paragraph."));
    second.add_primitive(stroke(330.0, 100.0, 550.0, 250.0));

    vec![first, second]
}

pub fn white_fill(page: &Page) -> Primitive {
    Primitive::fill(page.bounds(), Color::WHITE)
}
