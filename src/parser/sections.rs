//! Section and paragraph structure of the running text.
//!
//! Text blocks that are not captions or figure content are turned into
//! [`TextUnit`]s page by page. Units from all pages are then stitched
//! together: paragraphs broken by a column or page change are rejoined
//! ([`ParagraphRebuilder`]) and grouped under the headings that precede them
//! ([`SectionedTextBuilder`]).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{
    BBox, BlockKind, DocumentLayout, DocumentSection, LineRef, Page, Paragraph, SectionTitle,
    TextBlock, TextLine,
};

use super::layout::FontStatistics;
use super::text;

/// Longest bold line still taken for a heading.
const MAX_HEADING_WORDS: usize = 12;

fn numbered_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:(?P<num>\d+(?:\.\d+)*)\.?|[IVX]+\.|[A-Z]\.)\s+\p{L}").unwrap()
    })
}

/// A piece of running text in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum TextUnit {
    Title(SectionTitle),
    Paragraph {
        paragraph: Paragraph,
        /// Offset of the first line from its column's left edge
        indent: f32,
    },
}

/// Running text of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub page: u32,
    /// Text of abstract blocks on this page
    pub abstract_parts: Vec<String>,
    /// Titles and paragraphs in reading order
    pub units: Vec<TextUnit>,
}

/// Lines and areas of a page that belong to figures rather than running text.
#[derive(Debug, Clone, Default)]
pub struct TextExclusions {
    /// Lines consumed by captions
    pub lines: HashSet<LineRef>,
    /// Boxes of matched figures
    pub boxes: Vec<BBox>,
}

impl TextExclusions {
    fn excludes(&self, line_ref: LineRef, line: &TextLine) -> bool {
        if self.lines.contains(&line_ref) {
            return true;
        }
        let (cx, cy) = (line.bbox.center_x(), line.bbox.center_y());
        self.boxes
            .iter()
            .any(|b| cx >= b.x1 && cx <= b.x2 && cy >= b.y1 && cy <= b.y2)
    }
}

/// Recognizes section headings.
#[derive(Debug, Clone)]
pub struct SectionTitleExtractor {
    stats: FontStatistics,
}

impl SectionTitleExtractor {
    pub fn new(stats: FontStatistics) -> Self {
        Self { stats }
    }

    /// Whether a single line looks like a heading.
    pub fn is_heading(&self, line: &TextLine) -> bool {
        let text = line.text.trim();
        if text.is_empty() || line.invisible {
            return false;
        }
        if line.font_size >= self.stats.body_size + 1.0 {
            return true;
        }
        if !line.is_bold() {
            return false;
        }
        let short = line.word_count() <= MAX_HEADING_WORDS && !text.ends_with('.');
        short || numbered_heading_regex().is_match(text)
    }

    /// Heading depth from numbering ("2.1 Method" is 2), else from font size.
    pub fn level(&self, line: &TextLine) -> u8 {
        if let Some(caps) = numbered_heading_regex().captures(&line.text) {
            return match caps.name("num") {
                Some(num) => num.as_str().split('.').count().min(6) as u8,
                None => 1,
            };
        }
        match self.stats.get_heading_level(line.font_size) {
            0 => 1,
            level => level,
        }
    }

    /// Number of leading heading lines among `kept` lines of a block.
    ///
    /// Either every kept line is a heading (the block is a title) or the
    /// heading run at the top of the block is split off.
    fn leading_headings(&self, block: &TextBlock, kept: &[usize]) -> usize {
        kept.iter()
            .take_while(|&&i| self.is_heading(&block.lines[i]))
            .count()
    }

    /// Heading lines of a page, skipping excluded lines.
    pub fn title_lines(&self, page: &Page, exclusions: &TextExclusions) -> HashSet<LineRef> {
        let mut titles = HashSet::new();
        for (b, block) in page.blocks.iter().enumerate() {
            if !block.kind.is_content() {
                continue;
            }
            let kept = kept_lines(b, block, exclusions);
            let n = self.leading_headings(block, &kept);
            titles.extend(kept[..n].iter().map(|&l| LineRef::new(b, l)));
        }
        titles
    }
}

/// Indices of the lines of block `b` that are running text.
fn kept_lines(b: usize, block: &TextBlock, exclusions: &TextExclusions) -> Vec<usize> {
    block
        .lines
        .iter()
        .enumerate()
        .filter(|(l, line)| {
            line.bbox.is_finite()
                && !line.text.trim().is_empty()
                && !exclusions.excludes(LineRef::new(b, *l), line)
        })
        .map(|(l, _)| l)
        .collect()
}

/// Turns pages into text units and the units into sections.
pub struct SectionedTextBuilder<'a> {
    layout: Option<&'a DocumentLayout>,
    titles: &'a SectionTitleExtractor,
}

impl<'a> SectionedTextBuilder<'a> {
    pub fn new(layout: Option<&'a DocumentLayout>, titles: &'a SectionTitleExtractor) -> Self {
        Self { layout, titles }
    }

    /// Split a page's running text into titles and paragraphs.
    pub fn page_text(&self, page: &Page, exclusions: &TextExclusions) -> PageText {
        let mut result = PageText {
            page: page.number,
            ..Default::default()
        };

        let mut blocks: Vec<(usize, usize, BBox)> = page
            .blocks
            .iter()
            .enumerate()
            .filter_map(|(b, block)| block.bbox().map(|bbox| (b, self.column_of(&bbox), bbox)))
            .filter(|(_, _, bbox)| bbox.is_finite())
            .collect();
        blocks.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then(a.2.y1.partial_cmp(&b.2.y1).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.2.x1.partial_cmp(&b.2.x1).unwrap_or(std::cmp::Ordering::Equal))
        });

        for (b, _, _) in blocks {
            let block = &page.blocks[b];
            match block.kind {
                BlockKind::Abstract => {
                    let abstract_text = text::normalize(&text::join_fragments(
                        block.lines.iter().map(|l| l.text.as_str()),
                    ));
                    if !abstract_text.is_empty() {
                        result.abstract_parts.push(abstract_text);
                    }
                }
                BlockKind::Body | BlockKind::Other => {
                    let kept = kept_lines(b, block, exclusions);
                    if kept.is_empty() {
                        continue;
                    }
                    let split = self.titles.leading_headings(block, &kept);
                    let (heading, body) = kept.split_at(split);
                    if !heading.is_empty() {
                        result.units.push(self.title_unit(page.number, block, heading));
                    }
                    if !body.is_empty() {
                        result.units.push(self.paragraph_unit(page.number, block, body));
                    }
                }
                BlockKind::Title | BlockKind::Header | BlockKind::Footer => {}
            }
        }

        result
    }

    fn column_of(&self, bbox: &BBox) -> usize {
        self.layout.map(|l| l.column_of(bbox)).unwrap_or(0)
    }

    fn title_unit(&self, page: u32, block: &TextBlock, lines: &[usize]) -> TextUnit {
        let first = &block.lines[lines[0]];
        let boxes: Vec<BBox> = lines.iter().map(|&i| block.lines[i].bbox).collect();
        let bbox = BBox::union_all(&boxes).unwrap_or(first.bbox);
        TextUnit::Title(SectionTitle {
            text: text::normalize(&text::join_fragments(
                lines.iter().map(|&i| block.lines[i].text.as_str()),
            )),
            page,
            column: self.column_of(&bbox),
            bbox,
            level: self.titles.level(first),
        })
    }

    fn paragraph_unit(&self, page: u32, block: &TextBlock, lines: &[usize]) -> TextUnit {
        let first = &block.lines[lines[0]];
        let boxes: Vec<BBox> = lines.iter().map(|&i| block.lines[i].bbox).collect();
        let bbox = BBox::union_all(&boxes).unwrap_or(first.bbox);
        let column = self.column_of(&bbox);
        let indent = self
            .layout
            .and_then(|l| l.column(column))
            .map(|c| first.bbox.x1 - c.left)
            .unwrap_or(0.0);

        let content = text::normalize(&text::join_fragments(
            lines.iter().map(|&i| block.lines[i].text.as_str()),
        ));
        TextUnit::Paragraph {
            paragraph: Paragraph::new(content, page, column, bbox),
            indent,
        }
    }

    /// Group units into sections. Paragraphs before the first title form an
    /// untitled section.
    pub fn build(units: Vec<TextUnit>) -> Vec<DocumentSection> {
        let mut sections: Vec<DocumentSection> = Vec::new();
        for unit in units {
            match unit {
                TextUnit::Title(title) => {
                    sections.push(DocumentSection::titled(title.text, title.level));
                }
                TextUnit::Paragraph { paragraph, .. } => {
                    if sections.is_empty() {
                        sections.push(DocumentSection::new(None));
                    }
                    if let Some(current) = sections.last_mut() {
                        current.add_paragraph(paragraph.text, paragraph.page);
                    }
                }
            }
        }
        sections
    }
}

/// Rejoins paragraphs split by column and page breaks.
pub struct ParagraphRebuilder<'a> {
    layout: &'a DocumentLayout,
    indent_tolerance: f32,
}

impl<'a> ParagraphRebuilder<'a> {
    pub fn new(layout: &'a DocumentLayout, indent_factor: f32) -> Self {
        Self {
            layout,
            indent_tolerance: layout.scaled(indent_factor),
        }
    }

    /// Merge each paragraph into its predecessor when it continues it.
    pub fn rebuild(&self, units: Vec<TextUnit>) -> Vec<TextUnit> {
        let mut out: Vec<TextUnit> = Vec::with_capacity(units.len());
        let mut merged = 0usize;

        for unit in units {
            if let (
                Some(TextUnit::Paragraph { paragraph: prev, .. }),
                TextUnit::Paragraph { paragraph: next, indent },
            ) = (out.last_mut(), &unit)
            {
                if self.continues(prev, next, *indent) {
                    text::append_fragment(&mut prev.text, &next.text);
                    prev.end_bbox = next.end_bbox;
                    prev.end_page = next.end_page;
                    prev.end_column = next.end_column;
                    merged += 1;
                    continue;
                }
            }
            out.push(unit);
        }

        if merged > 0 {
            log::debug!("ParagraphRebuilder: joined {} split paragraph(s)", merged);
        }
        out
    }

    fn continues(&self, prev: &Paragraph, next: &Paragraph, indent: f32) -> bool {
        let moved = next.page != prev.end_page || next.column != prev.end_column;
        moved
            && !text::ends_sentence(&prev.text)
            && indent.abs() <= self.indent_tolerance
            && self.layout.column(next.column).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn stats() -> FontStatistics {
        let mut stats = FontStatistics::default();
        stats.add_size(10.0, 1000);
        stats.add_size(14.0, 20);
        stats.analyze();
        stats
    }

    fn line(text: &str, x1: f32, y: f32, x2: f32) -> TextLine {
        TextLine::new(text, BBox::new(x1, y, x2, y + 10.0), 10.0)
    }

    fn two_columns() -> DocumentLayout {
        DocumentLayout::new(
            12.0,
            vec![Column::new(50.0, 290.0, 0), Column::new(320.0, 560.0, 1)],
            10.0,
        )
    }

    #[test]
    fn test_heading_rules() {
        let titles = SectionTitleExtractor::new(stats());

        let large = TextLine::new("Introduction", BBox::new(50.0, 0.0, 150.0, 14.0), 14.0);
        assert!(titles.is_heading(&large));

        let bold = line("2.1 Training Setup", 50.0, 0.0, 200.0).with_bold();
        assert!(titles.is_heading(&bold));
        assert_eq!(titles.level(&bold), 2);

        let bold_sentence = line("Proof.", 50.0, 0.0, 100.0).with_bold();
        assert!(!titles.is_heading(&bold_sentence));

        let numbered_long = line(
            "3 A heading that runs on for quite a few words before it stops.",
            50.0,
            0.0,
            500.0,
        )
        .with_font("Times-Bold");
        assert!(titles.is_heading(&numbered_long));
        assert_eq!(titles.level(&numbered_long), 1);

        assert!(!titles.is_heading(&line("plain body text", 50.0, 0.0, 200.0)));
    }

    #[test]
    fn test_heading_split_from_block() {
        let titles = SectionTitleExtractor::new(stats());
        let layout = DocumentLayout::single_column(12.0, 50.0, 560.0, 10.0);
        let builder = SectionedTextBuilder::new(Some(&layout), &titles);

        let mut page = Page::letter(0);
        page.add_block(TextBlock::body(vec![
            line("1 Introduction", 50.0, 100.0, 150.0).with_bold(),
            line("Scientific papers contain", 50.0, 112.0, 500.0),
            line("many figures.", 50.0, 124.0, 300.0),
        ]));

        let text = builder.page_text(&page, &TextExclusions::default());
        assert_eq!(text.units.len(), 2);
        match &text.units[0] {
            TextUnit::Title(t) => {
                assert_eq!(t.text, "1 Introduction");
                assert_eq!(t.level, 1);
            }
            other => panic!("expected title, got {:?}", other),
        }

        let sections = SectionedTextBuilder::build(text.units);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("1 Introduction"));
        assert_eq!(
            sections[0].paragraphs,
            vec![("Scientific papers contain many figures.".to_string(), 0)]
        );
    }

    #[test]
    fn test_exclusions_and_block_kinds() {
        let titles = SectionTitleExtractor::new(stats());
        let builder = SectionedTextBuilder::new(None, &titles);

        let mut page = Page::letter(0);
        page.add_block(TextBlock::new(
            BlockKind::Header,
            vec![line("Running header", 50.0, 20.0, 300.0)],
        ));
        page.add_block(TextBlock::new(
            BlockKind::Abstract,
            vec![line("We present a method.", 50.0, 60.0, 500.0)],
        ));
        page.add_block(TextBlock::body(vec![line("Figure 1: A caption.", 50.0, 400.0, 300.0)]));
        page.add_block(TextBlock::body(vec![line("tick label", 120.0, 200.0, 160.0)]));
        page.add_block(TextBlock::body(vec![line("Remaining body.", 50.0, 500.0, 300.0)]));

        let mut exclusions = TextExclusions::default();
        exclusions.lines.insert(LineRef::new(2, 0));
        exclusions.boxes.push(BBox::new(100.0, 150.0, 400.0, 380.0));

        let text = builder.page_text(&page, &exclusions);
        assert_eq!(text.abstract_parts, vec!["We present a method.".to_string()]);

        let sections = SectionedTextBuilder::build(text.units);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].title.is_none());
        assert_eq!(sections[0].plain_text(), "Remaining body.");
    }

    #[test]
    fn test_rebuild_across_columns_and_pages() {
        let layout = two_columns();
        let rebuilder = ParagraphRebuilder::new(&layout, 1.0);

        let para = |text: &str, page: u32, column: usize, indent: f32| TextUnit::Paragraph {
            paragraph: Paragraph::new(text, page, column, BBox::new(0.0, 0.0, 1.0, 1.0)),
            indent,
        };

        let units = vec![
            para("The method is de-", 0, 0, 0.0),
            para("scribed next and", 0, 1, 0.0),
            para("continues on the next page.", 1, 0, 0.0),
            // Previous paragraph ended its sentence
            para("A new paragraph starts", 1, 1, 0.0),
            para("Indented start.", 2, 0, 15.0),
        ];

        let rebuilt = rebuilder.rebuild(units);
        let texts: Vec<&str> = rebuilt
            .iter()
            .filter_map(|u| match u {
                TextUnit::Paragraph { paragraph, .. } => Some(paragraph.text.as_str()),
                TextUnit::Title(_) => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                "The method is described next and continues on the next page.",
                "A new paragraph starts",
                "Indented start.",
            ]
        );

        if let TextUnit::Paragraph { paragraph, .. } = &rebuilt[0] {
            assert_eq!(paragraph.page, 0);
            assert_eq!(paragraph.end_page, 1);
            assert_eq!(paragraph.end_column, 0);
        }
    }

    #[test]
    fn test_same_column_paragraphs_not_merged() {
        let layout = two_columns();
        let rebuilder = ParagraphRebuilder::new(&layout, 1.0);
        let units = vec![
            TextUnit::Paragraph {
                paragraph: Paragraph::new("no period", 0, 0, BBox::new(50.0, 100.0, 290.0, 110.0)),
                indent: 0.0,
            },
            TextUnit::Paragraph {
                paragraph: Paragraph::new("next block", 0, 0, BBox::new(50.0, 130.0, 290.0, 140.0)),
                indent: 0.0,
            },
        ];
        assert_eq!(rebuilder.rebuild(units).len(), 2);
    }

    #[test]
    fn test_title_blocks_start_sections() {
        let titles = SectionTitleExtractor::new(stats());
        let builder = SectionedTextBuilder::new(None, &titles);
        let heading = |text: &str, level: u8| {
            TextUnit::Title(SectionTitle {
                text: text.to_string(),
                page: 0,
                column: 0,
                bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
                level,
            })
        };
        let para = |text: &str| TextUnit::Paragraph {
            paragraph: Paragraph::new(text, 0, 0, BBox::new(0.0, 0.0, 1.0, 1.0)),
            indent: 0.0,
        };

        let sections = SectionedTextBuilder::build(vec![
            para("Preamble."),
            heading("1 Intro", 1),
            para("One."),
            heading("1.1 Detail", 2),
            para("Two."),
        ]);
        assert_eq!(sections.len(), 3);
        assert!(sections[0].title.is_none());
        assert_eq!(sections[0].level, 0);
        assert_eq!(sections[2].title.as_deref(), Some("1.1 Detail"));
        assert_eq!(sections[2].level, 2);
    }
}
