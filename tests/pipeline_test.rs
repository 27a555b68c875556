//! End-to-end tests of the extraction pipeline.

mod common;

use common::*;
use paperfig::model::{BBox, Page, Primitive};
use paperfig::{
    CancellationToken, Error, FailureReason, FigureExtractor, FigureKind, PageSelection,
    ParseOptions,
};

fn options() -> ParseOptions {
    ParseOptions::default().with_allow_ocr(false)
}

fn extractor() -> FigureExtractor {
    FigureExtractor::new(options())
}

#[test]
fn test_caption_matches_graphic_above() {
    let results = extractor()
        .extract_figures_with_failures(vec![figure_page(0)])
        .unwrap();

    assert_eq!(results.figures.len(), 1);
    assert!(results.failed_captions.is_empty());

    let figure = &results.figures[0];
    assert_eq!(figure.kind, FigureKind::Figure);
    assert_eq!(figure.number, Some(1));
    assert_eq!(figure.caption, "Figure 1: Results.");
    assert_eq!(figure.bbox, BBox::new(100.0, 100.0, 400.0, 380.0));
    assert_eq!(figure.regions, vec![figure.bbox]);
}

#[test]
fn test_two_captions_one_graphic() {
    let mut page = single_column_page(0);
    page.add_block(caption("Figure 1: First plot.", 50.0, 200.0, 300.0));
    page.add_block(caption("Figure 2: Second plot.", 50.0, 205.0, 300.0));
    page.add_primitive(stroke(100.0, 100.0, 400.0, 190.0));

    let results = extractor().extract_figures_with_failures(vec![page]).unwrap();

    assert_eq!(results.figures.len(), 1);
    assert_eq!(results.figures[0].number, Some(1));
    assert_eq!(results.failed_captions.len(), 1);
    assert_eq!(results.failed_captions[0].number, Some(2));
    assert_eq!(
        results.failed_captions[0].reason,
        FailureReason::OverlapsCaption
    );
}

#[test]
fn test_every_caption_reported_once() {
    let mut pages = vec![figure_page(0), single_column_page(1)];
    pages[1].add_block(caption("Table 3: Unmatched.", 50.0, 100.0, 300.0));

    let results = extractor().extract_figures_with_failures(pages).unwrap();
    assert_eq!(results.figures.len(), 1);
    assert_eq!(results.failed_captions.len(), 1);
    assert_eq!(results.failed_captions[0].page, 1);
    assert_eq!(results.failed_captions[0].kind, FigureKind::Table);
}

#[test]
fn test_white_fill_is_not_a_figure() {
    let mut page = single_column_page(0);
    page.add_block(caption("Figure 1: Blank.", 50.0, 400.0, 300.0));
    let fill = white_fill(&page);
    page.add_primitive(fill);

    let results = extractor()
        .extract_figures_with_failures(vec![page.clone()])
        .unwrap();
    assert!(results.figures.is_empty());
    assert_eq!(results.failed_captions.len(), 1);
    assert_eq!(
        results.failed_captions[0].reason,
        FailureReason::NoGraphicMatched
    );

    // Kept, the fill covers the whole page and is treated as background
    let keep = FigureExtractor::new(options().with_ignore_white_graphics(false));
    let results = keep.extract_figures_with_failures(vec![page]).unwrap();
    assert!(results.figures.is_empty());
    assert_eq!(results.failed_captions.len(), 1);
}

#[test]
fn test_scanned_page_requires_ocr() {
    let mut scanned = Page::letter(2);
    scanned.add_primitive(Primitive::image(scanned.bounds()));
    let pages = vec![figure_page(0), single_column_page(1), scanned];

    let err = extractor().extract_document(pages.clone()).unwrap_err();
    assert!(matches!(err, Error::OcrDisallowed { page: 2 }));

    let allowed = FigureExtractor::new(options().with_allow_ocr(true));
    let doc = allowed.extract_document(pages).unwrap();
    assert_eq!(doc.page_count, 3);
    assert_eq!(doc.figures.len(), 1);
}

#[test]
fn test_page_numbering_violations() {
    let gap = vec![single_column_page(0), single_column_page(2)];
    assert!(matches!(
        extractor().extract_figures(gap),
        Err(Error::PageNumbering(_))
    ));

    let duplicate = vec![single_column_page(0), single_column_page(0)];
    assert!(matches!(
        extractor().extract_figures(duplicate),
        Err(Error::PageNumbering(_))
    ));

    let unsorted = vec![single_column_page(1), figure_page(0)];
    let figures = extractor().extract_figures(unsorted).unwrap();
    assert_eq!(figures.len(), 1);
    assert_eq!(figures[0].page, 0);
}

#[test]
fn test_cancellation() {
    let token = CancellationToken::new();
    let extractor = extractor().with_cancellation(token.clone());
    assert!(extractor.extract_figures(vec![figure_page(0)]).is_ok());

    token.cancel();
    let err = extractor.extract_figures(vec![figure_page(0)]).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_two_column_document() {
    let doc = extractor().extract_document(two_column_paper()).unwrap();

    let layout = doc.layout.as_ref().unwrap();
    assert_eq!(layout.columns.len(), 2);
    assert_eq!(layout.median_line_spacing, SPACING);

    assert_eq!(doc.abstract_text.as_deref(), Some("We study figures in papers."));

    assert_eq!(doc.figures.len(), 1);
    assert_eq!(doc.figures[0].page, 1);
    assert_eq!(doc.figures[0].caption, "Figure 1: Architecture.");
    assert!(doc.failed_captions.is_empty());

    assert_eq!(doc.sections.len(), 2);
    let intro = &doc.sections[0];
    assert_eq!(intro.title.as_deref(), Some("1 Introduction"));
    assert_eq!(intro.level, 1);
    // The left column paragraph continues in the right column
    assert_eq!(intro.paragraphs.len(), 1);
    assert!(intro.paragraphs[0].0.contains("continues running text"));
    assert!(intro.paragraphs[0].0.ends_with("and ends here."));

    let method = &doc.sections[1];
    assert_eq!(method.title.as_deref(), Some("2 Method"));
    assert_eq!(method.paragraphs.len(), 2);
    assert!(method.paragraphs.iter().all(|(text, page)| {
        *page == 1 && !text.contains("Architecture")
    }));
}

#[test]
fn test_without_paragraph_rebuild() {
    let extractor = FigureExtractor::new(options().with_rebuild_paragraphs(false));
    let doc = extractor.extract_document(two_column_paper()).unwrap();
    assert_eq!(doc.sections[0].paragraphs.len(), 2);
}

#[test]
fn test_page_selection_limits_figures() {
    let extractor = FigureExtractor::new(options().with_pages(PageSelection::Pages(vec![0])));
    let doc = extractor.extract_document(two_column_paper()).unwrap();
    assert!(doc.figures.is_empty());
    assert!(doc.failed_captions.is_empty());
    // Sections still cover every page
    assert_eq!(doc.sections.len(), 2);
}

#[test]
fn test_section_titles_first() {
    let mut page = single_column_page(0);
    page.add_block(heading("Table 1: Summary of Results", 50.0, 100.0));
    for row in table_rows(120.0, 3) {
        page.add_block(row);
    }

    let doc = extractor().extract_document(vec![page.clone()]).unwrap();
    assert_eq!(doc.figures.len(), 1);
    assert_eq!(doc.figures[0].kind, FigureKind::Table);
    assert_eq!(doc.figures[0].bbox, BBox::new(50.0, 120.0, 420.0, 154.0));

    let titles_first = FigureExtractor::new(options().with_section_titles_first(true));
    let doc = titles_first.extract_document(vec![page]).unwrap();
    assert!(doc.figures.is_empty());
    assert_eq!(
        doc.sections[0].title.as_deref(),
        Some("Table 1: Summary of Results")
    );
}

#[test]
fn test_table_caption_keeps_following_prose() {
    let mut page = Page::letter(0);
    page.add_block(body(50.0, 560.0, 100.0, 12, "the introduction ends."));
    page.add_block(caption("Table 1: Results of all runs.", 50.0, 400.0, 300.0));
    page.add_block(body(50.0, 560.0, 430.0, 12, "the results paragraph ends."));

    let doc = extractor().extract_document(vec![page]).unwrap();
    assert!(doc.figures.is_empty());
    assert_eq!(doc.failed_captions.len(), 1);
    assert_eq!(doc.failed_captions[0].reason, FailureReason::NoGraphicMatched);

    let text: Vec<&str> = doc
        .sections
        .iter()
        .flat_map(|s| s.paragraphs.iter().map(|(t, _)| t.as_str()))
        .collect();
    assert!(text.iter().any(|t| t.contains("the results paragraph ends.")));
    assert!(text.iter().all(|t| !t.contains("Results of all runs")));
}

#[test]
fn test_off_page_line_is_harmless() {
    let mut page = single_column_page(0);
    page.add_block(paperfig::model::TextBlock::body(vec![line(
        "hidden text",
        50.0,
        100.0,
        5.0e9,
    )]));

    let doc = extractor().extract_document(vec![page]).unwrap();
    let layout = doc.layout.as_ref().unwrap();
    assert_eq!(layout.columns.len(), 1);
    assert_eq!(layout.columns[0].right, 612.0);
}

#[test]
fn test_parallel_matches_sequential() {
    let pages = vec![figure_page(0), single_column_page(1), figure_page(2)];

    let parallel = extractor().extract_document(pages.clone()).unwrap();
    let sequential = FigureExtractor::new(options().sequential())
        .extract_document(pages)
        .unwrap();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.figures.len(), 2);
}

#[test]
fn test_sparse_text_skips_figures() {
    let mut page = Page::letter(0);
    page.add_block(caption("Figure 1: Lonely.", 50.0, 400.0, 300.0));
    page.add_primitive(stroke(100.0, 100.0, 400.0, 380.0));

    let doc = extractor().extract_document(vec![page]).unwrap();
    assert!(doc.layout.is_none());
    assert!(doc.figures.is_empty());
    assert!(doc.failed_captions.is_empty());
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].paragraphs[0].0, "Figure 1: Lonely.");
}
