//! Loading pages from disk and rendering the analyzed document.

mod common;

use std::io::Write;

use common::*;
use paperfig::render::{figures_to_json, to_json, to_markdown, to_text};
use paperfig::{
    extract_document_file, load_pages_file, Document, Error, Figure, JsonFormat, Paperfig,
    RenderOptions,
};

fn write_pages(pages: &[paperfig::Page]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(pages).unwrap().as_bytes())
        .unwrap();
    file
}

#[test]
fn test_pages_survive_a_file_round_trip() {
    let pages = two_column_paper();
    let file = write_pages(&pages);

    let loaded = load_pages_file(file.path()).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].primitives.len(), 1);
    assert!(loaded[0].blocks[1].lines[0].bold);
}

#[test]
fn test_extract_document_file() {
    let file = write_pages(&two_column_paper());
    let doc = extract_document_file(file.path()).unwrap();
    assert_eq!(doc.page_count, 2);
    assert_eq!(doc.figures.len(), 1);
}

#[test]
fn test_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"pages\": 3}").unwrap();
    let err = load_pages_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::PageInput(_)));
}

#[test]
fn test_markdown_output() {
    let doc = Paperfig::new()
        .allow_ocr(false)
        .parse(two_column_paper())
        .unwrap()
        .document;

    let markdown = to_markdown(&doc, &RenderOptions::default()).unwrap();
    assert!(markdown.starts_with("# Abstract\n\nWe study figures in papers."));
    assert!(markdown.contains("\n# 1 Introduction\n"));
    assert!(markdown.contains("\n# 2 Method\n"));
    assert!(markdown.contains("- **Figure 1** (page 2): Architecture."));

    let without_figures = RenderOptions::new().with_figures(false);
    let markdown = to_markdown(&doc, &without_figures).unwrap();
    assert!(!markdown.contains("Architecture"));
}

#[test]
fn test_text_output() {
    let result = Paperfig::new().allow_ocr(false).parse(two_column_paper()).unwrap();
    let text = result.to_text().unwrap();
    assert!(text.starts_with("We study figures in papers.\n\n1 Introduction"));
    assert!(text.ends_with("[Figure 1, page 2] Figure 1: Architecture."));
    assert_eq!(text, to_text(result.document(), &RenderOptions::default()).unwrap());
}

#[test]
fn test_json_output_round_trips() {
    let result = Paperfig::new().allow_ocr(false).parse(two_column_paper()).unwrap();

    let json = to_json(result.document(), JsonFormat::Compact).unwrap();
    let parsed: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(&parsed, result.document());

    let figures = figures_to_json(&result.document().figures, JsonFormat::Pretty).unwrap();
    let parsed: Vec<Figure> = serde_json::from_str(&figures).unwrap();
    assert_eq!(parsed, result.document().figures);
    assert_eq!(result.figures_json(JsonFormat::Pretty).unwrap(), figures);
}
