//! Figure, caption and section extraction stages.
//!
//! [`FigureExtractor`] runs the stages in order; each stage is also usable on
//! its own.

mod cancel;
mod caption_builder;
mod captions;
mod diagnostics;
mod figures;
mod graphics;
mod layout;
mod options;
mod pipeline;
mod regions;
mod sections;
pub mod text;

pub use cancel::CancellationToken;
pub use caption_builder::{BuiltCaptions, CaptionBuilder};
pub use captions::{group_by_page, match_caption_label, CaptionDetector, CaptionLabel};
pub use diagnostics::{DiagnosticLogger, LogDiagnostics, NoDiagnostics};
pub use figures::{FigureDetector, MatchedFigures};
pub use graphics::{cluster_regions, GraphicsExtractor};
pub use layout::{median, order_lines, FontStatistics, LayoutEstimator, OrderedLine};
pub use options::{PageSelection, ParseOptions, Thresholds, ALLOW_OCR_ENV};
pub use pipeline::FigureExtractor;
pub use regions::RegionClassifier;
pub use sections::{
    PageText, ParagraphRebuilder, SectionTitleExtractor, SectionedTextBuilder, TextExclusions,
    TextUnit,
};
