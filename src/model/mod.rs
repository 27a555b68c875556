//! Document model types for figure and section extraction.
//!
//! Input pages ([`Page`]) come from the page-access collaborator; every other
//! type here is produced by the pipeline stages in [`crate::parser`].

mod document;
mod figure;
mod geometry;
mod layout;
mod page;
mod region;

pub use document::{
    Document, DocumentSection, FigureResults, PageFigures, Paragraph, SectionTitle,
};
pub use figure::{
    Caption, CaptionCandidate, FailedCaption, FailureReason, Figure, FigureKind, GraphicsOrigin,
    GraphicsRegion,
};
pub use geometry::BBox;
pub use layout::{Column, DocumentLayout};
pub use page::{BlockKind, Color, LineRef, Page, Primitive, PrimitiveKind, TextBlock, TextLine};
pub use region::{Region, RegionKind};
