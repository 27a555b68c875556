//! Diagnostic hooks into the per-page stages.
//!
//! A [`DiagnosticLogger`] sees the intermediate results of every page
//! (graphics regions, captions, classified regions, matched figures). It is
//! a side channel only: nothing it does changes the parse.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use paperfig::model::GraphicsRegion;
//! use paperfig::parser::DiagnosticLogger;
//!
//! #[derive(Default)]
//! struct GraphicsCounter(AtomicUsize);
//!
//! impl DiagnosticLogger for GraphicsCounter {
//!     fn log_graphics(&self, _page: u32, regions: &[GraphicsRegion]) {
//!         self.0.fetch_add(regions.len(), Ordering::Relaxed);
//!     }
//! }
//! ```

use crate::model::{Caption, FailedCaption, Figure, GraphicsRegion, Region};

/// Receives intermediate per-page results.
///
/// Pages may be processed in parallel, so implementations must be
/// thread-safe. All methods do nothing by default.
pub trait DiagnosticLogger: Send + Sync {
    /// Called with the clustered graphics of a page.
    fn log_graphics(&self, page: u32, regions: &[GraphicsRegion]) {
        let _ = (page, regions);
    }

    /// Called with the captions built on a page and the candidates that
    /// could not be built.
    fn log_captions(&self, page: u32, captions: &[Caption], failed: &[FailedCaption]) {
        let _ = (page, captions, failed);
    }

    /// Called with the classified regions of a page.
    fn log_regions(&self, page: u32, regions: &[Region]) {
        let _ = (page, regions);
    }

    /// Called with the figures matched on a page and the captions left
    /// unmatched.
    fn log_figures(&self, page: u32, figures: &[Figure], failed: &[FailedCaption]) {
        let _ = (page, figures, failed);
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticLogger for NoDiagnostics {}

/// Forwards diagnostics to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticLogger for LogDiagnostics {
    fn log_graphics(&self, page: u32, regions: &[GraphicsRegion]) {
        for r in regions {
            log::debug!(
                "page {}: graphic {:?} at ({:.1}, {:.1}, {:.1}, {:.1}){}",
                page,
                r.origin,
                r.bbox.x1,
                r.bbox.y1,
                r.bbox.x2,
                r.bbox.y2,
                if r.is_likely_background {
                    " [background]"
                } else {
                    ""
                }
            );
        }
    }

    fn log_captions(&self, page: u32, captions: &[Caption], failed: &[FailedCaption]) {
        for c in captions {
            log::debug!(
                "page {}: caption '{}' ({} line(s))",
                page,
                c.candidate.name(),
                c.lines.len()
            );
        }
        for f in failed {
            log::debug!("page {}: caption '{}' not built: {:?}", page, f.label, f.reason);
        }
    }

    fn log_regions(&self, page: u32, regions: &[Region]) {
        log::debug!("page {}: {} region(s)", page, regions.len());
    }

    fn log_figures(&self, page: u32, figures: &[Figure], failed: &[FailedCaption]) {
        for f in figures {
            log::debug!(
                "page {}: {} matched {} region(s)",
                page,
                f.name(),
                f.regions.len()
            );
        }
        for f in failed {
            log::debug!("page {}: '{}' unmatched", page, f.label);
        }
    }
}
