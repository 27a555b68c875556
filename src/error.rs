//! Error types for paperfig library.

use std::io;
use thiserror::Error;

/// Result type alias for paperfig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that abort a document parse.
///
/// Expected per-page outcomes (a caption without a matching graphic, a
/// document too sparse to calibrate) are data, not errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Page input could not be decoded.
    #[error("Invalid page input: {0}")]
    PageInput(String),

    /// A page holds only a scanned image and OCR pages are not allowed.
    #[error("Page {page} is an image-only (OCR) page and OCR is disallowed")]
    OcrDisallowed {
        /// Offending page (0-indexed)
        page: u32,
    },

    /// Page numbers are not contiguous from 0.
    #[error("Page numbering violated: {0}")]
    PageNumbering(String),

    /// The caller cancelled the parse.
    #[error("Parse cancelled")]
    Cancelled,

    /// Invalid page range string.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::PageInput(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OcrDisallowed { page: 3 };
        assert_eq!(
            err.to_string(),
            "Page 3 is an image-only (OCR) page and OCR is disallowed"
        );

        let err = Error::Cancelled;
        assert_eq!(err.to_string(), "Parse cancelled");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("[1, 2").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::PageInput(_)));
    }
}
