//! Rendering options and configuration.

/// Options for rendering an analyzed document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit the abstract ahead of the first section
    pub include_abstract: bool,

    /// Emit the list of matched figures and tables
    pub include_figures: bool,

    /// Emit captions that found no figure
    pub include_failed_captions: bool,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Prefix each paragraph with its page number (plain text only)
    pub page_markers: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the abstract.
    pub fn with_abstract(mut self, include: bool) -> Self {
        self.include_abstract = include;
        self
    }

    /// Enable or disable the figure list.
    pub fn with_figures(mut self, include: bool) -> Self {
        self.include_figures = include;
        self
    }

    /// Enable or disable failed caption reporting.
    pub fn with_failed_captions(mut self, include: bool) -> Self {
        self.include_failed_captions = include;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    pub fn with_page_markers(mut self, markers: bool) -> Self {
        self.page_markers = markers;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_abstract: true,
            include_figures: true,
            include_failed_captions: false,
            max_heading_level: 6,
            escape_special_chars: true,
            page_markers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert!(options.include_abstract);
        assert!(options.include_figures);
        assert!(!options.include_failed_captions);
        assert_eq!(options.max_heading_level, 6);
    }

    #[test]
    fn test_max_heading_clamped() {
        assert_eq!(RenderOptions::new().with_max_heading(0).max_heading_level, 1);
        assert_eq!(RenderOptions::new().with_max_heading(9).max_heading_level, 6);
        assert_eq!(RenderOptions::new().with_max_heading(3).max_heading_level, 3);
    }
}
