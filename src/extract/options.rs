//! Image extraction options.

use crate::parser::{ErrorMode, PageSelection};

/// Options for [`ImageExtractor`](super::ImageExtractor).
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// What to do with images that cannot be decoded
    pub error_mode: ErrorMode,

    /// Pages to search (1-indexed)
    pub pages: PageSelection,

    /// Decode and encode images on the rayon pool
    pub parallel: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            pages: PageSelection::All,
            parallel: true,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first image that cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Skip undecodable images with a warning (default).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
