//! Web page printing: load a URL in headless Chromium and save it as PDF,
//! optionally passing the result through the margin inserter.
//!
//! Browser control needs the `browser` feature. Options and file naming are
//! always available.

#[cfg(feature = "browser")]
mod browser;
mod filename;
mod options;

use std::path::PathBuf;

use serde::Serialize;

#[cfg(feature = "browser")]
pub use browser::print_url;
pub use filename::{pdf_filename, pdf_filename_now};
pub use options::{Paper, PrintOptions};

/// What a print run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrintOutcome {
    /// The PDF was written
    Saved { filename: String, path: PathBuf },
    /// Printing was disabled; the page was loaded only
    Skipped,
}

impl PrintOutcome {
    /// Path of the saved PDF, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            PrintOutcome::Saved { path, .. } => Some(path),
            PrintOutcome::Skipped => None,
        }
    }
}
