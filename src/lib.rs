//! # pdfyard
//!
//! PDF page tooling for Rust.
//!
//! The core operation enlarges every page of a PDF by a fixed margin and
//! draws the original content, unscaled, in the middle of the new page. The
//! crate also pulls embedded raster images out of a PDF as PNG files, and
//! (with the `browser` feature) prints web pages to PDF through headless
//! Chromium.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfyard::insert_margins;
//!
//! fn main() -> pdfyard::Result<()> {
//!     // 15px on every side: an A4 page grows from 595x842 to 617.5x864.5 pt
//!     let report = insert_margins("input.pdf", "output.pdf", 15.0)?;
//!     println!("{} pages", report.page_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Vector-preserving margins**: pages are wrapped, never rasterized
//! - **Image extraction**: JPEG and raw samples re-encoded as PNG
//! - **Atomic output**: files are written to a temporary name and renamed
//! - **Parallel processing**: uses Rayon for multi-page documents
//! - **Web printing**: optional headless Chromium (`browser` feature)

pub mod detect;
pub mod error;
pub mod extract;
pub mod info;
pub mod margin;
pub mod model;
pub mod output;
pub mod parser;
pub mod print;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{upload_base_name, write_images, ExtractOptions, ImageExtractor};
pub use info::{DocumentInfo, PageInfo};
pub use margin::{Margin, MarginInserter, MarginOptions, MarginReport, PageReport};
pub use model::{ExtractedImage, Matrix, PageGeometry, Rect, Rotation};
pub use parser::{ErrorMode, PageId, PageSelection, SourceDocument};
pub use print::{PrintOptions, PrintOutcome};

#[cfg(feature = "browser")]
pub use print::print_url;

use std::path::Path;

/// Add a margin of `margin_px` pixels to every page of `source` and write
/// the result to `dest`.
///
/// # Example
///
/// ```no_run
/// use pdfyard::insert_margins;
///
/// let report = insert_margins("in.pdf", "out.pdf", 15.0).unwrap();
/// assert_eq!(report.margin_pt, 11.25);
/// ```
pub fn insert_margins<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    margin_px: f32,
) -> Result<MarginReport> {
    MarginInserter::new(MarginOptions::new().with_margin_px(margin_px)).insert_file(source, dest)
}

/// Add a margin to an in-memory PDF and return the new bytes.
pub fn insert_margins_bytes(data: &[u8], margin_px: f32) -> Result<Vec<u8>> {
    MarginInserter::new(MarginOptions::new().with_margin_px(margin_px)).insert_bytes(data)
}

/// Extract all raster images from PDF bytes with default options.
///
/// # Example
///
/// ```no_run
/// use pdfyard::extract_images;
///
/// let data = std::fs::read("scan.pdf").unwrap();
/// for image in extract_images(&data).unwrap() {
///     println!("{}: {}x{}", image.file_name("scan"), image.width, image.height);
/// }
/// ```
pub fn extract_images(data: &[u8]) -> Result<Vec<ExtractedImage>> {
    ImageExtractor::default().extract_bytes(data)
}

/// Extract all raster images from a PDF file with default options.
pub fn extract_images_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<ExtractedImage>> {
    ImageExtractor::default().extract_file(path)
}
