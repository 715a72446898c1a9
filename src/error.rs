//! Error types for pdfyard.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfyard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while transforming or extracting PDFs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The source document could not be read or parsed.
    #[error("Cannot open PDF: {0}")]
    Open(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Low-level object access failed.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A page could not be re-rendered into its enlarged canvas.
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    /// The destination could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Margin must be finite and non-negative.
    #[error("Invalid margin: {0}")]
    InvalidMargin(f32),

    /// An embedded image could not be decoded.
    #[error("Cannot decode image {image} on page {page}: {message}")]
    ImageDecode {
        page: usize,
        image: usize,
        message: String,
    },

    /// PNG encoding failed.
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Headless printing failed.
    #[error("Print failed: {0}")]
    Print(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a render error for the given 0-based page index.
    pub fn render(page: usize, message: impl Into<String>) -> Self {
        Error::Render {
            page,
            message: message.into(),
        }
    }

    /// Build a write error for the given destination.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageEncode(err.to_string())
    }
}
