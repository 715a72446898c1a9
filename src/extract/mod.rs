//! Image extraction: find every raster image in a PDF and save it as PNG.
//!
//! ```no_run
//! use pdfyard::extract::{upload_base_name, write_images, ExtractOptions, ImageExtractor};
//!
//! let data = std::fs::read("scan.pdf")?;
//! let images = ImageExtractor::new(ExtractOptions::default()).extract_bytes(&data)?;
//! let names = write_images(&images, "uploads", &upload_base_name("scan.pdf", &data))?;
//! println!("{:?}", names);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decode;
mod extractor;
mod naming;
mod options;

pub use extractor::{write_images, ImageExtractor};
pub use naming::{content_hash, sanitize_stem, upload_base_name, HASH_PREFIX_LEN};
pub use options::ExtractOptions;
