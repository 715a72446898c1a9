//! Margin insertion: enlarge every page and center the original content.
//!
//! # Example
//!
//! ```no_run
//! use pdfyard::margin::{MarginInserter, MarginOptions};
//!
//! let inserter = MarginInserter::new(MarginOptions::new().with_margin_px(15.0));
//! let report = inserter.insert_file("in.pdf", "out.pdf")?;
//! for page in &report.pages {
//!     println!("page {}: {}x{}", page.index, page.width, page.height);
//! }
//! # Ok::<(), pdfyard::Error>(())
//! ```

mod inserter;
mod options;

pub use inserter::{MarginInserter, MarginReport, PageReport};
pub use options::{Margin, MarginOptions, DEFAULT_MARGIN_PX, PX_TO_PT};
