//! PDF loading and page attribute resolution.

mod backend;
mod options;

pub(crate) use backend::decode_stream;
pub use backend::{PageId, SourceDocument};
pub use options::{ErrorMode, PageSelection};
