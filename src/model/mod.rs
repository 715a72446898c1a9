//! Plain data types shared by the margin inserter and the image extractor.

mod image;
mod page;

pub use image::{image_file_name, ExtractedImage};
pub use page::{Matrix, PageGeometry, Rect, Rotation};
