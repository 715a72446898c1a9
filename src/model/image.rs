//! Raster images pulled out of a PDF.

use serde::{Deserialize, Serialize};

/// A raster image found on a page, re-encoded as PNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Page index (0-based, document order)
    pub page_index: usize,

    /// Image index on that page (0-based, resource order)
    pub image_index: usize,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Source color space (e.g., "DeviceRGB", "Indexed")
    pub color_space: Option<String>,

    /// Source filter (e.g., "DCTDecode"), if any
    pub filter: Option<String>,

    /// PNG-encoded pixels
    #[serde(skip_serializing, default)]
    pub png: Vec<u8>,
}

impl ExtractedImage {
    /// File name for this image: `{base}_page{page}_img{image}.png`.
    pub fn file_name(&self, base_name: &str) -> String {
        image_file_name(base_name, self.page_index, self.image_index)
    }

    /// Size of the PNG data in bytes.
    pub fn size(&self) -> usize {
        self.png.len()
    }
}

/// File name for an extracted image.
pub fn image_file_name(base_name: &str, page_index: usize, image_index: usize) -> String {
    format!("{}_page{}_img{}.png", base_name, page_index, image_index)
}
