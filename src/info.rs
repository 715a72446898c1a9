//! Document summary used by `pdfyard info`.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::extract::ImageExtractor;
use crate::parser::SourceDocument;

/// Size and orientation of one page as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Clockwise display rotation in degrees
    pub rotation: u16,
}

/// A quick look at a PDF.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub version: String,
    pub page_count: usize,
    pub pages: Vec<PageInfo>,
    pub image_count: usize,
}

impl DocumentInfo {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = SourceDocument::open(path)?;
        Self::from_document(&doc)
    }

    pub fn from_document(doc: &SourceDocument) -> Result<Self> {
        let pages = doc
            .pages()
            .into_iter()
            .map(|(index, page_id)| {
                let geometry = doc.page_geometry(page_id)?;
                Ok(PageInfo {
                    index,
                    width: geometry.width(),
                    height: geometry.height(),
                    rotation: geometry.rotation.degrees(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: doc.version(),
            page_count: pages.len(),
            pages,
            image_count: ImageExtractor::default().count(doc),
        })
    }
}
