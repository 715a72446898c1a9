//! Raster image extraction.

use std::collections::HashSet;
use std::path::Path;

use lopdf::{Dictionary, Object, ObjectId};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::ExtractedImage;
use crate::output::write_atomic;
use crate::parser::{ErrorMode, SourceDocument};

use super::decode::{encode_png, ImageSource};
use super::options::ExtractOptions;

/// Form XObjects nested deeper than this are not searched.
const MAX_FORM_DEPTH: usize = 16;

/// An image found while walking page resources.
struct Candidate {
    page_index: usize,
    image_index: usize,
    source: std::result::Result<ImageSource, String>,
}

/// Pulls raster images out of a PDF and re-encodes them as PNG.
#[derive(Debug, Clone, Default)]
pub struct ImageExtractor {
    options: ExtractOptions,
}

impl ImageExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract images from a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ExtractedImage>> {
        let doc = SourceDocument::open(path)?;
        self.extract(&doc)
    }

    /// Extract images from PDF bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Vec<ExtractedImage>> {
        let doc = SourceDocument::from_bytes(data)?;
        self.extract(&doc)
    }

    /// Number of images on the selected pages, without decoding them.
    pub fn count(&self, doc: &SourceDocument) -> usize {
        self.candidates(doc).len()
    }

    /// Extract images from an open document, in page then resource order.
    pub fn extract(&self, doc: &SourceDocument) -> Result<Vec<ExtractedImage>> {
        let candidates = self.candidates(doc);

        let decoded: Vec<Option<ExtractedImage>> = if self.options.parallel {
            candidates
                .into_par_iter()
                .map(|c| self.finish(c))
                .collect::<Result<_>>()?
        } else {
            candidates
                .into_iter()
                .map(|c| self.finish(c))
                .collect::<Result<_>>()?
        };

        let images: Vec<ExtractedImage> = decoded.into_iter().flatten().collect();
        log::info!("extracted {} images", images.len());
        Ok(images)
    }

    fn candidates(&self, doc: &SourceDocument) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (page_index, page_id) in doc.pages() {
            if !self.options.pages.includes_index(page_index) {
                continue;
            }
            let mut walker = PageWalker {
                doc,
                page_index,
                seen: HashSet::new(),
                found: Vec::new(),
            };
            if let Some(resources) = doc.page_resources(page_id) {
                walker.walk_resources(resources, 0);
            }
            log::debug!("page {}: {} images", page_index, walker.found.len());
            candidates.append(&mut walker.found);
        }
        candidates
    }

    /// Decode one candidate, applying the error mode.
    fn finish(&self, candidate: Candidate) -> Result<Option<ExtractedImage>> {
        let Candidate {
            page_index,
            image_index,
            source,
        } = candidate;

        let converted = source.and_then(|source| {
            let image = source.decode()?;
            let png = encode_png(&image).map_err(|e| e.to_string())?;
            Ok(ExtractedImage {
                page_index,
                image_index,
                width: image.width(),
                height: image.height(),
                color_space: source.color_space,
                filter: source.filter,
                png,
            })
        });

        match converted {
            Ok(image) => Ok(Some(image)),
            Err(message) => match self.options.error_mode {
                ErrorMode::Strict => Err(Error::ImageDecode {
                    page: page_index,
                    image: image_index,
                    message,
                }),
                ErrorMode::Lenient => {
                    log::warn!(
                        "skipping image {} on page {}: {}",
                        image_index,
                        page_index,
                        message
                    );
                    Ok(None)
                }
            },
        }
    }
}

/// Collects the images reachable from one page's resources.
struct PageWalker<'a> {
    doc: &'a SourceDocument,
    page_index: usize,
    seen: HashSet<ObjectId>,
    found: Vec<Candidate>,
}

impl<'a> PageWalker<'a> {
    fn walk_resources(&mut self, resources: &'a Object, depth: usize) {
        let doc = self.doc;
        let Some(xobjects) = doc
            .resolve_dict(resources)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| doc.resolve_dict(x))
        else {
            return;
        };
        self.walk_xobjects(xobjects, depth);
    }

    fn walk_xobjects(&mut self, xobjects: &'a Dictionary, depth: usize) {
        let doc = self.doc;
        for (_, entry) in xobjects.iter() {
            if let Object::Reference(id) = entry {
                if !self.seen.insert(*id) {
                    continue;
                }
            }
            let Ok(Object::Stream(stream)) = doc.resolve(entry) else {
                continue;
            };

            let subtype = stream
                .dict
                .get(b"Subtype")
                .ok()
                .and_then(|o| o.as_name().ok());
            match subtype {
                Some(b"Image") => {
                    let image_index = self.found.len();
                    self.found.push(Candidate {
                        page_index: self.page_index,
                        image_index,
                        source: ImageSource::prepare(doc, stream),
                    });
                }
                Some(b"Form") if depth < MAX_FORM_DEPTH => {
                    if let Ok(resources) = stream.dict.get(b"Resources") {
                        self.walk_resources(resources, depth + 1);
                    }
                }
                Some(b"Form") => {
                    log::warn!(
                        "page {}: form nesting deeper than {}, not searched",
                        self.page_index,
                        MAX_FORM_DEPTH
                    );
                }
                _ => {}
            }
        }
    }
}

/// Write each image as `{base_name}_page{p}_img{i}.png` under `dir` and
/// return the file names in order.
pub fn write_images<P: AsRef<Path>>(
    images: &[ExtractedImage],
    dir: P,
    base_name: &str,
) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| Error::write(dir, e))?;

    images
        .iter()
        .map(|image| {
            let name = image.file_name(base_name);
            write_atomic(dir.join(&name), &image.png)?;
            Ok(name)
        })
        .collect()
}
