//! Page enlargement.
//!
//! Each page's original content is moved into a Form XObject whose bounding
//! box is the page's visible box. The page itself is resized to the visible
//! size plus the margin on every side, and its new content stream draws the
//! form once, translated by the margin (and rotated upright when the source
//! page carried `/Rotate`). Nothing is rasterized.

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, Stream};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{PageGeometry, Rect};
use crate::output::write_atomic;
use crate::parser::{decode_stream, PageId, SourceDocument};

use super::options::MarginOptions;

/// Resource name of the wrapped original content.
const FORM_NAME: &str = "PdfyardPage";

/// Page attributes that no longer apply once the page has been rebuilt.
///
/// `CropBox` and `Rotate` are inheritable, so they are overwritten on the
/// page rather than removed.
const STALE_PAGE_KEYS: [&[u8]; 5] = [b"BleedBox", b"TrimBox", b"ArtBox", b"Annots", b"Group"];

/// Before and after sizes of one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageReport {
    /// Page index (0-based)
    pub index: usize,
    pub original_width: f32,
    pub original_height: f32,
    pub width: f32,
    pub height: f32,
}

/// Summary of a margin insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginReport {
    /// Margin applied on each side, in points
    pub margin_pt: f32,
    pub pages: Vec<PageReport>,
}

impl MarginReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Everything needed from the source page, copied out so that decoding can
/// run without borrowing the document.
struct PageInput {
    index: usize,
    page_id: PageId,
    geometry: PageGeometry,
    streams: Vec<Stream>,
    resources: Option<Object>,
    group: Option<Object>,
}

/// A page ready to be written back.
struct PagePlan {
    index: usize,
    page_id: PageId,
    geometry: PageGeometry,
    form: Stream,
}

/// Enlarges every page of a document by a fixed margin.
#[derive(Debug, Clone, Default)]
pub struct MarginInserter {
    options: MarginOptions,
}

impl MarginInserter {
    pub fn new(options: MarginOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MarginOptions {
        &self.options
    }

    /// Read `source`, add margins, and write the result to `dest`.
    ///
    /// Nothing is written to `dest` unless every page succeeded.
    pub fn insert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        dest: Q,
    ) -> Result<MarginReport> {
        let dest = dest.as_ref();
        // Validate before touching the source so a bad margin fails fast.
        self.options.margin()?;

        let mut doc = SourceDocument::open(source.as_ref())?;
        log::info!(
            "adding {}px margins to {} ({} pages)",
            self.options.margin_px,
            source.as_ref().display(),
            doc.page_count()
        );

        let report = self.apply(&mut doc)?;
        let bytes = save_to_vec(doc.raw_doc_mut(), dest)?;
        write_atomic(dest, &bytes)?;

        log::info!("margins added, saved to {}", dest.display());
        Ok(report)
    }

    /// Add margins to an in-memory PDF and return the new file's bytes.
    pub fn insert_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.options.margin()?;
        let mut doc = SourceDocument::from_bytes(data)?;
        self.apply(&mut doc)?;
        save_to_vec(doc.raw_doc_mut(), Path::new("<memory>"))
    }

    /// Transform an open document in place.
    pub fn apply(&self, doc: &mut SourceDocument) -> Result<MarginReport> {
        let margin = self.options.margin()?.points();

        let inputs = doc
            .pages()
            .into_iter()
            .map(|(index, page_id)| {
                collect_page(doc, index, page_id).map_err(|e| Error::render(index, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let compress = self.options.compress;
        let plans: Vec<PagePlan> = if self.options.parallel {
            inputs
                .into_par_iter()
                .map(|input| plan_page(input, compress))
                .collect::<Result<_>>()?
        } else {
            inputs
                .into_iter()
                .map(|input| plan_page(input, compress))
                .collect::<Result<_>>()?
        };

        let raw = doc.raw_doc_mut();
        let mut pages = Vec::with_capacity(plans.len());
        for plan in plans {
            log::debug!("page {}: wrapping content, margin {}pt", plan.index, margin);
            pages.push(write_page(raw, plan, margin)?);
        }
        raw.prune_objects();

        Ok(MarginReport {
            margin_pt: margin,
            pages,
        })
    }
}

fn collect_page(doc: &SourceDocument, index: usize, page_id: PageId) -> Result<PageInput> {
    let geometry = doc.page_geometry(page_id)?;
    let raw = doc.raw_doc();
    let page = raw.get_dictionary(page_id)?;

    let mut streams = Vec::new();
    if let Ok(contents) = page.get(b"Contents") {
        match doc.resolve(contents)? {
            Object::Stream(stream) => streams.push(stream.clone()),
            Object::Array(parts) => {
                for part in parts {
                    if let Object::Stream(stream) = doc.resolve(part)? {
                        streams.push(stream.clone());
                    }
                }
            }
            _ => {}
        }
    }

    Ok(PageInput {
        index,
        page_id,
        geometry,
        streams,
        resources: doc.page_resources(page_id).cloned(),
        group: page.get(b"Group").ok().cloned(),
    })
}

fn plan_page(input: PageInput, compress: bool) -> Result<PagePlan> {
    let index = input.index;

    let mut content = Vec::new();
    for stream in &input.streams {
        let data = decode_stream(stream).map_err(|e| Error::render(index, e.to_string()))?;
        content.extend_from_slice(&data);
        content.push(b'\n');
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "FormType" => 1,
        "BBox" => rect_object(input.geometry.visible_box()),
    };
    if let Some(resources) = input.resources {
        dict.set("Resources", resources);
    }
    if let Some(group) = input.group {
        dict.set("Group", group);
    }

    let form = content_stream(dict, content, compress).map_err(|e| Error::render(index, e))?;

    Ok(PagePlan {
        index,
        page_id: input.page_id,
        geometry: input.geometry,
        form,
    })
}

fn write_page(doc: &mut LopdfDocument, plan: PagePlan, margin: f32) -> Result<PageReport> {
    let index = plan.index;
    let original_width = plan.geometry.width();
    let original_height = plan.geometry.height();
    let width = original_width + 2.0 * margin;
    let height = original_height + 2.0 * margin;

    let form_id = doc.add_object(plan.form);

    let placement = plan.geometry.display_matrix().then_translate(margin, margin);
    let draw = format!("q\n{} cm\n/{} Do\nQ\n", placement.to_operands(), FORM_NAME);
    let content_id = doc.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));

    let page = doc
        .get_object_mut(plan.page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::render(index, e.to_string()))?;

    for key in STALE_PAGE_KEYS {
        page.remove(key);
    }
    let media_box = rect_object(Rect::from_size(width, height));
    page.set("MediaBox", media_box.clone());
    page.set("CropBox", media_box);
    page.set("Rotate", 0);
    page.set(
        "Resources",
        dictionary! {
            "XObject" => dictionary! { FORM_NAME => form_id },
        },
    );
    page.set("Contents", content_id);

    Ok(PageReport {
        index,
        original_width,
        original_height,
        width,
        height,
    })
}

fn rect_object(rect: Rect) -> Object {
    Object::Array(rect.to_array().iter().map(|&v| Object::Real(v)).collect())
}

fn content_stream(
    mut dict: Dictionary,
    content: Vec<u8>,
    compress: bool,
) -> std::result::Result<Stream, String> {
    if !compress {
        return Ok(Stream::new(dict, content));
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&content)
        .and_then(|_| encoder.finish())
        .map(|compressed| {
            dict.set("Filter", "FlateDecode");
            let mut stream = Stream::new(dict, compressed);
            stream.allows_compression = false;
            stream
        })
        .map_err(|e| format!("cannot compress content: {}", e))
}

fn save_to_vec(doc: &mut LopdfDocument, dest: &Path) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::write(dest, std::io::Error::other(e.to_string())))?;
    Ok(buffer)
}
