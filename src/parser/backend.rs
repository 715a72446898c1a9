//! Scoped access to a loaded PDF.
//!
//! [`SourceDocument`] owns the `lopdf::Document` for the duration of one
//! operation and resolves the page attributes that PDF lets pages inherit
//! from their ancestors in the page tree.

use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{PageGeometry, Rect, Rotation};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Guard against malformed page trees whose `/Parent` links loop.
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Guard against reference chains that loop.
const MAX_REFERENCE_DEPTH: usize = 32;

/// A PDF opened for reading or in-place transformation.
pub struct SourceDocument {
    doc: LopdfDocument,
}

impl SourceDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path).map_err(|e| open_error(path.display(), e))?;
        let doc = LopdfDocument::load(path).map_err(|e| open_error(path.display(), e.into()))?;
        Self::from_document(doc)
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data).map_err(|e| open_error("<memory>", e))?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| open_error("<memory>", e.into()))?;
        Self::from_document(doc)
    }

    /// Open a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        if doc.get_pages().is_empty() {
            log::warn!("document has no pages");
        }
        Ok(Self { doc })
    }

    /// Pages in document order, paired with their 0-based index.
    pub fn pages(&self) -> Vec<(usize, PageId)> {
        self.doc
            .get_pages()
            .into_values()
            .enumerate()
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// PDF version from the header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Resolve the geometry of a page, following inheritance.
    pub fn page_geometry(&self, page_id: PageId) -> Result<PageGeometry> {
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| self.rect(obj))
            .ok_or_else(|| Error::Pdf("page has no usable MediaBox".to_string()))?;

        let mut geometry = PageGeometry::new(media_box);

        if let Some(crop) = self
            .inherited(page_id, b"CropBox")
            .and_then(|obj| self.rect(obj))
        {
            geometry = geometry.with_crop_box(crop);
        }

        if let Some(degrees) = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| self.resolve(obj).ok())
            .and_then(|obj| obj.as_i64().ok())
        {
            geometry = geometry.with_rotation(Rotation::from_degrees(degrees));
        }

        Ok(geometry)
    }

    /// Decoded bytes of all content streams of a page, concatenated.
    ///
    /// Streams are separated by a newline so that an operator at the end of
    /// one stream cannot merge with the first token of the next.
    pub fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page = self.doc.get_dictionary(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(obj) => self.resolve(obj)?,
            Err(_) => return Ok(Vec::new()),
        };

        let mut out = Vec::new();
        match contents {
            Object::Array(parts) => {
                for part in parts {
                    if let Object::Stream(stream) = self.resolve(part)? {
                        out.extend_from_slice(&decode_stream(stream)?);
                        out.push(b'\n');
                    }
                }
            }
            Object::Stream(stream) => {
                out.extend_from_slice(&decode_stream(stream)?);
                out.push(b'\n');
            }
            Object::Null => {}
            _ => return Err(Error::Pdf("unexpected /Contents object".to_string())),
        }
        Ok(out)
    }

    /// The page's effective `/Resources` entry, as stored (reference or
    /// inline dictionary).
    pub fn page_resources(&self, page_id: PageId) -> Option<&Object> {
        self.inherited(page_id, b"Resources")
    }

    /// Look up a page attribute, walking up the page tree.
    pub fn inherited(&self, page_id: PageId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = current.get(key) {
                return Some(value);
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Follow references until a direct object is reached.
    pub fn resolve<'a>(&'a self, mut obj: &'a Object) -> Result<&'a Object> {
        for _ in 0..MAX_REFERENCE_DEPTH {
            match obj {
                Object::Reference(id) => obj = self.doc.get_object(*id)?,
                _ => return Ok(obj),
            }
        }
        Err(Error::Pdf("reference chain too deep".to_string()))
    }

    /// Resolve an object to a dictionary, looking through streams.
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj).ok()? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    fn rect(&self, obj: &Object) -> Option<Rect> {
        let array = self.resolve(obj).ok()?.as_array().ok()?;
        if array.len() < 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(array) {
            *slot = self.resolve(value).ok()?.as_float().ok()?;
        }
        let rect = Rect::new(coords[0], coords[1], coords[2], coords[3]);
        (!rect.is_empty()).then_some(rect)
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Mutable access for in-place transforms.
    pub fn raw_doc_mut(&mut self) -> &mut LopdfDocument {
        &mut self.doc
    }

    pub fn into_inner(self) -> LopdfDocument {
        self.doc
    }
}

/// Decode a stream's data, leaving unfiltered streams untouched.
///
/// Plain `FlateDecode` chains are inflated here so that corrupt data is an
/// error rather than silently empty output. Other filters, and Flate with
/// predictor parameters, go through lopdf.
pub(crate) fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    let filters: Vec<&[u8]> = match stream.dict.get(b"Filter") {
        Err(_) => return Ok(stream.content.clone()),
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(names)) => names
            .iter()
            .map(|n| n.as_name().ok())
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        Ok(_) => Vec::new(),
    };

    let plain_flate = !filters.is_empty()
        && filters.iter().all(|f| *f == b"FlateDecode")
        && stream.dict.get(b"DecodeParms").is_err();
    if plain_flate {
        let mut data = stream.content.clone();
        for _ in &filters {
            data = inflate(&data)?;
        }
        return Ok(data);
    }

    stream
        .decompressed_content()
        .map_err(|e| Error::Pdf(format!("cannot decode stream: {}", e)))
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Pdf(format!("corrupt FlateDecode stream: {}", e)))?;
    Ok(out)
}

fn open_error(source: impl std::fmt::Display, err: Error) -> Error {
    match err {
        Error::Encrypted => Error::Encrypted,
        Error::UnknownFormat => Error::Open(format!("{}: not a PDF file", source)),
        other => Error::Open(format!("{}: {}", source, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn doc_with_inherited_box() -> (LopdfDocument, PageId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
                "Rotate" => 90,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, page_id)
    }

    #[test]
    fn test_geometry_is_inherited_from_parent() {
        let (doc, page_id) = doc_with_inherited_box();
        let source = SourceDocument::from_document(doc).unwrap();
        let geo = source.page_geometry(page_id).unwrap();
        assert_eq!(geo.media_box, Rect::from_size(300.0, 400.0));
        assert_eq!(geo.rotation, Rotation::Clockwise90);
        assert_eq!(geo.width(), 400.0);
    }

    #[test]
    fn test_page_content_unfiltered() {
        let (doc, page_id) = doc_with_inherited_box();
        let source = SourceDocument::from_document(doc).unwrap();
        let content = source.page_content(page_id).unwrap();
        assert_eq!(content, b"0 0 m 10 10 l S\n");
    }

    #[test]
    fn test_pages_are_zero_indexed() {
        let (doc, page_id) = doc_with_inherited_box();
        let source = SourceDocument::from_document(doc).unwrap();
        assert_eq!(source.pages(), vec![(0, page_id)]);
    }

    fn flate_stream(content: Vec<u8>) -> Stream {
        Stream::new(dictionary! { "Filter" => "FlateDecode" }, content)
    }

    #[test]
    fn test_decode_stream_inflates_flate() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1 0 0 RG 0 0 m 5 5 l S").unwrap();
        let stream = flate_stream(encoder.finish().unwrap());
        assert_eq!(decode_stream(&stream).unwrap(), b"1 0 0 RG 0 0 m 5 5 l S");
    }

    #[test]
    fn test_decode_stream_rejects_corrupt_flate() {
        let stream = flate_stream(b"not zlib at all".to_vec());
        assert!(matches!(decode_stream(&stream), Err(Error::Pdf(_))));
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = SourceDocument::from_bytes(b"hello, world");
        assert!(matches!(result, Err(Error::Open(_))));
    }

    #[test]
    fn test_from_bytes_rejects_truncated_pdf() {
        let result = SourceDocument::from_bytes(b"%PDF-1.4\n1 0 obj\n<<");
        assert!(matches!(result, Err(Error::Open(_))));
    }
}
