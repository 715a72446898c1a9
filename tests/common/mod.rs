//! PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Content drawn on every fixture page.
pub const PAGE_CONTENT: &[u8] = b"0 0 1 rg 10 10 50 50 re f";

/// Incrementally builds a PDF with a flat page tree.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    tree: Dictionary,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            tree: Dictionary::new(),
        }
    }

    /// Add a page with the given MediaBox and extra page entries.
    pub fn page_with(mut self, media_box: [f32; 4], extra: Dictionary) -> Self {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, PAGE_CONTENT.to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
            "Contents" => content_id,
        };
        if !extra.has(b"Resources") {
            page.set("Resources", dictionary! {});
        }
        for (key, value) in extra.iter() {
            page.set(key.clone(), value.clone());
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        self
    }

    /// Add a plain page of `width` x `height` points.
    pub fn page(self, width: f32, height: f32) -> Self {
        self.page_with([0.0, 0.0, width, height], Dictionary::new())
    }

    /// Add a page whose resources draw the given image XObjects, in order.
    pub fn page_with_images(mut self, width: f32, height: f32, images: Vec<Stream>) -> Self {
        let mut xobjects = Dictionary::new();
        for (i, image) in images.into_iter().enumerate() {
            let id = self.doc.add_object(image);
            xobjects.set(format!("Im{}", i), id);
        }
        let extra = dictionary! {
            "Resources" => dictionary! { "XObject" => xobjects },
        };
        self.page_with([0.0, 0.0, width, height], extra)
    }

    /// Set an inheritable attribute on the root `/Pages` node.
    pub fn tree_attr<V: Into<Object>>(mut self, key: &str, value: V) -> Self {
        self.tree.set(key, value);
        self
    }

    /// Add an object and return its id, for fixtures that share objects.
    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        for (key, value) in self.tree.iter() {
            pages.set(key.clone(), value.clone());
        }
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out).expect("fixture saves");
        out
    }
}

/// A PDF with one plain page per size.
pub fn pdf_with_pages(sizes: &[(f32, f32)]) -> Vec<u8> {
    sizes
        .iter()
        .fold(PdfBuilder::new(), |b, &(w, h)| b.page(w, h))
        .build()
}

fn image_dict(width: u32, height: u32, color_space: Object, bpc: i64) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => bpc,
    }
}

/// Uncompressed 8-bit RGB image filled with one color.
pub fn rgb_image(width: u32, height: u32, rgb: [u8; 3]) -> Stream {
    let pixels: Vec<u8> = (0..width * height).flat_map(|_| rgb).collect();
    Stream::new(image_dict(width, height, "DeviceRGB".into(), 8), pixels)
}

/// Flate-compressed 8-bit gray ramp.
pub fn flate_gray_image(width: u32, height: u32) -> Stream {
    let pixels: Vec<u8> = (0..width * height).map(|i| (i % 256) as u8).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&pixels).unwrap();
    let mut dict = image_dict(width, height, "DeviceGray".into(), 8);
    dict.set("Filter", "FlateDecode");
    let mut stream = Stream::new(dict, encoder.finish().unwrap());
    stream.allows_compression = false;
    stream
}

/// Indexed image over a two-color RGB palette, 1 bit per pixel.
pub fn indexed_image(width: u32, height: u32) -> Stream {
    let row_bytes = (width as usize).div_ceil(8);
    let data = vec![0b1010_1010u8; row_bytes * height as usize];
    let palette = Object::String(vec![255, 0, 0, 0, 0, 255], lopdf::StringFormat::Hexadecimal);
    let cs = Object::Array(vec!["Indexed".into(), "DeviceRGB".into(), 1.into(), palette]);
    Stream::new(image_dict(width, height, cs, 1), data)
}

/// JPEG image produced with the `image` crate.
pub fn jpeg_image(width: u32, height: u32) -> Stream {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
    });
    let mut jpeg = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut jpeg, image::ImageFormat::Jpeg)
        .unwrap();
    let mut dict = image_dict(width, height, "DeviceRGB".into(), 8);
    dict.set("Filter", "DCTDecode");
    let mut stream = Stream::new(dict, jpeg.into_inner());
    stream.allows_compression = false;
    stream
}

/// A content stream that claims Flate compression but holds garbage.
pub fn corrupt_flate_stream() -> Stream {
    let mut stream = Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        b"not zlib at all".to_vec(),
    );
    stream.allows_compression = false;
    stream
}

/// An image stream whose filter cannot be decoded.
pub fn jpx_image(width: u32, height: u32) -> Stream {
    let mut dict = image_dict(width, height, "DeviceRGB".into(), 8);
    dict.set("Filter", "JPXDecode");
    Stream::new(dict, vec![0u8; 16])
}
