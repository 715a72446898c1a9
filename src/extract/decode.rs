//! Image XObject decoding.
//!
//! JPEG streams go through the `image` crate as-is. Everything else is
//! decompressed by lopdf and unpacked from raw samples according to
//! `/BitsPerComponent` and `/ColorSpace`.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, Stream};

use crate::parser::{decode_stream, SourceDocument};

/// Filters we cannot decode.
const UNSUPPORTED_FILTERS: [&str; 3] = ["JPXDecode", "JBIG2Decode", "CCITTFaxDecode"];

/// Upper bound on unpacked samples (width x height x components) of one image.
const MAX_IMAGE_SAMPLES: usize = 1 << 28;

/// Color model of raw samples.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColorModel {
    Gray,
    /// Single colorant; 0 is no ink
    Separation,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorModel>,
        hival: u8,
        palette: Vec<u8>,
    },
}

impl ColorModel {
    fn components(&self) -> usize {
        match self {
            ColorModel::Gray | ColorModel::Separation | ColorModel::Indexed { .. } => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

/// How the samples of an image stream are stored.
#[derive(Debug, Clone)]
enum Encoding {
    Jpeg,
    Raw {
        model: ColorModel,
        bpc: usize,
        inverted: bool,
    },
}

/// An image stream with every document-level reference already resolved,
/// so it can be decoded on any thread.
#[derive(Debug, Clone)]
pub(crate) struct ImageSource {
    stream: Stream,
    encoding: Encoding,
    width: usize,
    height: usize,
    pub color_space: Option<String>,
    pub filter: Option<String>,
}

impl ImageSource {
    /// Inspect an image XObject. Errors are human-readable reasons.
    pub fn prepare(doc: &SourceDocument, stream: &Stream) -> Result<Self, String> {
        let dict = &stream.dict;
        let filters = filter_names(doc, dict);
        let filter = filters.last().cloned();
        let color_space = color_space_name(doc, dict);

        if let Some(bad) = filters
            .iter()
            .find(|f| UNSUPPORTED_FILTERS.contains(&f.as_str()))
        {
            return Err(format!("unsupported filter {}", bad));
        }

        let width = int_entry(doc, dict, b"Width").unwrap_or(0);
        let height = int_entry(doc, dict, b"Height").unwrap_or(0);

        let encoding = if filter.as_deref() == Some("DCTDecode") {
            if filters.len() > 1 {
                return Err("DCTDecode behind other filters is not supported".to_string());
            }
            Encoding::Jpeg
        } else {
            if width == 0 || height == 0 {
                return Err("missing or empty /Width or /Height".to_string());
            }
            let image_mask = dict
                .get(b"ImageMask")
                .ok()
                .and_then(|o| doc.resolve(o).ok())
                .and_then(|o| o.as_bool().ok())
                .unwrap_or(false);

            let (model, bpc) = if image_mask {
                (ColorModel::Gray, 1)
            } else {
                let cs = dict
                    .get(b"ColorSpace")
                    .map_err(|_| "missing /ColorSpace".to_string())?;
                let model = parse_color_space(doc, cs, 0)?;
                let bpc = int_entry(doc, dict, b"BitsPerComponent").unwrap_or(8);
                (model, bpc)
            };

            if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
                return Err(format!("unsupported BitsPerComponent {}", bpc));
            }
            check_dimensions(width, height, model.components())?;

            // Mask samples of 0 paint black, which the gray mapping already gives
            Encoding::Raw {
                model,
                bpc,
                inverted: decode_inverted(doc, dict),
            }
        };

        Ok(Self {
            stream: stream.clone(),
            encoding,
            width,
            height,
            color_space,
            filter,
        })
    }

    /// Decode to pixels.
    pub fn decode(&self) -> Result<DynamicImage, String> {
        match &self.encoding {
            Encoding::Jpeg => {
                image::load_from_memory_with_format(&self.stream.content, ImageFormat::Jpeg)
                    .map_err(|e| format!("invalid JPEG data: {}", e))
            }
            Encoding::Raw {
                model,
                bpc,
                inverted,
            } => {
                let data = decode_stream(&self.stream).map_err(|e| e.to_string())?;
                let samples =
                    unpack_samples(&data, self.width, self.height, model.components(), *bpc)?;
                to_image(
                    model,
                    *bpc,
                    *inverted,
                    &samples,
                    self.width as u32,
                    self.height as u32,
                )
            }
        }
    }
}

/// Encode an image as PNG.
pub(crate) fn encode_png(image: &DynamicImage) -> crate::Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn to_image(
    model: &ColorModel,
    bpc: usize,
    inverted: bool,
    samples: &[u8],
    w: u32,
    h: u32,
) -> Result<DynamicImage, String> {
    let is_indexed = matches!(model, ColorModel::Indexed { .. });
    let scale = |v: u8| -> u8 {
        if is_indexed {
            v
        } else {
            scale_sample(v, bpc)
        }
    };
    let flip = |v: u8| if inverted { 255 - v } else { v };

    let image = match model {
        ColorModel::Gray => {
            let px = samples.iter().map(|&v| flip(scale(v))).collect();
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, px).ok_or("bad buffer size")?)
        }
        ColorModel::Separation => {
            let px = samples.iter().map(|&v| 255 - flip(scale(v))).collect();
            DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, px).ok_or("bad buffer size")?)
        }
        ColorModel::Rgb => {
            let px = samples.iter().map(|&v| flip(scale(v))).collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, px).ok_or("bad buffer size")?)
        }
        ColorModel::Cmyk => {
            let px = samples
                .chunks_exact(4)
                .flat_map(|c| {
                    let c: Vec<u8> = c.iter().map(|&v| flip(scale(v))).collect();
                    cmyk_to_rgb(c[0], c[1], c[2], c[3])
                })
                .collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, px).ok_or("bad buffer size")?)
        }
        ColorModel::Indexed {
            base,
            hival,
            palette,
        } => {
            let n = base.components();
            let px = samples
                .iter()
                .flat_map(|&i| {
                    let start = usize::from(i.min(*hival)) * n;
                    let entry = palette.get(start..start + n).unwrap_or(&[]);
                    palette_rgb(base, entry)
                })
                .collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, px).ok_or("bad buffer size")?)
        }
    };

    Ok(image)
}

/// Unpack rows of packed samples into one byte per sample.
///
/// Rows are padded to a byte boundary. 16-bit samples keep their high byte.
pub(crate) fn unpack_samples(
    data: &[u8],
    width: usize,
    height: usize,
    components: usize,
    bpc: usize,
) -> Result<Vec<u8>, String> {
    let too_large = || format!("image dimensions too large: {}x{}", width, height);
    let per_row = width.checked_mul(components).ok_or_else(too_large)?;
    let row_bytes = per_row.checked_mul(bpc).ok_or_else(too_large)?.div_ceil(8);
    let needed = row_bytes.checked_mul(height).ok_or_else(too_large)?;
    if data.len() < needed {
        return Err(format!(
            "image data truncated: {} bytes, expected {}",
            data.len(),
            needed
        ));
    }

    let mut out = Vec::with_capacity(per_row * height);
    for row in data[..needed].chunks_exact(row_bytes) {
        match bpc {
            8 => out.extend_from_slice(&row[..per_row]),
            16 => out.extend(row.chunks_exact(2).take(per_row).map(|pair| pair[0])),
            _ => {
                let mask = (1u8 << bpc) - 1;
                let per_byte = 8 / bpc;
                for i in 0..per_row {
                    let byte = row[i / per_byte];
                    let shift = 8 - bpc * (i % per_byte + 1);
                    out.push((byte >> shift) & mask);
                }
            }
        }
    }
    Ok(out)
}

/// Reject images whose sample buffer would be unreasonably large.
fn check_dimensions(width: usize, height: usize, components: usize) -> Result<(), String> {
    let samples = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(components));
    match samples {
        Some(n) if n <= MAX_IMAGE_SAMPLES && u32::try_from(width.max(height)).is_ok() => Ok(()),
        _ => Err(format!("image dimensions too large: {}x{}", width, height)),
    }
}

/// Stretch a sample of `bpc` bits to the 0..=255 range.
pub(crate) fn scale_sample(value: u8, bpc: usize) -> u8 {
    match bpc {
        8 | 16 => value,
        _ => {
            let max = (1u16 << bpc) - 1;
            ((u16::from(value) * 255) / max) as u8
        }
    }
}

pub(crate) fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let white = 255 - u16::from(k);
    let channel = |v: u8| ((255 - u16::from(v)) * white / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

fn palette_rgb(base: &ColorModel, entry: &[u8]) -> [u8; 3] {
    match (base, entry) {
        (ColorModel::Gray, [g]) => [*g, *g, *g],
        (ColorModel::Separation, [t]) => [255 - t, 255 - t, 255 - t],
        (ColorModel::Rgb, [r, g, b]) => [*r, *g, *b],
        (ColorModel::Cmyk, [c, m, y, k]) => cmyk_to_rgb(*c, *m, *y, *k),
        _ => [0, 0, 0],
    }
}

/// Parse a `/ColorSpace` value into a color model.
pub(crate) fn parse_color_space(
    doc: &SourceDocument,
    obj: &Object,
    depth: usize,
) -> Result<ColorModel, String> {
    if depth > 4 {
        return Err("color space nesting too deep".to_string());
    }
    let obj = doc.resolve(obj).map_err(|e| e.to_string())?;

    match obj {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorModel::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorModel::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ColorModel::Cmyk),
            other => Err(format!(
                "unsupported color space {}",
                String::from_utf8_lossy(other)
            )),
        },
        Object::Array(parts) => {
            let family = parts
                .first()
                .and_then(|o| doc.resolve(o).ok())
                .and_then(|o| o.as_name().ok())
                .ok_or("empty color space array")?;

            match family {
                b"CalGray" => Ok(ColorModel::Gray),
                b"CalRGB" => Ok(ColorModel::Rgb),
                b"ICCBased" => {
                    let profile = parts
                        .get(1)
                        .and_then(|o| doc.resolve_dict(o))
                        .ok_or("ICCBased without profile")?;
                    let n = profile
                        .get(b"N")
                        .ok()
                        .and_then(|o| o.as_i64().ok())
                        .unwrap_or(0);
                    match n {
                        1 => Ok(ColorModel::Gray),
                        3 => Ok(ColorModel::Rgb),
                        4 => Ok(ColorModel::Cmyk),
                        _ => match profile.get(b"Alternate") {
                            Ok(alt) => parse_color_space(doc, alt, depth + 1),
                            Err(_) => Err(format!("ICCBased with {} components", n)),
                        },
                    }
                }
                b"Indexed" | b"I" => {
                    let base = parts.get(1).ok_or("Indexed without base")?;
                    let base = parse_color_space(doc, base, depth + 1)?;
                    if matches!(base, ColorModel::Indexed { .. }) {
                        return Err("nested Indexed color space".to_string());
                    }
                    let hival = parts
                        .get(2)
                        .and_then(|o| doc.resolve(o).ok())
                        .and_then(|o| o.as_i64().ok())
                        .ok_or("Indexed without hival")?
                        .clamp(0, 255) as u8;
                    let palette = match parts.get(3).map(|o| doc.resolve(o)) {
                        Some(Ok(Object::String(bytes, _))) => bytes.clone(),
                        Some(Ok(Object::Stream(s))) => decode_stream(s).map_err(|e| e.to_string())?,
                        _ => return Err("Indexed without lookup table".to_string()),
                    };
                    Ok(ColorModel::Indexed {
                        base: Box::new(base),
                        hival,
                        palette,
                    })
                }
                b"Separation" => Ok(ColorModel::Separation),
                other => Err(format!(
                    "unsupported color space {}",
                    String::from_utf8_lossy(other)
                )),
            }
        }
        _ => Err("malformed /ColorSpace".to_string()),
    }
}

fn decode_inverted(doc: &SourceDocument, dict: &Dictionary) -> bool {
    dict.get(b"Decode")
        .ok()
        .and_then(|o| doc.resolve(o).ok())
        .and_then(|o| o.as_array().ok())
        .and_then(|a| Some((a.first()?.as_float().ok()?, a.get(1)?.as_float().ok()?)))
        .map_or(false, |(lo, hi)| lo > hi)
}

fn int_entry(doc: &SourceDocument, dict: &Dictionary, key: &[u8]) -> Option<usize> {
    dict.get(key)
        .ok()
        .and_then(|o| doc.resolve(o).ok())
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| usize::try_from(v).ok())
}

fn filter_names(doc: &SourceDocument, dict: &Dictionary) -> Vec<String> {
    let Some(filter) = dict.get(b"Filter").ok().and_then(|o| doc.resolve(o).ok()) else {
        return Vec::new();
    };
    match filter {
        Object::Name(n) => vec![String::from_utf8_lossy(n).into_owned()],
        Object::Array(items) => items
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn color_space_name(doc: &SourceDocument, dict: &Dictionary) -> Option<String> {
    let cs = doc.resolve(dict.get(b"ColorSpace").ok()?).ok()?;
    let name = match cs {
        Object::Name(n) => n,
        Object::Array(parts) => parts.first()?.as_name().ok()?,
        _ => return None,
    };
    Some(String::from_utf8_lossy(name).into_owned())
}
