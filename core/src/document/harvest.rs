//! document/harvest.rs
//! Pull every raster image out of a PDF, page by page, in drawing order.
//!
//! Industry notes:
//! - Images are found by following `Do` operators through the page content
//!   and into form XObjects with an explicit work stack. Depth is bounded and
//!   every XObject is visited once, so hostile nesting cannot loop.
//! - Image XObjects listed in the page resources but never drawn are appended
//!   afterwards.
//! - Images that cannot be decoded are reported and skipped.

use std::collections::HashSet;

use image::{imageops, GrayImage, ImageFormat, RgbImage};
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::document::DocumentError;

/// One decoded image, normalised to 8-bit grayscale.
#[derive(Debug, Clone)]
pub struct HarvestedImage {
    /// 1-based page number.
    pub page: u32,
    /// Resource name the image was drawn under.
    pub name: String,
    pub object_id: ObjectId,
    pub raster: GrayImage,
}

#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub page_count: usize,
    pub images: Vec<HarvestedImage>,
    pub warnings: Vec<String>,
}

/// One content stream being walked.
struct Frame<'a> {
    operations: Vec<Operation>,
    next: usize,
    resources: Vec<&'a Dictionary>,
    depth: usize,
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match doc.dereference(obj).ok()?.1 {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Find `name` in the XObject dictionaries of `resources`, innermost first.
fn lookup_xobject<'a>(doc: &'a Document, resources: &[&'a Dictionary], name: &[u8]) -> Option<(ObjectId, &'a Stream)> {
    resources.iter().find_map(|res| {
        let xobjects = resolve_dict(doc, res.get(b"XObject").ok()?)?;
        let id = xobjects.get(name).ok()?.as_reference().ok()?;
        let stream = doc.get_object(id).ok()?.as_stream().ok()?;
        Some((id, stream))
    })
}

fn subtype(stream: &Stream) -> &[u8] {
    stream.dict.get(b"Subtype").and_then(Object::as_name).unwrap_or(b"")
}

fn page_resources<'a>(doc: &'a Document, page_id: ObjectId) -> Vec<&'a Dictionary> {
    let Ok((inline, referenced)) = doc.get_page_resources(page_id) else {
        return Vec::new();
    };
    inline
        .into_iter()
        .chain(referenced.into_iter().filter_map(|id| doc.get_dictionary(id).ok()))
        .collect()
}

/// Harvest every page of `doc`.
pub fn harvest_images(doc: &Document, max_depth: usize) -> Harvest {
    let pages = doc.get_pages();
    let mut harvest = Harvest { page_count: pages.len(), ..Harvest::default() };

    for (&page_number, &page_id) in &pages {
        let before = harvest.images.len();
        harvest_page(doc, page_number, page_id, max_depth, &mut harvest);
        debug!("page {}: {} images", page_number, harvest.images.len() - before);
    }
    harvest
}

fn harvest_page(doc: &Document, page: u32, page_id: ObjectId, max_depth: usize, out: &mut Harvest) {
    let resources = page_resources(doc, page_id);
    let mut visited: HashSet<ObjectId> = HashSet::new();

    let mut stack = Vec::new();
    match doc.get_and_decode_page_content(page_id) {
        Ok(content) => stack.push(Frame { operations: content.operations, next: 0, resources: resources.clone(), depth: 0 }),
        Err(e) => out.warnings.push(format!("Page {}: unreadable content stream ({})", page, e)),
    }

    while let Some(frame) = stack.last_mut() {
        let Some(op) = frame.operations.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        if op.operator != "Do" {
            continue;
        }
        let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
            continue;
        };
        let Some((id, stream)) = lookup_xobject(doc, &frame.resources, name) else {
            out.warnings.push(format!("Page {}: XObject /{} not found", page, String::from_utf8_lossy(name)));
            continue;
        };
        if !visited.insert(id) {
            continue;
        }
        let name = String::from_utf8_lossy(name).into_owned();

        match subtype(stream) {
            b"Image" => push_image(page, name, id, stream, out),
            b"Form" => {
                let depth = frame.depth + 1;
                if depth > max_depth {
                    out.warnings.push(format!("Page {}: form /{} nested deeper than {}", page, name, max_depth));
                    continue;
                }
                let mut resources = Vec::with_capacity(frame.resources.len() + 1);
                if let Some(own) = stream.dict.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) {
                    resources.push(own);
                }
                resources.extend(frame.resources.iter().copied());

                match stream.get_plain_content().and_then(|data| Content::decode(&data)) {
                    Ok(content) => stack.push(Frame { operations: content.operations, next: 0, resources, depth }),
                    Err(e) => out.warnings.push(format!("Page {}: unreadable form /{} ({})", page, name, e)),
                }
            }
            _ => {}
        }
    }

    // Images listed but never drawn.
    for res in &resources {
        let Some(xobjects) = res.get(b"XObject").ok().and_then(|x| resolve_dict(doc, x)) else {
            continue;
        };
        for (name, obj) in xobjects.iter() {
            let Ok(id) = obj.as_reference() else { continue };
            if visited.contains(&id) {
                continue;
            }
            let Ok(stream) = doc.get_object(id).and_then(Object::as_stream) else { continue };
            if subtype(stream) == b"Image" {
                visited.insert(id);
                push_image(page, String::from_utf8_lossy(name).into_owned(), id, stream, out);
            }
        }
    }
}

fn push_image(page: u32, name: String, object_id: ObjectId, stream: &Stream, out: &mut Harvest) {
    match decode_image(stream) {
        Ok(raster) => out.images.push(HarvestedImage { page, name, object_id, raster }),
        Err(e) => {
            warn!("page {}: image /{} skipped: {}", page, name, e);
            out.warnings.push(format!("Page {}: image /{} could not be decoded ({})", page, name, e));
        }
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32, DocumentError> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|&v| v > 0)
        .ok_or_else(|| DocumentError::UnsupportedImage(format!("missing {}", String::from_utf8_lossy(key))))
}

/// Colour components of the image's colour space; 0 when only the pixel data
/// can tell (ICC-based spaces).
fn components(stream: &Stream) -> Result<u32, DocumentError> {
    let Ok(space) = stream.dict.get(b"ColorSpace") else {
        // Image masks and unspecified spaces read as gray.
        return Ok(1);
    };
    let name: &[u8] = match space {
        Object::Name(n) => n.as_slice(),
        Object::Array(items) => match items.first().and_then(|o| o.as_name().ok()) {
            Some(b"ICCBased") => return Ok(0),
            Some(other) => other,
            None => b"",
        },
        _ => b"",
    };
    match name {
        b"DeviceGray" | b"CalGray" | b"G" => Ok(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(3),
        b"DeviceCMYK" | b"CMYK" => Ok(4),
        other => Err(DocumentError::UnsupportedImage(format!(
            "colour space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Decode an image XObject into 8-bit grayscale.
pub fn decode_image(stream: &Stream) -> Result<GrayImage, DocumentError> {
    let filters = stream.filters().unwrap_or_default();
    if filters.iter().any(|f| *f == b"DCTDecode") {
        return Ok(image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?.to_luma8());
    }

    let width = dimension(stream, b"Width")?;
    let height = dimension(stream, b"Height")?;
    let bpc = stream.dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8);
    let data = stream.get_plain_content()?;
    let (w, h) = (width as usize, height as usize);

    match bpc {
        1 => {
            let stride = w.div_ceil(8);
            if data.len() < stride * h {
                return Err(DocumentError::UnsupportedImage("1-bit data shorter than declared size".into()));
            }
            let inverted = stream
                .dict
                .get(b"Decode")
                .and_then(Object::as_array)
                .ok()
                .and_then(|d| d.first())
                .and_then(|o| o.as_i64().ok())
                == Some(1);
            Ok(GrayImage::from_fn(width, height, |x, y| {
                let byte = data[y as usize * stride + x as usize / 8];
                let bit = (byte >> (7 - (x % 8))) & 1 == 1;
                image::Luma([if bit != inverted { 255 } else { 0 }])
            }))
        }
        8 => {
            let n = match components(stream)? as usize {
                0 if w * h > 0 => data.len() / (w * h),
                n => n,
            };
            if !matches!(n, 1 | 3 | 4) {
                return Err(DocumentError::UnsupportedImage(format!("{} colour components", n)));
            }
            let needed = w * h * n;
            if data.len() < needed {
                return Err(DocumentError::UnsupportedImage(format!(
                    "{} bytes of pixel data, expected {}",
                    data.len(),
                    needed
                )));
            }
            let pixels = &data[..needed];
            let raster = match n {
                1 => GrayImage::from_raw(width, height, pixels.to_vec()),
                3 => RgbImage::from_raw(width, height, pixels.to_vec()).map(|rgb| imageops::grayscale(&rgb)),
                _ => {
                    let rgb: Vec<u8> = pixels
                        .chunks_exact(4)
                        .flat_map(|p| {
                            let k = 255 - u32::from(p[3]);
                            [p[0], p[1], p[2]].map(|c| ((255 - u32::from(c)) * k / 255) as u8)
                        })
                        .collect();
                    RgbImage::from_raw(width, height, rgb).map(|rgb| imageops::grayscale(&rgb))
                }
            };
            raster.ok_or_else(|| DocumentError::UnsupportedImage("pixel buffer size mismatch".into()))
        }
        other => Err(DocumentError::UnsupportedImage(format!("{} bits per component", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn gray_and_rgb_images_decode_to_luma() {
        let gray = Stream::new(
            dictionary! { "Subtype" => "Image", "Width" => 2, "Height" => 1, "ColorSpace" => "DeviceGray", "BitsPerComponent" => 8 },
            vec![0, 255],
        );
        let img = decode_image(&gray).unwrap();
        assert_eq!(img.as_raw(), &vec![0, 255]);

        let rgb = Stream::new(
            dictionary! { "Subtype" => "Image", "Width" => 1, "Height" => 1, "ColorSpace" => "DeviceRGB", "BitsPerComponent" => 8 },
            vec![255, 255, 255],
        );
        assert_eq!(decode_image(&rgb).unwrap().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn one_bit_rows_are_byte_aligned() {
        let mono = Stream::new(
            dictionary! { "Subtype" => "Image", "Width" => 3, "Height" => 2, "BitsPerComponent" => 1 },
            vec![0b1010_0000, 0b0100_0000],
        );
        let img = decode_image(&mono).unwrap();
        assert_eq!(img.as_raw(), &vec![255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn short_pixel_data_is_rejected() {
        let bad = Stream::new(
            dictionary! { "Subtype" => "Image", "Width" => 4, "Height" => 4, "ColorSpace" => "DeviceGray", "BitsPerComponent" => 8 },
            vec![0; 3],
        );
        assert!(matches!(decode_image(&bad), Err(DocumentError::UnsupportedImage(_))));
    }
}
