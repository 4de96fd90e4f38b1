//! document/assemble.rs
//! Cover page plus symbol pages as a PDF.
//!
//! Industry notes:
//! - Every page owns its resources. Images are registered and drawn in
//!   placement order (linking symbol first, then symbols right to left) so a
//!   reader that follows the content stream sees segments in wire order.
//! - Rasters are stored as 8-bit DeviceGray and Flate-compressed; no
//!   resampling happens, the page transform does the scaling.

use chrono::Utc;
use image::GrayImage;
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::config::CodecProfile;
use crate::constants::linking;
use crate::document::cover::{cover_lines, page_label, BarcodeInfo, CoverSummary, TextRun};
use crate::document::layout::{
    check_placements, linking_placement, linking_text, page_label_anchor, symbol_page_count, symbol_placements,
    Placement,
};
use crate::document::DocumentError;
use crate::symbol::{encode_linking, SymbolImage};

const PDF_VERSION: &str = "1.5";
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const PRODUCER: &str = concat!("etax-core ", env!("CARGO_PKG_VERSION"));
const TITLE: &str = "eCH-0196 Tax Statement";

/// Finished PDF.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub pdf: Vec<u8>,
    pub page_count: usize,
}

/// WinAnsi bytes for the standard fonts; characters outside Latin-1 become '?'.
fn pdf_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn image_xobject(img: &GrayImage) -> Result<Stream, DocumentError> {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(img.width()),
            "Height" => i64::from(img.height()),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        img.as_raw().clone(),
    );
    stream.compress()?;
    Ok(stream)
}

fn draw_image(ops: &mut Vec<Operation>, name: &str, placement: &Placement) {
    let m = placement.matrix();
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("cm", m.iter().map(|&v| Object::Real(v)).collect()));
    ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

fn draw_text(ops: &mut Vec<Operation>, run: &TextRun) {
    let font = if run.bold { FONT_BOLD } else { FONT_REGULAR };
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), run.size.into()]));
    ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(pdf_text(&run.text))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Builder state shared by every page.
struct PdfWriter<'a> {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    kids: Vec<Object>,
    profile: &'a CodecProfile,
}

impl<'a> PdfWriter<'a> {
    fn new(profile: &'a CodecProfile) -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let fonts = dictionary! { FONT_REGULAR => regular, FONT_BOLD => bold };
        Self { doc, pages_id, fonts, kids: Vec::new(), profile }
    }

    /// Add one page: linking symbol, then `images` in order, then `text`.
    fn add_page(
        &mut self,
        linking_image: &GrayImage,
        images: &[(&GrayImage, Placement)],
        text: &[TextRun],
    ) -> Result<(), DocumentError> {
        let mut xobjects = Dictionary::new();
        let mut ops = Vec::new();

        let link_id = self.doc.add_object(image_xobject(linking_image)?);
        xobjects.set("Lk1", link_id);
        let link_place = linking_placement(&self.profile.page, linking_image.width(), linking_image.height());
        draw_image(&mut ops, "Lk1", &link_place);

        for (i, (img, placement)) in images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            let id = self.doc.add_object(image_xobject(img)?);
            xobjects.set(name.as_bytes().to_vec(), id);
            draw_image(&mut ops, &name, placement);
        }
        for run in text {
            draw_text(&mut ops, run);
        }

        let mut content = Stream::new(dictionary! {}, Content { operations: ops }.encode()?);
        content.compress()?;
        let content_id = self.doc.add_object(content);

        let resources = dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => xobjects,
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    fn finish(mut self) -> Result<AssembledDocument, DocumentError> {
        let page_count = self.kids.len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }
        let media_box = vec![0.into(), 0.into(), self.profile.page.width_pt.into(), self.profile.page.height_pt.into()];
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => page_count as i64,
            "MediaBox" => media_box,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let created = Utc::now().format("D:%Y%m%d%H%M%S+00'00'").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "Title" => Object::string_literal(TITLE),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        let mut pdf = Vec::new();
        self.doc.save_to(&mut pdf)?;
        Ok(AssembledDocument { pdf, page_count })
    }
}

fn linking_raster(profile: &CodecProfile, form: u16, page_number: usize) -> Result<GrayImage, DocumentError> {
    let page = u16::try_from(page_number)
        .map_err(|_| DocumentError::Layout(format!("page number {} exceeds the linking field", page_number)))?;
    let text = linking_text(&profile.linking, form, page)?;
    encode_linking(&text, linking::RASTER_HEIGHT_PX, linking::QUIET_ZONE_MODULES)
        .map_err(|e| DocumentError::Linking(e.to_string()))
}

/// Lay out the cover page and every symbol page.
pub fn assemble_document(
    profile: &CodecProfile,
    symbols: &[SymbolImage],
    cover: &CoverSummary,
    document_id: &str,
) -> Result<AssembledDocument, DocumentError> {
    let per_page = profile.page.symbols_per_page;
    let symbol_pages = symbol_page_count(symbols.len(), per_page);
    let total_pages = symbol_pages + 1;
    let label_at = page_label_anchor(&profile.page);
    let label = |n: usize| TextRun {
        bold: false,
        size: 10.0,
        x: label_at.0,
        y: label_at.1,
        text: page_label(n, total_pages),
    };

    let mut writer = PdfWriter::new(profile);

    let info = BarcodeInfo { document_id: document_id.to_string(), segments: symbols.len(), symbol_pages };
    let mut text = cover_lines(cover, &info);
    text.push(label(1));
    let cover_link = linking_raster(profile, profile.linking.form_summary, 1)?;
    writer.add_page(&cover_link, &[], &text)?;

    for (page_index, page_symbols) in symbols.chunks(per_page.max(1)).enumerate() {
        let page_number = page_index + 2;
        let placements = symbol_placements(&profile.page, page_symbols.len());
        check_placements(&profile.page, &placements)?;

        let images: Vec<(&GrayImage, Placement)> =
            page_symbols.iter().map(|s| &s.raster).zip(placements).collect();
        let link = linking_raster(profile, profile.linking.form_data, page_number)?;
        writer.add_page(&link, &images, &[label(page_number)])?;
        debug!("page {}: {} symbols", page_number, images.len());
    }

    let assembled = writer.finish()?;
    info!(
        "assembled {} pages ({} symbols, {} bytes of PDF)",
        assembled.page_count,
        symbols.len(),
        assembled.pdf.len()
    );
    Ok(assembled)
}
