//! document/layout.rs
//! Where symbols, the linking symbol and the page label go.
//!
//! All positions are PDF points with the origin at the bottom left. Symbols are
//! drawn rotated a quarter turn clockwise, so a placement's footprint is
//! `height` wide and `width` tall, hanging down from `y_top`.

use crate::config::{LinkingProfile, PageGeometry};
use crate::constants::{linking, page};
use crate::document::DocumentError;

/// One rotated image on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge of the footprint.
    pub x: f32,
    /// Top edge of the footprint.
    pub y_top: f32,
    /// Drawn size before rotation.
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// `cm` operands mapping the unit image square onto the footprint with a
    /// 90° clockwise turn: the image's left edge ends up on top.
    pub fn matrix(&self) -> [f32; 6] {
        [0.0, -self.width, self.height, 0.0, self.x, self.y_top]
    }

    /// `(x0, y0, x1, y1)` of the rotated footprint.
    pub fn footprint(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y_top - self.width, self.x + self.height, self.y_top)
    }
}

/// Number of symbol pages for `symbols` symbols.
pub fn symbol_page_count(symbols: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    symbols.div_ceil(per_page)
}

/// Placements of the first `count` symbols of a page, right to left.
pub fn symbol_placements(geometry: &PageGeometry, count: usize) -> Vec<Placement> {
    let w = PageGeometry::cm(geometry.symbol_width_cm);
    let h = PageGeometry::cm(geometry.symbol_height_cm);
    let right = geometry.width_pt - PageGeometry::cm(geometry.margin_right_cm);
    let y_top = geometry.height_pt - PageGeometry::cm(geometry.margin_top_cm);

    (0..count.min(geometry.symbols_per_page))
        .map(|i| {
            let fold = if i >= geometry.fold_after { PageGeometry::cm(geometry.fold_gap_cm) } else { 0.0 };
            let x = right - (i as f32 + 1.0) * h - i as f32 * PageGeometry::cm(geometry.spacing_cm) - fold;
            Placement { x, y_top, width: w, height: h }
        })
        .collect()
}

/// Linking symbol scaled to fit its box, top left of the page.
pub fn linking_placement(geometry: &PageGeometry, image_width: u32, image_height: u32) -> Placement {
    let (w, h) = (image_width.max(1) as f32, image_height.max(1) as f32);
    let scale = (linking::FIT_WIDTH_PT / w).min(linking::FIT_HEIGHT_PT / h);
    Placement {
        x: PageGeometry::cm(linking::OFFSET_X_CM),
        y_top: geometry.height_pt - PageGeometry::cm(linking::OFFSET_TOP_CM),
        width: w * scale,
        height: h * scale,
    }
}

/// Baseline origin of the "Page X of N" label.
pub fn page_label_anchor(geometry: &PageGeometry) -> (f32, f32) {
    (geometry.width_pt - page::LABEL_RIGHT_INSET_PT, page::LABEL_BASELINE_PT)
}

/// Symbols must stay inside the margins and keep the exclusion zone between
/// each other.
pub fn check_placements(geometry: &PageGeometry, placements: &[Placement]) -> Result<(), DocumentError> {
    const EPSILON: f32 = 0.01;
    let left = PageGeometry::cm(geometry.margin_left_cm);
    let right = geometry.width_pt - PageGeometry::cm(geometry.margin_right_cm);
    let bottom = PageGeometry::cm(geometry.margin_bottom_cm);
    let top = geometry.height_pt - PageGeometry::cm(geometry.margin_top_cm);
    let zone = PageGeometry::cm(geometry.exclusion_zone_cm);

    for (i, p) in placements.iter().enumerate() {
        let (x0, y0, x1, y1) = p.footprint();
        if x0 < left - EPSILON || x1 > right + EPSILON || y0 < bottom - EPSILON || y1 > top + EPSILON {
            return Err(DocumentError::Layout(format!(
                "symbol {} at ({:.1}, {:.1})-({:.1}, {:.1}) leaves the margins",
                i + 1,
                x0,
                y0,
                x1,
                y1
            )));
        }
        if let Some(next) = placements.get(i + 1) {
            let gap = x0 - next.footprint().2;
            if gap < zone - EPSILON {
                return Err(DocumentError::Layout(format!(
                    "symbols {} and {} are {:.1} pt apart, need {:.1}",
                    i + 1,
                    i + 2,
                    gap,
                    zone
                )));
            }
        }
    }
    Ok(())
}

/// 16-digit linking text for a page.
pub fn linking_text(profile: &LinkingProfile, form: u16, page_number: u16) -> Result<String, DocumentError> {
    let code = crate::headers::LinkingCode {
        form,
        version: profile.version,
        organization: profile.organization.clone(),
        page: page_number,
        has_2d: profile.has_2d,
        orientation: profile.orientation,
        position: profile.position_id,
    };
    crate::headers::encode_linking_code(&code).map_err(|e| DocumentError::Linking(e.to_string()))
}
