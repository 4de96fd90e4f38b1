//! constants.rs
//! Externally mandated eCH-0196 / eCH-0270 constants.
//!
//! Industry notes:
//! - These values come from the published layout rules and are reproduced as-is.
//! - Runtime code never reads them directly; `config::CodecProfile::default()`
//!   copies them into one immutable value shared by encoder and decoder.

/// Namespace of the eCH-0196 v2 tax statement.
pub const ECH0196_NAMESPACE: &str = "http://www.ech.ch/xmlns/eCH-0196/2";
/// Local name of the payload root element.
pub const ROOT_ELEMENT: &str = "taxStatement";
/// Schema file auto-detected by the CLI.
pub const DEFAULT_SCHEMA_FILE: &str = "eCH-0196-2-2.xsd";

/// Bytes of compressed payload carried by one direct-variant symbol.
pub const DIRECT_SEGMENT_CAPACITY: usize = 470;

/// Highest 1-based index/total the legacy textual header is sized for.
pub const LEGACY_MAX_SEGMENTS: usize = 999;
/// Length of a hyphenated UUID in the legacy header.
pub const DOCUMENT_ID_LEN: usize = 36;

/// 2D symbol geometry.
pub mod symbol {
    pub const COLUMNS: usize = 13;
    pub const ROWS: usize = 35;
    pub const EC_LEVEL: u8 = 4;

    /// Physical size of one module (cm).
    pub const ELEMENT_WIDTH_CM: f32 = 0.042;
    /// Physical height of one row (cm).
    pub const ELEMENT_HEIGHT_CM: f32 = 0.08;

    /// Image width in modules: start + left indicator + data + right indicator + stop.
    pub const IMAGE_WIDTH_MODULES: u32 = 17 + 17 + (COLUMNS as u32) * 17 + 17 + 18;
}

/// A4 landscape page and eCH-0270 placement rules (cm unless noted).
pub mod page {
    /// 1 cm in PDF points.
    pub const CM_TO_POINTS: f32 = 72.0 / 2.54;

    pub const WIDTH_PT: f32 = 841.889_8;
    pub const HEIGHT_PT: f32 = 595.275_6;

    pub const MARGIN_TOP_CM: f32 = 5.0;
    pub const MARGIN_LEFT_CM: f32 = 2.0;
    pub const MARGIN_RIGHT_CM: f32 = 3.0;
    pub const MARGIN_BOTTOM_CM: f32 = 2.0;

    pub const SYMBOL_SPACING_CM: f32 = 1.0;
    /// Extra gap at the fold line.
    pub const FOLD_GAP_CM: f32 = 1.0;
    /// Symbols placed before the fold gap.
    pub const FOLD_AFTER: usize = 3;
    pub const EXCLUSION_ZONE_CM: f32 = 1.0;

    pub const SYMBOLS_PER_PAGE: usize = 6;

    /// Page label anchor (points).
    pub const LABEL_RIGHT_INSET_PT: f32 = 100.0;
    pub const LABEL_BASELINE_PT: f32 = 20.0;
}

/// Linking 1D symbol (Code 128 subset C).
pub mod linking {
    pub const LENGTH: usize = 16;

    pub const FORM_SUMMARY: u16 = 197;
    pub const FORM_DATA: u16 = 196;

    pub const VERSION_CURRENT: u8 = 21;
    pub const VERSION_LEGACY: u8 = 22;

    /// Clearing number placeholder.
    pub const ORGANIZATION: &str = "00000";

    /// The current generation always writes 0 here, even on symbol pages.
    pub const HAS_2D_CURRENT: u8 = 0;
    pub const HAS_2D_LEGACY: u8 = 1;

    pub const ORIENTATION_LANDSCAPE: u8 = 0;
    pub const POSITION_ID: u8 = 3;

    /// Fit box for the drawn symbol (points, `mm * 5`).
    pub const FIT_WIDTH_PT: f32 = 38.0 * 5.0;
    pub const FIT_HEIGHT_PT: f32 = 7.0 * 5.0;
    pub const OFFSET_X_CM: f32 = 0.5;
    pub const OFFSET_TOP_CM: f32 = 1.0;

    /// Raster height in pixels (7 mm * 4).
    pub const RASTER_HEIGHT_PX: u32 = 28;
    pub const QUIET_ZONE_MODULES: u32 = 10;
}

/// Decoder limits.
pub mod decode {
    /// Nesting bound for form XObjects during harvest.
    pub const HARVEST_DEPTH: usize = 4;
    /// Images with an edge shorter than this are upscaled by the fallback chain.
    pub const SMALL_IMAGE_EDGE: u32 = 400;
    pub const UPSCALE_FACTOR: u32 = 2;
}
