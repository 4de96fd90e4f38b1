//! config.rs
//! One immutable profile shared by the encoder and the decoder.
//!
//! Industry notes:
//! - Geometry, margins and framing constants must agree on both sides of the
//!   codec, so they travel together as a single value instead of globals.
//! - `CodecProfile::default()` is the current generation (direct variant,
//!   zlib); `CodecProfile::legacy()` reproduces the chunked/gzip generation.

use std::fmt;

use crate::compression::CompressionScheme;
use crate::constants::{self, decode, linking, page, symbol};
use crate::raster::Transform;
use crate::segmenting::WireVariant;

/// Row/column/error-correction budget of every 2D symbol in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolGeometry {
    pub columns: usize,
    pub rows: usize,
    pub ec_level: u8,
}

impl SymbolGeometry {
    /// Reed-Solomon codewords for the configured level (`2^(level+1)`).
    pub fn ec_codewords(&self) -> usize {
        2usize << self.ec_level
    }

    /// Codeword slots left for the length descriptor, data and padding.
    pub fn data_codewords(&self) -> usize {
        (self.rows * self.columns).saturating_sub(self.ec_codewords())
    }

    /// Largest byte string that fits once the length descriptor and the
    /// byte-compaction latch are accounted for.
    pub fn byte_capacity(&self) -> usize {
        let n = self.data_codewords().saturating_sub(2);
        6 * (n / 5) + n % 5
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(1..=30).contains(&self.columns) {
            return Err(ProfileError::Geometry(format!("columns {} outside 1..=30", self.columns)));
        }
        if !(3..=90).contains(&self.rows) {
            return Err(ProfileError::Geometry(format!("rows {} outside 3..=90", self.rows)));
        }
        if self.ec_level > 8 {
            return Err(ProfileError::Geometry(format!("ec level {} outside 0..=8", self.ec_level)));
        }
        if self.rows * self.columns > 928 {
            return Err(ProfileError::Geometry(format!(
                "{} codewords exceed the 928 symbol maximum",
                self.rows * self.columns
            )));
        }
        if self.data_codewords() < 3 {
            return Err(ProfileError::Geometry("no room for data after error correction".into()));
        }
        Ok(())
    }
}

/// Pixel scale of a rendered 2D symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterScale {
    pub module_px: u32,
    pub row_px: u32,
    pub quiet_zone_modules: u32,
}

/// Page size, margins and placement rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_top_cm: f32,
    pub margin_left_cm: f32,
    pub margin_right_cm: f32,
    pub margin_bottom_cm: f32,
    pub spacing_cm: f32,
    pub fold_gap_cm: f32,
    pub fold_after: usize,
    pub exclusion_zone_cm: f32,
    pub symbols_per_page: usize,
    /// Drawn symbol size before rotation.
    pub symbol_width_cm: f32,
    pub symbol_height_cm: f32,
}

impl PageGeometry {
    pub fn cm(value: f32) -> f32 {
        value * page::CM_TO_POINTS
    }
}

/// Fields written into the linking 1D symbol of each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingProfile {
    pub form_summary: u16,
    pub form_data: u16,
    pub version: u8,
    pub organization: String,
    pub has_2d: u8,
    pub orientation: u8,
    pub position_id: u8,
}

impl LinkingProfile {
    fn current() -> Self {
        Self {
            form_summary: linking::FORM_SUMMARY,
            form_data: linking::FORM_DATA,
            version: linking::VERSION_CURRENT,
            organization: linking::ORGANIZATION.to_string(),
            has_2d: linking::HAS_2D_CURRENT,
            orientation: linking::ORIENTATION_LANDSCAPE,
            position_id: linking::POSITION_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodecProfile {
    pub geometry: SymbolGeometry,
    pub raster: RasterScale,
    pub page: PageGeometry,
    pub linking: LinkingProfile,
    pub variant: WireVariant,
    pub compression: CompressionScheme,
    pub compression_level: u32,
    /// Direct-variant bytes per symbol; `None` is the 470-byte default. The
    /// chunked variant derives its own and rejects an explicit value.
    pub capacity: Option<usize>,
    pub transforms: Vec<Transform>,
    pub harvest_depth: usize,
}

impl Default for CodecProfile {
    fn default() -> Self {
        Self {
            geometry: SymbolGeometry {
                columns: symbol::COLUMNS,
                rows: symbol::ROWS,
                ec_level: symbol::EC_LEVEL,
            },
            raster: RasterScale { module_px: 1, row_px: 1, quiet_zone_modules: 0 },
            page: PageGeometry {
                width_pt: page::WIDTH_PT,
                height_pt: page::HEIGHT_PT,
                margin_top_cm: page::MARGIN_TOP_CM,
                margin_left_cm: page::MARGIN_LEFT_CM,
                margin_right_cm: page::MARGIN_RIGHT_CM,
                margin_bottom_cm: page::MARGIN_BOTTOM_CM,
                spacing_cm: page::SYMBOL_SPACING_CM,
                fold_gap_cm: page::FOLD_GAP_CM,
                fold_after: page::FOLD_AFTER,
                exclusion_zone_cm: page::EXCLUSION_ZONE_CM,
                symbols_per_page: page::SYMBOLS_PER_PAGE,
                symbol_width_cm: symbol::IMAGE_WIDTH_MODULES as f32 * symbol::ELEMENT_WIDTH_CM,
                symbol_height_cm: symbol::ROWS as f32 * symbol::ELEMENT_HEIGHT_CM,
            },
            linking: LinkingProfile::current(),
            variant: WireVariant::Direct,
            compression: CompressionScheme::Zlib,
            compression_level: 9,
            capacity: None,
            transforms: Transform::default_chain(),
            harvest_depth: decode::HARVEST_DEPTH,
        }
    }
}

impl CodecProfile {
    /// Build from optional overrides; `None` keeps the default.
    pub fn new(
        variant: Option<WireVariant>,
        capacity: Option<usize>,
        compression: Option<CompressionScheme>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            variant: variant.unwrap_or(defaults.variant),
            capacity: capacity.or(defaults.capacity),
            compression: compression.unwrap_or(defaults.compression),
            ..defaults
        }
    }

    /// Chunked/gzip generation with its linking-symbol version and flag.
    pub fn legacy() -> Self {
        let mut profile = Self::default();
        profile.variant = WireVariant::Chunked;
        profile.compression = CompressionScheme::Gzip;
        profile.linking.version = linking::VERSION_LEGACY;
        profile.linking.has_2d = linking::HAS_2D_LEGACY;
        profile
    }

    pub fn with_variant(mut self, variant: WireVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_compression(mut self, scheme: CompressionScheme, level: u32) -> Self {
        self.compression = scheme;
        self.compression_level = level;
        self
    }

    pub fn with_raster(mut self, raster: RasterScale) -> Self {
        self.raster = raster;
        self
    }

    pub fn with_transforms(mut self, transforms: Vec<Transform>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Bytes of compressed payload carried by one symbol under the active variant.
    pub fn segment_capacity(&self) -> usize {
        match self.variant {
            WireVariant::Direct => self.capacity.unwrap_or(constants::DIRECT_SEGMENT_CAPACITY),
            WireVariant::Chunked => self.chunked_capacity(),
        }
    }

    /// Largest chunk whose header plus Base64 text still fits one symbol.
    pub fn chunked_capacity(&self) -> usize {
        let text_bytes = 3 * (self.geometry.byte_capacity() / 4);
        text_bytes.saturating_sub(crate::headers::ChunkHeader::MAX_LEN)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        self.geometry.validate()?;

        if self.raster.module_px == 0 || self.raster.row_px == 0 {
            return Err(ProfileError::Raster("module and row size must be non-zero".into()));
        }
        if let (WireVariant::Chunked, Some(requested)) = (self.variant, self.capacity) {
            return Err(ProfileError::CapacityNotApplicable(requested));
        }
        let capacity = self.segment_capacity();
        if capacity == 0 {
            return Err(ProfileError::Capacity { requested: 0, max: self.geometry.byte_capacity() });
        }
        if self.variant == WireVariant::Direct && capacity > self.geometry.byte_capacity() {
            return Err(ProfileError::Capacity {
                requested: capacity,
                max: self.geometry.byte_capacity(),
            });
        }
        if self.page.symbols_per_page == 0 {
            return Err(ProfileError::Layout("symbols per page must be non-zero".into()));
        }
        if self.compression_level > 9 {
            return Err(ProfileError::Compression(self.compression_level));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    Geometry(String),
    Raster(String),
    Capacity { requested: usize, max: usize },
    /// Explicit capacity on a variant that derives its own.
    CapacityNotApplicable(usize),
    Layout(String),
    Compression(u32),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::Geometry(msg) => write!(f, "invalid symbol geometry: {}", msg),
            ProfileError::Raster(msg) => write!(f, "invalid raster scale: {}", msg),
            ProfileError::Capacity { requested, max } => {
                write!(f, "segment capacity {} exceeds symbol capacity {}", requested, max)
            }
            ProfileError::CapacityNotApplicable(requested) => write!(
                f,
                "segment capacity {} cannot be set for the chunked variant, which derives its own",
                requested
            ),
            ProfileError::Layout(msg) => write!(f, "invalid page layout: {}", msg),
            ProfileError::Compression(level) => write!(f, "compression level {} outside 0..=9", level),
        }
    }
}

impl std::error::Error for ProfileError {}
