use std::fmt;

use image::GrayImage;

use crate::config::SymbolGeometry;

/// Rendered 2D symbol: one byte per pixel, 0 = bar, 255 = space.
#[derive(Debug, Clone)]
pub struct SymbolImage {
    pub raster: GrayImage,
    pub geometry: SymbolGeometry,
    /// Data codewords actually used (length descriptor included), before padding.
    pub used_codewords: usize,
}

impl SymbolImage {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Bytes recovered from one 2D symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub bytes: Vec<u8>,
    pub columns: usize,
    pub rows: usize,
    pub ec_level: u8,
    /// Codewords repaired by error correction (erasures included).
    pub corrected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Input does not fit the configured geometry.
    Capacity { len: usize, max: usize },
    /// Geometry rejected before rendering.
    Geometry(String),
    /// No start pattern / indicators found.
    NotFound,
    /// Row structure is inconsistent or incomplete.
    Structure(String),
    /// More damage than error correction can repair.
    Uncorrectable(String),
    /// Compaction mode this codec does not produce.
    UnsupportedMode(u16),
    /// Codeword stream violates its own length or compaction rules.
    Malformed(String),
    /// Linking-symbol payload is not an even run of digits.
    InvalidText(String),
    /// Linking-symbol check character disagrees.
    Checksum { expected: u16, actual: u16 },
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::Capacity { len, max } => {
                write!(f, "{} bytes exceed symbol capacity {}", len, max)
            }
            SymbolError::Geometry(msg) => write!(f, "invalid symbol geometry: {}", msg),
            SymbolError::NotFound => write!(f, "no symbol found"),
            SymbolError::Structure(msg) => write!(f, "symbol structure: {}", msg),
            SymbolError::Uncorrectable(msg) => write!(f, "uncorrectable symbol: {}", msg),
            SymbolError::UnsupportedMode(cw) => write!(f, "unsupported compaction mode {}", cw),
            SymbolError::Malformed(msg) => write!(f, "malformed codewords: {}", msg),
            SymbolError::InvalidText(msg) => write!(f, "invalid linking text: {}", msg),
            SymbolError::Checksum { expected, actual } => {
                write!(f, "check character mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for SymbolError {}
