//! symbol/pdf417/encoder.rs
//! Bytes to a rendered 2D symbol.
//!
//! Layout per row: start | left indicator | data columns | right indicator | stop.
//! Row indicators carry the row group plus one of row count, column count or
//! error-correction level, depending on the row's cluster.

use image::{GrayImage, Luma};
use log::trace;

use crate::config::{RasterScale, SymbolGeometry};
use crate::symbol::pdf417::compaction::{encode_bytes, PAD};
use crate::symbol::pdf417::ecc::ec_codewords;
use crate::symbol::pdf417::tables::{tables, MODULES_PER_CODEWORD, START_PATTERN, STOP_PATTERN};
use crate::symbol::types::{SymbolError, SymbolImage};

pub const BAR: u8 = 0;
pub const SPACE: u8 = 255;

/// Modules across one row: start, two indicators, data columns and stop.
pub fn row_modules(columns: usize) -> u32 {
    let start: u32 = START_PATTERN.iter().map(|&w| u32::from(w)).sum();
    let stop: u32 = STOP_PATTERN.iter().map(|&w| u32::from(w)).sum();
    start + stop + (columns as u32 + 2) * MODULES_PER_CODEWORD
}

/// Left and right indicator values for `row`.
pub fn row_indicators(row: usize, geometry: &SymbolGeometry) -> (u16, u16) {
    let group = 30 * (row / 3);
    let rows_part = (geometry.rows - 1) / 3;
    let cols_part = geometry.columns - 1;
    let ec_part = usize::from(geometry.ec_level) * 3 + (geometry.rows - 1) % 3;

    let (left, right) = match row % 3 {
        0 => (rows_part, cols_part),
        1 => (ec_part, rows_part),
        _ => (cols_part, ec_part),
    };
    ((group + left) as u16, (group + right) as u16)
}

/// Full codeword matrix (data, padding and error correction) for `data`.
pub fn build_codewords(data: &[u8], geometry: &SymbolGeometry) -> Result<(Vec<u16>, usize), SymbolError> {
    geometry.validate().map_err(|e| SymbolError::Geometry(e.to_string()))?;

    let capacity = geometry.data_codewords();
    let compacted = encode_bytes(data);
    let used = 1 + compacted.len();
    if used > capacity {
        return Err(SymbolError::Capacity { len: data.len(), max: geometry.byte_capacity() });
    }

    let mut codewords = Vec::with_capacity(geometry.rows * geometry.columns);
    codewords.push(capacity as u16);
    codewords.extend_from_slice(&compacted);
    codewords.resize(capacity, PAD);

    let ec = ec_codewords(&codewords, geometry.ec_codewords());
    codewords.extend(ec);
    Ok((codewords, used))
}

/// Render `data` as a symbol. At scale 1 with no quiet zone the raster is
/// exactly `row_modules(columns)` by `rows` pixels.
pub fn encode_symbol(data: &[u8], geometry: &SymbolGeometry, raster: &RasterScale) -> Result<SymbolImage, SymbolError> {
    if raster.module_px == 0 || raster.row_px == 0 {
        return Err(SymbolError::Geometry("zero raster scale".into()));
    }
    let (codewords, used) = build_codewords(data, geometry)?;
    let t = tables();

    let quiet = raster.quiet_zone_modules * raster.module_px;
    let width = row_modules(geometry.columns) * raster.module_px + 2 * quiet;
    let height = geometry.rows as u32 * raster.row_px + 2 * quiet;
    let mut img = GrayImage::from_pixel(width, height, Luma([SPACE]));

    for (row, row_codewords) in codewords.chunks(geometry.columns).enumerate() {
        let slot = row % 3;
        let (left, right) = row_indicators(row, geometry);

        let mut widths: Vec<u8> = Vec::with_capacity(8 * (geometry.columns + 2) + 17);
        widths.extend_from_slice(&START_PATTERN);
        widths.extend_from_slice(&t.pattern(slot, left));
        for &cw in row_codewords {
            widths.extend_from_slice(&t.pattern(slot, cw));
        }
        widths.extend_from_slice(&t.pattern(slot, right));
        widths.extend_from_slice(&STOP_PATTERN);

        let top = quiet + row as u32 * raster.row_px;
        let mut x = quiet;
        for (i, &w) in widths.iter().enumerate() {
            let span = u32::from(w) * raster.module_px;
            if i % 2 == 0 {
                for px in x..x + span {
                    for py in top..top + raster.row_px {
                        img.put_pixel(px, py, Luma([BAR]));
                    }
                }
            }
            x += span;
        }
    }

    trace!("rendered {} bytes into {}x{} symbol ({} codewords used)", data.len(), width, height, used);
    Ok(SymbolImage { raster: img, geometry: *geometry, used_codewords: used })
}
