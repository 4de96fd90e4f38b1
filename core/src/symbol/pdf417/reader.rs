//! symbol/pdf417/reader.rs
//! Rendered symbol back to bytes.
//!
//! Industry notes:
//! - Works on clean, axis-aligned rasters such as images extracted from a PDF.
//!   Each pixel row is thresholded and run-length encoded; codewords are found
//!   by normalising every 8 runs to 17 modules, so any integer scale works.
//! - Geometry is never assumed: rows, columns and error-correction level are
//!   voted from the row indicators, and missing rows are left to error
//!   correction.

use std::collections::HashMap;

use image::{imageops, GrayImage};
use log::{debug, trace};

use crate::symbol::pdf417::compaction::decode_codewords;
use crate::symbol::pdf417::ecc::correct;
use crate::symbol::pdf417::tables::{tables, Pattern, MODULES_PER_CODEWORD, START_PATTERN, STOP_PATTERN};
use crate::symbol::types::{DecodedSymbol, SymbolError};

const DARK_THRESHOLD: u8 = 128;

#[derive(Debug, Clone)]
struct RowRead {
    slot: usize,
    left: u16,
    right: u16,
    data: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    rows: usize,
    columns: usize,
    ec_level: u8,
}

/// Read one symbol, trying all four right-angle orientations.
pub fn read_symbol(img: &GrayImage) -> Result<DecodedSymbol, SymbolError> {
    let mut last = match read_upright(img) {
        Ok(decoded) => return Ok(decoded),
        Err(e) => e,
    };

    let rotations: [fn(&GrayImage) -> GrayImage; 3] = [imageops::rotate90, imageops::rotate270, imageops::rotate180];
    for rotate in rotations {
        match read_upright(&rotate(img)) {
            Ok(decoded) => return Ok(decoded),
            // Keep the most specific failure: a symbol that was found but not
            // decoded says more than "not found".
            Err(SymbolError::NotFound) => {}
            Err(e) => last = e,
        }
    }
    Err(last)
}

fn read_upright(img: &GrayImage) -> Result<DecodedSymbol, SymbolError> {
    let mut reads = Vec::new();
    let mut previous: Option<Vec<u16>> = None;

    for y in 0..img.height() {
        let runs = row_runs(img, y);
        let Some(read) = read_row(&runs) else {
            previous = None;
            continue;
        };
        // Consecutive pixel rows of the same symbol row repeat each other.
        let mut key = Vec::with_capacity(read.data.len() + 2);
        key.push(read.left);
        key.extend_from_slice(&read.data);
        key.push(read.right);
        if previous.as_ref() == Some(&key) {
            continue;
        }
        previous = Some(key);
        reads.push(read);
    }

    if reads.is_empty() {
        return Err(SymbolError::NotFound);
    }
    let layout = vote_layout(&reads)?;
    trace!("symbol layout {:?} from {} row reads", layout, reads.len());
    decode_matrix(&reads, layout)
}

/// Alternating run lengths of one pixel row, starting with the first dark run.
fn row_runs(img: &GrayImage, y: u32) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut dark = false;
    let mut len = 0u32;
    let mut seen_dark = false;

    for x in 0..img.width() {
        let is_dark = img.get_pixel(x, y)[0] < DARK_THRESHOLD;
        if !seen_dark {
            if !is_dark {
                continue;
            }
            seen_dark = true;
            dark = true;
        }
        if is_dark == dark {
            len += 1;
        } else {
            runs.push(len);
            dark = is_dark;
            len = 1;
        }
    }
    if seen_dark {
        runs.push(len);
    }
    runs
}

/// Round each run to whole modules of a `units`-module element.
fn normalise(runs: &[u32], units: u32) -> Option<Vec<u8>> {
    let total: u32 = runs.iter().sum();
    if total == 0 {
        return None;
    }
    let widths: Vec<u8> = runs
        .iter()
        .map(|&w| ((2 * w * units + total) / (2 * total)) as u8)
        .collect();
    if widths.iter().any(|&w| w == 0) || widths.iter().map(|&w| u32::from(w)).sum::<u32>() != units {
        return None;
    }
    Some(widths)
}

fn read_row(runs: &[u32]) -> Option<RowRead> {
    let t = tables();
    let start_units: u32 = START_PATTERN.iter().map(|&w| u32::from(w)).sum();
    let stop_units: u32 = STOP_PATTERN.iter().map(|&w| u32::from(w)).sum();

    // Runs alternate dark/light from index 0, so bar-first windows start at even offsets.
    let start = (0..(runs.len() + 1).saturating_sub(8))
        .step_by(2)
        .find(|&i| normalise(&runs[i..i + 8], start_units).as_deref() == Some(&START_PATTERN[..]))?;

    let mut pos = start + 8;
    let mut codewords: Vec<(usize, u16)> = Vec::new();
    let mut stopped = false;

    while pos + 8 <= runs.len() {
        if let Some(widths) = normalise(&runs[pos..pos + 8], MODULES_PER_CODEWORD) {
            let mut pattern: Pattern = [0; 8];
            pattern.copy_from_slice(&widths);
            if let Some(hit) = t.lookup(&pattern) {
                codewords.push(hit);
                pos += 8;
                continue;
            }
        }
        if pos + 9 <= runs.len()
            && normalise(&runs[pos..pos + 9], stop_units).as_deref() == Some(&STOP_PATTERN[..])
        {
            stopped = true;
        }
        break;
    }

    if !stopped || codewords.len() < 3 {
        return None;
    }
    let slot = codewords[0].0;
    if codewords.iter().any(|&(s, _)| s != slot) {
        return None;
    }
    let (_, left) = codewords[0];
    let (_, right) = codewords[codewords.len() - 1];
    if left / 30 != right / 30 {
        return None;
    }
    let data = codewords[1..codewords.len() - 1].iter().map(|&(_, cw)| cw).collect();
    Some(RowRead { slot, left, right, data })
}

fn majority(values: &[usize]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts.into_iter().max_by_key(|&(v, n)| (n, std::cmp::Reverse(v))).map(|(v, _)| v)
}

fn vote_layout(reads: &[RowRead]) -> Result<Layout, SymbolError> {
    let mut rows_part = Vec::new();
    let mut cols_part = Vec::new();
    let mut ec_part = Vec::new();

    for read in reads {
        let left = usize::from(read.left % 30);
        let right = usize::from(read.right % 30);
        match read.slot {
            0 => {
                rows_part.push(left);
                cols_part.push(right);
            }
            1 => {
                ec_part.push(left);
                rows_part.push(right);
            }
            _ => {
                cols_part.push(left);
                ec_part.push(right);
            }
        }
    }

    let rows_part = majority(&rows_part).ok_or_else(|| SymbolError::Structure("row count unreadable".into()))?;
    let ec_part = majority(&ec_part).ok_or_else(|| SymbolError::Structure("ec level unreadable".into()))?;
    let columns = majority(&cols_part)
        .map(|c| c + 1)
        .or_else(|| majority(&reads.iter().map(|r| r.data.len()).collect::<Vec<_>>()))
        .ok_or_else(|| SymbolError::Structure("column count unreadable".into()))?;

    let layout = Layout {
        rows: 3 * rows_part + ec_part % 3 + 1,
        columns,
        ec_level: (ec_part / 3) as u8,
    };
    if layout.ec_level > 8 || layout.rows < 3 || layout.rows * layout.columns > 928 {
        return Err(SymbolError::Structure(format!("implausible layout {:?}", layout)));
    }
    Ok(layout)
}

fn decode_matrix(reads: &[RowRead], layout: Layout) -> Result<DecodedSymbol, SymbolError> {
    let k = 2usize << layout.ec_level;
    let total = layout.rows * layout.columns;
    if total <= k {
        return Err(SymbolError::Structure("no data codewords".into()));
    }

    let mut matrix: Vec<Option<u16>> = vec![None; total];
    for read in reads {
        let row = 3 * usize::from(read.left / 30) + read.slot;
        if row >= layout.rows || read.data.len() != layout.columns {
            continue;
        }
        let cells = &mut matrix[row * layout.columns..(row + 1) * layout.columns];
        if cells[0].is_none() {
            for (cell, &cw) in cells.iter_mut().zip(&read.data) {
                *cell = Some(cw);
            }
        }
    }

    let missing = matrix.iter().filter(|c| c.is_none()).count();
    if missing > k / 2 {
        return Err(SymbolError::Uncorrectable(format!("{} of {} codewords missing", missing, total)));
    }
    let mut codewords: Vec<u16> = matrix.into_iter().map(|c| c.unwrap_or(0)).collect();
    let corrected = correct(&mut codewords, k)?;
    if corrected > 0 {
        debug!("error correction repaired {} codewords ({} missing)", corrected, missing);
    }

    let data_len = total - k;
    let descriptor = usize::from(codewords[0]);
    if descriptor != data_len {
        return Err(SymbolError::Malformed(format!(
            "length descriptor {} but {} data codewords",
            descriptor, data_len
        )));
    }
    let bytes = decode_codewords(&codewords[1..data_len])?;

    Ok(DecodedSymbol {
        bytes,
        columns: layout.columns,
        rows: layout.rows,
        ec_level: layout.ec_level,
        corrected: corrected.max(missing),
    })
}
