//! symbol/pdf417/compaction.rs
//! Byte compaction: arbitrary bytes to base-900 codewords and back.
//!
//! Industry notes:
//! - Latch 924 is used when the byte count is a multiple of 6, latch 901
//!   otherwise. Each full 6-byte group becomes 5 base-900 codewords; with 901
//!   the leftover bytes are written one per codeword.
//! - Codeword 900 after the compacted data is padding. It is also the text
//!   latch, so the reader decodes text (and numeric) compaction as well:
//!   symbols from other writers usually start in text mode.

use byteorder::{BigEndian, ByteOrder};

use crate::symbol::types::SymbolError;

pub const LATCH_BYTE: u16 = 901;
pub const LATCH_BYTE_SIX: u16 = 924;
pub const SHIFT_BYTE: u16 = 913;
pub const PAD: u16 = 900;
pub const LATCH_NUMERIC: u16 = 902;

const GROUP_NUMERIC: usize = 15;
const MIXED_CHARS: &[u8; 25] = b"0123456789&\r\t,:#-.$/+%*=^";
const PUNCT_CHARS: &[u8; 29] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";

const GROUP_BYTES: usize = 6;
const GROUP_CODEWORDS: usize = 5;

/// Latch codeword followed by the compacted data.
pub fn encode_bytes(data: &[u8]) -> Vec<u16> {
    let latch = if !data.is_empty() && data.len() % GROUP_BYTES == 0 { LATCH_BYTE_SIX } else { LATCH_BYTE };
    let mut out = Vec::with_capacity(1 + data.len() * GROUP_CODEWORDS / GROUP_BYTES + GROUP_BYTES);
    out.push(latch);

    let mut groups = data.chunks_exact(GROUP_BYTES);
    for group in &mut groups {
        let mut value = BigEndian::read_u48(group);
        let mut digits = [0u16; GROUP_CODEWORDS];
        for digit in digits.iter_mut().rev() {
            *digit = (value % 900) as u16;
            value /= 900;
        }
        out.extend_from_slice(&digits);
    }
    out.extend(groups.remainder().iter().map(|&b| u16::from(b)));
    out
}

/// Codewords needed by `encode_bytes` for `len` bytes, latch included.
pub fn encoded_len(len: usize) -> usize {
    1 + (len / GROUP_BYTES) * GROUP_CODEWORDS + len % GROUP_BYTES
}

/// Decode data codewords that follow the length descriptor.
pub fn decode_codewords(codewords: &[u16]) -> Result<Vec<u8>, SymbolError> {
    let mut out = Vec::with_capacity(codewords.len() * GROUP_BYTES / GROUP_CODEWORDS);
    let mut text = TextState::default();
    let mut pos = 0;

    while pos < codewords.len() {
        let cw = codewords[pos];
        pos += 1;
        match cw {
            LATCH_BYTE | LATCH_BYTE_SIX => {
                let end = run_end(codewords, pos);
                decode_run(&codewords[pos..end], cw == LATCH_BYTE_SIX, &mut out)?;
                pos = end;
            }
            LATCH_NUMERIC => {
                let end = run_end(codewords, pos);
                for group in codewords[pos..end].chunks(GROUP_NUMERIC) {
                    decode_numeric(group, &mut out)?;
                }
                pos = end;
            }
            SHIFT_BYTE => {
                let value = *codewords
                    .get(pos)
                    .ok_or_else(|| SymbolError::Malformed("byte shift at end of data".into()))?;
                out.push(byte_value(value)?);
                pos += 1;
            }
            // Trailing padding and the text latch are the same codeword.
            PAD => text = TextState::default(),
            // Every symbol starts in text compaction.
            value if value < PAD => {
                text.push((value / 30) as u8, &mut out);
                text.push((value % 30) as u8, &mut out);
            }
            other => return Err(SymbolError::UnsupportedMode(other)),
        }
    }
    Ok(out)
}

fn run_end(codewords: &[u16], pos: usize) -> usize {
    codewords[pos..]
        .iter()
        .position(|&c| c >= PAD)
        .map_or(codewords.len(), |offset| pos + offset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SubMode {
    #[default]
    Alpha,
    Lower,
    Mixed,
    Punct,
}

/// Text compaction sub-mode, with at most one pending single-character shift.
#[derive(Debug, Default)]
struct TextState {
    latched: SubMode,
    shifted: Option<SubMode>,
}

impl TextState {
    fn push(&mut self, value: u8, out: &mut Vec<u8>) {
        let shift = self.shifted.take();
        let mode = shift.unwrap_or(self.latched);
        let ch = match (mode, value) {
            (SubMode::Alpha, 0..=25) => Some(b'A' + value),
            (SubMode::Lower, 0..=25) => Some(b'a' + value),
            (SubMode::Mixed, 0..=24) => Some(MIXED_CHARS[usize::from(value)]),
            (SubMode::Punct, 0..=28) => Some(PUNCT_CHARS[usize::from(value)]),
            (SubMode::Alpha | SubMode::Lower | SubMode::Mixed, 26) => Some(b' '),
            _ => None,
        };
        if let Some(ch) = ch {
            out.push(ch);
            return;
        }
        // Control values inside a shift only act as the alpha latch.
        if shift.is_some() {
            if mode == SubMode::Punct && value == 29 {
                self.latched = SubMode::Alpha;
            }
            return;
        }
        match (mode, value) {
            (SubMode::Alpha | SubMode::Mixed, 27) => self.latched = SubMode::Lower,
            (SubMode::Alpha | SubMode::Lower, 28) => self.latched = SubMode::Mixed,
            (SubMode::Lower, 27) => self.shifted = Some(SubMode::Alpha),
            (SubMode::Mixed, 25) => self.latched = SubMode::Punct,
            (SubMode::Mixed, 28) | (SubMode::Punct, 29) => self.latched = SubMode::Alpha,
            (SubMode::Alpha | SubMode::Lower | SubMode::Mixed, 29) => self.shifted = Some(SubMode::Punct),
            _ => {}
        }
    }
}

/// Up to 15 base-900 codewords holding a decimal string behind a leading 1.
fn decode_numeric(group: &[u16], out: &mut Vec<u8>) -> Result<(), SymbolError> {
    // Little-endian decimal digits.
    let mut digits: Vec<u8> = vec![0];
    for &cw in group {
        let mut carry = u32::from(cw);
        for d in digits.iter_mut() {
            let v = u32::from(*d) * 900 + carry;
            *d = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while digits.len() > 1 && digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.pop() != Some(1) {
        return Err(SymbolError::Malformed("numeric group without leading 1".into()));
    }
    out.extend(digits.iter().rev().map(|d| b'0' + d));
    Ok(())
}

fn decode_run(run: &[u16], six: bool, out: &mut Vec<u8>) -> Result<(), SymbolError> {
    let m = run.len();
    if m == 0 {
        return Ok(());
    }
    let singles = if six {
        if m % GROUP_CODEWORDS != 0 {
            return Err(SymbolError::Malformed(format!("{} codewords after latch 924", m)));
        }
        0
    } else {
        ((m - 1) % GROUP_CODEWORDS) + 1
    };
    let grouped = m - singles;

    let mut buf = [0u8; GROUP_BYTES];
    for group in run[..grouped].chunks_exact(GROUP_CODEWORDS) {
        let value = group.iter().fold(0u64, |acc, &d| acc * 900 + u64::from(d));
        if value >= 1 << 48 {
            return Err(SymbolError::Malformed(format!("byte group value {} overflows 6 bytes", value)));
        }
        BigEndian::write_u48(&mut buf, value);
        out.extend_from_slice(&buf);
    }
    for &cw in &run[grouped..] {
        out.push(byte_value(cw)?);
    }
    Ok(())
}

fn byte_value(cw: u16) -> Result<u8, SymbolError> {
    u8::try_from(cw).map_err(|_| SymbolError::Malformed(format!("codeword {} is not a byte", cw)))
}
