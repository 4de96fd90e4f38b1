//! headers/decode.rs
//! Header parsing. Parsers check structure only; semantic checks (expected
//! form, index range, id consistency) are left to the caller.

use crate::headers::types::{ChunkHeader, HeaderError, LinkingCode, CHUNK_DELIMITER};

/// Parse `id|index|total|` at the start of `buf`. Returns the header and the
/// offset where chunk data begins.
pub fn decode_chunk_header(buf: &[u8]) -> Result<(ChunkHeader, usize), HeaderError> {
    if buf.is_empty() {
        return Err(HeaderError::Truncated);
    }

    let window = &buf[..buf.len().min(ChunkHeader::MAX_LEN + 16)];
    let delims: Vec<usize> = window
        .iter()
        .enumerate()
        .filter_map(|(i, &b)| (b == CHUNK_DELIMITER).then_some(i))
        .take(3)
        .collect();
    if delims.len() < 3 {
        return Err(HeaderError::MissingDelimiter { found: delims.len() });
    }

    let id = std::str::from_utf8(&buf[..delims[0]])
        .map_err(|_| HeaderError::InvalidDocumentId(String::from_utf8_lossy(&buf[..delims[0]]).into_owned()))?;
    if id.is_empty() || id.chars().any(|c| c.is_control()) {
        return Err(HeaderError::InvalidDocumentId(id.to_string()));
    }

    let index = parse_number(&buf[delims[0] + 1..delims[1]], "index")?;
    let total = parse_number(&buf[delims[1] + 1..delims[2]], "total")?;

    Ok((ChunkHeader { document_id: id.to_string(), index, total }, delims[2] + 1))
}

fn parse_number(raw: &[u8], field: &'static str) -> Result<u32, HeaderError> {
    let text = std::str::from_utf8(raw).unwrap_or_default();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HeaderError::InvalidNumber { field, raw: String::from_utf8_lossy(raw).into_owned() });
    }
    text.parse::<u32>()
        .map_err(|_| HeaderError::InvalidNumber { field, raw: text.to_string() })
}

/// Parse the 16-digit linking record. Only length and digit layout are
/// enforced here.
pub fn decode_linking_code(text: &str) -> Result<LinkingCode, HeaderError> {
    if text.len() != LinkingCode::LEN {
        return Err(HeaderError::InvalidLength { expected: LinkingCode::LEN, actual: text.len() });
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HeaderError::InvalidNumber { field: "linking code", raw: text.to_string() });
    }

    let digits = |from: usize, to: usize| -> u16 {
        text.as_bytes()[from..to].iter().fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    };

    Ok(LinkingCode {
        form: digits(0, 3),
        version: digits(3, 5) as u8,
        organization: text[5..10].to_string(),
        page: digits(10, 13),
        has_2d: digits(13, 14) as u8,
        orientation: digits(14, 15) as u8,
        position: digits(15, 16) as u8,
    })
}
