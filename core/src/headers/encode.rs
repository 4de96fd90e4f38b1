//! headers/encode.rs
//! Header serialisation. Both encoders validate before writing.

use crate::headers::types::{ChunkHeader, HeaderError, LinkingCode, CHUNK_DELIMITER};

/// Serialise `id|index|total|`.
pub fn encode_chunk_header(h: &ChunkHeader) -> Result<Vec<u8>, HeaderError> {
    h.validate()?;

    let mut out = Vec::with_capacity(ChunkHeader::MAX_LEN);
    out.extend_from_slice(h.document_id.as_bytes());
    out.push(CHUNK_DELIMITER);
    out.extend_from_slice(h.index.to_string().as_bytes());
    out.push(CHUNK_DELIMITER);
    out.extend_from_slice(h.total.to_string().as_bytes());
    out.push(CHUNK_DELIMITER);
    Ok(out)
}

/// Header followed by the chunk bytes.
pub fn frame_chunk(h: &ChunkHeader, data: &[u8]) -> Result<Vec<u8>, HeaderError> {
    let mut out = encode_chunk_header(h)?;
    out.extend_from_slice(data);
    Ok(out)
}

/// Serialise the 16-digit linking record.
pub fn encode_linking_code(code: &LinkingCode) -> Result<String, HeaderError> {
    code.validate()?;

    let text = format!(
        "{:03}{:02}{}{:03}{}{}{}",
        code.form, code.version, code.organization, code.page, code.has_2d, code.orientation, code.position
    );
    debug_assert_eq!(text.len(), LinkingCode::LEN);
    Ok(text)
}
