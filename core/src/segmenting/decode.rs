use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;

use crate::headers::{decode_chunk_header, ChunkHeader};
use crate::segmenting::types::SegmentError;

/// A decoded chunked-variant symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedPart {
    /// 1-based page the symbol was read from.
    pub page: u32,
    pub header: ChunkHeader,
    pub data: Vec<u8>,
}

/// A decoded direct-variant symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPart {
    pub page: u32,
    pub data: Vec<u8>,
}

/// Sequence problems found while reassembling chunked symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceIssue {
    Missing { index: u32, total: u32 },
    Duplicate { page: u32, index: u32 },
    OutOfRange { page: u32, index: u32, total: u32 },
    DocumentMismatch { page: u32, expected: String, found: String },
    TotalMismatch { page: u32, expected: u32, found: u32 },
}

impl fmt::Display for SequenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceIssue::Missing { index, total } => write!(f, "Missing chunk {} of {}", index, total),
            SequenceIssue::Duplicate { page, index } => {
                write!(f, "Page {}: duplicate chunk {} with different content", page, index)
            }
            SequenceIssue::OutOfRange { page, index, total } => {
                write!(f, "Page {}: chunk index {} outside 1..={}", page, index, total)
            }
            SequenceIssue::DocumentMismatch { page, expected, found } => {
                write!(f, "Page {}: barcode ID mismatch (expected {}, found {})", page, expected, found)
            }
            SequenceIssue::TotalMismatch { page, expected, found } => {
                write!(f, "Page {}: total chunks mismatch (expected {}, found {})", page, expected, found)
            }
        }
    }
}

/// Reassembled (still padded) compressed stream plus what was learned on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reassembly {
    pub bytes: Vec<u8>,
    pub document_id: Option<String>,
    pub total: Option<u32>,
    pub segments: usize,
    pub issues: Vec<SequenceIssue>,
}

impl Reassembly {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty() && self.segments > 0
    }
}

/// Undo the chunked variant's text transport: Base64 → `id|index|total|` + data.
pub fn unwrap_text_transport(symbol_bytes: &[u8]) -> Result<(ChunkHeader, Vec<u8>), SegmentError> {
    let end = symbol_bytes
        .iter()
        .rposition(|&b| b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let text = &symbol_bytes[..end];
    if text.is_empty() {
        return Err(SegmentError::TextTransport("no text".into()));
    }

    let raw = STANDARD
        .decode(text)
        .map_err(|e| SegmentError::TextTransport(e.to_string()))?;
    let (header, offset) = decode_chunk_header(&raw)?;
    Ok((header, raw[offset..].to_vec()))
}

/// Order chunks by embedded index and check the sequence.
///
/// The first accepted chunk fixes the document id and total; chunks that
/// disagree are reported and dropped. Every index in `1..=total` must be
/// present exactly once. Bytes of the chunks that are present are still
/// concatenated so callers get partial data.
pub fn reassemble_chunked(parts: &[ChunkedPart]) -> Reassembly {
    let mut out = Reassembly::default();
    let mut accepted: BTreeMap<u32, &[u8]> = BTreeMap::new();

    for part in parts {
        let h = &part.header;

        match &out.document_id {
            None => out.document_id = Some(h.document_id.clone()),
            Some(expected) if *expected != h.document_id => {
                out.issues.push(SequenceIssue::DocumentMismatch {
                    page: part.page,
                    expected: expected.clone(),
                    found: h.document_id.clone(),
                });
                continue;
            }
            Some(_) => {}
        }

        match out.total {
            None => out.total = Some(h.total),
            Some(expected) if expected != h.total => {
                out.issues.push(SequenceIssue::TotalMismatch { page: part.page, expected, found: h.total });
                continue;
            }
            Some(_) => {}
        }

        if !h.in_range() {
            out.issues.push(SequenceIssue::OutOfRange { page: part.page, index: h.index, total: h.total });
            continue;
        }

        match accepted.get(&h.index) {
            Some(existing) if *existing == part.data.as_slice() => {
                debug!("page {}: repeated chunk {} ignored", part.page, h.index);
            }
            Some(_) => out.issues.push(SequenceIssue::Duplicate { page: part.page, index: h.index }),
            None => {
                accepted.insert(h.index, &part.data);
            }
        }
    }

    if let Some(total) = out.total {
        for index in 1..=total {
            if !accepted.contains_key(&index) {
                out.issues.push(SequenceIssue::Missing { index, total });
            }
        }
    }

    out.segments = accepted.len();
    out.bytes = accepted.values().flat_map(|d| d.iter().copied()).collect();
    out
}

/// Concatenate direct-variant chunks in encounter order. There is no index to
/// check against, so this never reports sequence issues.
pub fn reassemble_direct(parts: &[DirectPart]) -> Reassembly {
    Reassembly {
        bytes: parts.iter().flat_map(|p| p.data.iter().copied()).collect(),
        document_id: None,
        total: Some(parts.len() as u32),
        segments: parts.len(),
        issues: Vec::new(),
    }
}
