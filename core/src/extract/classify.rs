//! extract/classify.rs
//! Decide which wire variant a decoded 2D symbol belongs to.
//!
//! Industry notes:
//! - `classify` looks at one symbol's bytes and nothing else, so the verdict
//!   for the same bytes never changes.
//! - Direct continuation symbols are raw deflate data and carry no marker.
//!   They are only recognisable by position: `classify_document` treats an
//!   unrecognised symbol as a continuation once a direct header symbol has
//!   been seen.
//! - Chunked text always starts with the Base64 of a hex digit, which is
//!   never a zlib or gzip magic, so the magic test can run first.

use std::fmt;

use log::debug;

use crate::compression::CompressionScheme;
use crate::extract::reader::SymbolReading;
use crate::headers::ChunkHeader;
use crate::segmenting::{unwrap_text_transport, ChunkedPart, DirectPart};
use crate::utils::hex_preview;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFormat {
    /// Text transport with a parsed `id|index|total|` header.
    Chunked { header: ChunkHeader, data: Vec<u8> },
    /// Starts a compressed stream.
    Direct { scheme: CompressionScheme },
    Unknown,
}

impl WireFormat {
    pub fn name(&self) -> &'static str {
        match self {
            WireFormat::Chunked { .. } => "chunked",
            WireFormat::Direct { .. } => "direct",
            WireFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Chunked { header, .. } => {
                write!(f, "chunked {}/{} of {}", header.index, header.total, header.document_id)
            }
            WireFormat::Direct { scheme } => write!(f, "direct ({})", scheme),
            WireFormat::Unknown => f.write_str("unknown"),
        }
    }
}

/// Classify one symbol's bytes.
pub fn classify(bytes: &[u8]) -> WireFormat {
    if let Some(scheme) = CompressionScheme::sniff(bytes) {
        return WireFormat::Direct { scheme };
    }
    match unwrap_text_transport(bytes) {
        Ok((header, data)) => WireFormat::Chunked { header, data },
        Err(_) => WireFormat::Unknown,
    }
}

/// Which variants a document's symbols were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Chunked,
    Direct,
    Mixed,
    Empty,
}

impl DocumentFormat {
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Chunked => "chunked",
            DocumentFormat::Direct => "direct",
            DocumentFormat::Mixed => "mixed",
            DocumentFormat::Empty => "none",
        }
    }
}

/// Readings sorted by variant, each list in read order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedDocument {
    pub chunked: Vec<ChunkedPart>,
    pub direct: Vec<DirectPart>,
    /// Scheme sniffed from the first direct symbol.
    pub direct_scheme: Option<CompressionScheme>,
    /// `(page, hex preview)` of symbols matching neither variant.
    pub unknown: Vec<(u32, String)>,
}

impl ClassifiedDocument {
    pub fn format(&self) -> DocumentFormat {
        match (self.chunked.is_empty(), self.direct.is_empty()) {
            (false, false) => DocumentFormat::Mixed,
            (false, true) => DocumentFormat::Chunked,
            (true, false) => DocumentFormat::Direct,
            (true, true) => DocumentFormat::Empty,
        }
    }

    /// Variant with the most readings; chunked wins a tie since its headers
    /// let it be checked.
    pub fn dominant(&self) -> DocumentFormat {
        match self.format() {
            DocumentFormat::Mixed if self.direct.len() > self.chunked.len() => DocumentFormat::Direct,
            DocumentFormat::Mixed => DocumentFormat::Chunked,
            other => other,
        }
    }
}

/// Classify every reading of one document in read order.
pub fn classify_document(readings: &[SymbolReading]) -> ClassifiedDocument {
    let mut out = ClassifiedDocument::default();

    for reading in readings {
        let verdict = classify(&reading.bytes);
        debug!("page {}: /{} classified as {}", reading.page, reading.image, verdict);

        match verdict {
            WireFormat::Direct { scheme } => {
                if out.direct_scheme.is_none() {
                    out.direct_scheme = Some(scheme);
                }
                out.direct.push(DirectPart { page: reading.page, data: reading.bytes.clone() });
            }
            WireFormat::Chunked { header, data } => {
                out.chunked.push(ChunkedPart { page: reading.page, header, data });
            }
            WireFormat::Unknown if out.direct_scheme.is_some() => {
                out.direct.push(DirectPart { page: reading.page, data: reading.bytes.clone() });
            }
            WireFormat::Unknown => {
                out.unknown.push((reading.page, hex_preview(&reading.bytes, 16)));
            }
        }
    }
    out
}
