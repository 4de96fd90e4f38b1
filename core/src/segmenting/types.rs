use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::headers::HeaderError;

bitflags::bitflags! {
    /// ## 🚩 Segment flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u8 {
        /// First segment; carries the compression header in the direct variant
        const FIRST = 0b0000_0001;

        /// Final segment of the payload
        const FINAL = 0b0000_0010;

        /// Segment bytes were null-padded up to capacity
        const PADDED = 0b0000_0100;
    }
}

/// Byte-framing convention used inside each 2D symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireVariant {
    /// Raw continuation bytes; order is encounter order.
    Direct,
    /// `id|index|total|` + bytes, carried as Base64 text.
    Chunked,
}

impl fmt::Display for WireVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WireVariant::Direct => "direct",
            WireVariant::Chunked => "chunked",
        })
    }
}

impl FromStr for WireVariant {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(WireVariant::Direct),
            "chunked" => Ok(WireVariant::Chunked),
            other => Err(SegmentError::Malformed(format!("unknown wire variant '{}'", other))),
        }
    }
}

/// One symbol's share of the compressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 0-based position in the payload.
    pub index: u32,
    pub total_count: u32,
    /// Unpadded payload bytes.
    pub bytes: Bytes,
    /// Null bytes appended by `padded_bytes`.
    pub padding_length: usize,
    pub flags: SegmentFlags,
}

impl Segment {
    /// 1-based index written into chunk headers.
    pub fn wire_index(&self) -> u32 {
        self.index + 1
    }

    /// Bytes plus null padding; every segment of a payload has the same length.
    pub fn padded_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + self.padding_length);
        out.extend_from_slice(&self.bytes);
        out.resize(self.bytes.len() + self.padding_length, 0);
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "Segment {{ index: {}/{}, bytes: {}, padding: {}, flags: {:?} }}",
            self.wire_index(),
            self.total_count,
            self.bytes.len(),
            self.padding_length,
            self.flags,
        )
    }
}

#[derive(Debug)]
pub enum SegmentError {
    EmptyPayload,
    ZeroCapacity,
    TooManySegments { count: usize, max: usize },
    Header(HeaderError),
    TextTransport(String),
    Malformed(String),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::EmptyPayload => write!(f, "empty payload cannot be segmented"),
            SegmentError::ZeroCapacity => write!(f, "segment capacity must be non-zero"),
            SegmentError::TooManySegments { count, max } => {
                write!(f, "{} segments exceed the chunk header limit of {}", count, max)
            }
            SegmentError::Header(e) => write!(f, "chunk header: {}", e),
            SegmentError::TextTransport(msg) => write!(f, "text transport: {}", msg),
            SegmentError::Malformed(msg) => write!(f, "malformed segment: {}", msg),
        }
    }
}

impl std::error::Error for SegmentError {}

impl From<HeaderError> for SegmentError {
    fn from(e: HeaderError) -> Self {
        SegmentError::Header(e)
    }
}
