use std::io;

use crate::{
    compression::CompressionError,
    config::ProfileError,
    document::DocumentError,
    headers::HeaderError,
    segmenting::SegmentError,
    symbol::SymbolError,
    validate::IssueKind,
};

/// Unified codec error covering I/O, profile, compression, framing, symbols and documents.
/// - Ergonomic `From<T>` impls enable `?` across the pipeline.
/// - Decode-side problems that still leave a report are recorded on the
///   `ValidationResult` instead; only unopenable input ends up here.
#[derive(Debug)]
pub enum CodecError {
    /// I/O error.
    Io(io::Error),

    /// Profile rejected by `CodecProfile::validate`.
    Profile(ProfileError),

    /// Compression/decompression error.
    Compression(CompressionError),

    /// Segment-level error (split or framing).
    Segment(SegmentError),

    /// Chunk header or linking record error.
    Header(HeaderError),

    /// 2D or linking symbol error.
    Symbol(SymbolError),

    /// PDF assembly, parsing or image decoding error.
    Document(DocumentError),

    /// Payload is not usable as input (empty, not UTF-8).
    Payload(String),

    /// Strict mode: a field the cover page needs is absent from the payload.
    MissingField(&'static str),
}

impl CodecError {
    /// Report category of the failure. Profile, segmenting and symbol errors
    /// mean the mandated symbol geometry could not be rendered.
    pub fn issue_kind(&self) -> Option<IssueKind> {
        match self {
            CodecError::Profile(_) | CodecError::Segment(_) | CodecError::Symbol(_) => {
                Some(IssueKind::RenderingFailure)
            }
            CodecError::Payload(_) | CodecError::MissingField(_) => Some(IssueKind::StructuralError),
            CodecError::Header(_) => Some(IssueKind::FormatUnrecognized),
            CodecError::Io(_) | CodecError::Compression(_) | CodecError::Document(_) => None,
        }
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Io(e) => write!(f, "I/O error: {}", e),
            CodecError::Profile(e) => write!(f, "profile error: {}", e),
            CodecError::Compression(e) => write!(f, "compression error: {}", e),
            CodecError::Segment(e) => write!(f, "segment error: {}", e),
            CodecError::Header(e) => write!(f, "header error: {}", e),
            CodecError::Symbol(e) => write!(f, "symbol error: {}", e),
            CodecError::Document(e) => write!(f, "document error: {}", e),
            CodecError::Payload(msg) => write!(f, "payload error: {}", msg),
            CodecError::MissingField(field) => write!(f, "required field '{}' missing from payload", field),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            CodecError::Document(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}

impl From<ProfileError> for CodecError {
    fn from(e: ProfileError) -> Self {
        CodecError::Profile(e)
    }
}

impl From<CompressionError> for CodecError {
    fn from(e: CompressionError) -> Self {
        CodecError::Compression(e)
    }
}

impl From<SegmentError> for CodecError {
    fn from(e: SegmentError) -> Self {
        CodecError::Segment(e)
    }
}

impl From<HeaderError> for CodecError {
    fn from(e: HeaderError) -> Self {
        CodecError::Header(e)
    }
}

impl From<SymbolError> for CodecError {
    fn from(e: SymbolError) -> Self {
        CodecError::Symbol(e)
    }
}

impl From<DocumentError> for CodecError {
    fn from(e: DocumentError) -> Self {
        CodecError::Document(e)
    }
}
