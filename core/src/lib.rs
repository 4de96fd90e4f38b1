//! etax-core
//!
//! Barcode transport codec for eCH-0196 electronic tax statements.
//! Pure Rust: no FFI, no external barcode engine.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod io;
pub mod types;
pub mod utils;

// Payload framing
pub mod compression;
pub mod headers;
pub mod segmenting;

// Symbols and the PDF container
pub mod document;
pub mod raster;
pub mod symbol;

// Decode side
pub mod extract;
pub mod validate;

pub mod telemetry;

// Public entry points
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::CompressionScheme;
    pub use crate::config::CodecProfile;
    pub use crate::document::CoverSummary;
    pub use crate::io::{InputSource, OutputSink};
    pub use crate::pipeline::{decode_document, encode_document, DecodeParams, EncodeParams, EncodedDocument};
    pub use crate::segmenting::WireVariant;
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::CodecError;
    pub use crate::validate::{IssueKind, SchemaValidator, ValidationResult, XsdDeclarationValidator};
}
