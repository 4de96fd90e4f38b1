//! pipeline
//! Stable public API of the codec: text in, PDF out, and back.
//!
//! Industry notes:
//! - Both directions are synchronous and own every buffer they touch; there
//!   is no state shared between calls.
//! - Encode failures abort with `CodecError` and never yield a partial PDF.
//! - Decode failures accumulate on the returned `ValidationResult`; only an
//!   artifact that cannot be opened at all is an `Err`.

pub mod decode;
pub mod encode;

pub use decode::{decode_document, DecodeParams};
pub use encode::{encode_document, EncodeParams, EncodedDocument};
