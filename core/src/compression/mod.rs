//! compression/mod.rs
//! Deflate-family compression of the textual payload.
//!
//! Industry notes:
//! - The current generation writes zlib framing at best compression; the
//!   legacy generation wrote gzip. Decoders accept both.
//! - Trailers are verified after zero-extension, so null-padding stripped from
//!   the end of a reassembled buffer never invalidates a good stream.
//! - Registry resolves scheme IDs to implementations.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
