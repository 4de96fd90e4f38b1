//! headers/mod.rs
//! The two textual headers of the barcode format.
//!
//! Industry notes:
//! - `ChunkHeader` (`id|index|total|`) prefixes every chunk of the legacy
//!   self-describing wire variant so symbols can be reassembled out of order.
//! - `LinkingCode` is the fixed 16-digit record carried by the 1D symbol on
//!   every page (form, version, organisation, page, flags).
//! - Both are plain ASCII so they survive any byte-preserving transport.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
