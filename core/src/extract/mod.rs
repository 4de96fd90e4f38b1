//! extract/mod.rs
//! Decode-side steps between harvested images and the reassembled stream.
//!
//! Industry notes:
//! - `reader` runs both symbologies and the transform fallback chain over
//!   every image.
//! - `classify` sorts 2D readings into wire variants; `linking` checks the
//!   per-page 1D records.

pub mod classify;
pub mod linking;
pub mod reader;

pub use classify::{classify, classify_document, ClassifiedDocument, DocumentFormat, WireFormat};
pub use linking::check_linking;
pub use reader::{read_images, LinkingReading, Readings, SymbolReading};
