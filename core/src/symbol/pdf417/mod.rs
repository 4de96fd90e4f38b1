//! symbol/pdf417
//! Stacked 2D symbology carrying one segment per symbol.
//!
//! Industry notes:
//! - Row structure, the ISO/IEC 15438 codeword clusters, row indicators,
//!   compaction and GF(929) Reed-Solomon follow the PDF417 symbology, so
//!   symbols interchange with other PDF417 writers and readers.
//! - Only byte compaction is produced. Reading is tuned for clean rendered
//!   rasters; arbitrary camera scans are out of reach.

pub mod compaction;
pub mod ecc;
pub mod encoder;
pub mod reader;
pub mod tables;

pub use encoder::{build_codewords, encode_symbol, row_indicators, row_modules};
pub use reader::read_symbol;
