//! symbol
//! Symbol rendering and reading: the 2D data symbol and the 1D linking symbol.

pub mod code128;
pub mod pdf417;
pub mod types;

pub use code128::{encode_linking, read_linking};
pub use pdf417::{encode_symbol, read_symbol};
pub use types::{DecodedSymbol, SymbolError, SymbolImage};
