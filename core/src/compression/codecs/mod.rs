//! compression/codecs/mod.rs
//! zlib and gzip codecs over a shared raw-deflate body inflater.

pub mod deflate;
pub mod gzip;
pub mod inflate;

pub use deflate::*;
pub use gzip::*;
