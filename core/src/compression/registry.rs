//! compression/registry.rs
//! Scheme registry, factory functions and the decode fallback chain.

use log::debug;

use crate::compression::codecs::{deflate, gzip};
use crate::compression::constants::{scheme_ids, DEFAULT_LEVEL};
use crate::compression::types::{CompressionError, CompressionScheme, Compressor, Decompressor};

pub struct SchemeInfo {
    pub name: &'static str,
    pub default_level: u32,
}

pub fn resolve(raw: u8) -> Result<SchemeInfo, CompressionError> {
    match raw {
        x if x == scheme_ids::ZLIB => Ok(SchemeInfo { name: "zlib", default_level: DEFAULT_LEVEL }),
        x if x == scheme_ids::GZIP => Ok(SchemeInfo { name: "gzip", default_level: DEFAULT_LEVEL }),
        other => Err(CompressionError::UnsupportedScheme { raw: other }),
    }
}

pub fn create_compressor(scheme: CompressionScheme, level: Option<u32>) -> Box<dyn Compressor> {
    let level = level.unwrap_or(DEFAULT_LEVEL);
    match scheme {
        CompressionScheme::Zlib => Box::new(deflate::ZlibCompressor::new(level)),
        CompressionScheme::Gzip => Box::new(gzip::GzipCompressor::new(level)),
    }
}

pub fn create_decompressor(scheme: CompressionScheme) -> Box<dyn Decompressor> {
    match scheme {
        CompressionScheme::Zlib => Box::new(deflate::ZlibDecompressor),
        CompressionScheme::Gzip => Box::new(gzip::GzipDecompressor),
    }
}

/// Compress a complete payload. Empty input is rejected.
pub fn compress(scheme: CompressionScheme, level: u32, input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if input.is_empty() {
        return Err(CompressionError::EmptyInput);
    }
    let mut out = Vec::with_capacity(input.len() / 4 + 64);
    create_compressor(scheme, Some(level)).compress(input, &mut out)?;
    Ok(out)
}

/// Try `preferred`, then its alternate. Returns the plaintext and the scheme
/// that produced it.
pub fn decompress_with_fallback(
    preferred: CompressionScheme,
    input: &[u8],
) -> Result<(Vec<u8>, CompressionScheme), CompressionError> {
    if input.is_empty() {
        return Err(CompressionError::EmptyInput);
    }
    let mut attempts = Vec::with_capacity(2);
    for scheme in [preferred, preferred.alternate()] {
        let mut out = Vec::new();
        match create_decompressor(scheme).decompress(input, &mut out) {
            Ok(()) => return Ok((out, scheme)),
            Err(e) => {
                debug!("{} decompression failed: {}", scheme, e);
                attempts.push(format!("{}: {}", scheme, e));
            }
        }
    }
    Err(CompressionError::AllSchemesFailed(attempts))
}
