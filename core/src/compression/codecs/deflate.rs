//! codecs/deflate.rs
//! Deflate with zlib framing (RFC 1950) via flate2.

use std::io::Write;

use byteorder::{BigEndian, ByteOrder};
use flate2::{write::ZlibEncoder, Compression};

use crate::compression::codecs::inflate::{inflate_body, restore_trailer};
use crate::compression::constants::{ZLIB_HEADER_LEN, ZLIB_TRAILER_LEN};
use crate::compression::types::{CompressionError, CompressionScheme, Compressor, Decompressor};

const SCHEME: &str = "zlib";

pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    pub fn new(level: u32) -> Self {
        Self { level: Compression::new(level.min(9)) }
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = ZlibEncoder::new(Vec::new(), self.level);
        enc.write_all(input)
            .map_err(|e| CompressionError::CodecProcessFailed { scheme: SCHEME, msg: e.to_string() })?;
        let compressed = enc.finish()
            .map_err(|e| CompressionError::CodecProcessFailed { scheme: SCHEME, msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

pub struct ZlibDecompressor;

impl Decompressor for ZlibDecompressor {
    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        if input.len() < ZLIB_HEADER_LEN {
            return Err(CompressionError::Truncated { scheme: SCHEME });
        }
        if CompressionScheme::sniff(input) != Some(CompressionScheme::Zlib) {
            return Err(CompressionError::BadHeader {
                scheme: SCHEME,
                msg: format!("leading bytes {}", hex::encode(&input[..ZLIB_HEADER_LEN])),
            });
        }

        let body = &input[ZLIB_HEADER_LEN..];
        let (plain, used) = inflate_body(body, SCHEME)?;
        let trailer = restore_trailer::<ZLIB_TRAILER_LEN>(&body[used..], SCHEME)?;

        let expected = BigEndian::read_u32(&trailer);
        let actual = adler2::adler32_slice(&plain);
        if expected != actual {
            return Err(CompressionError::ChecksumMismatch { scheme: SCHEME, expected, actual });
        }

        out.extend_from_slice(&plain);
        Ok(())
    }
}
