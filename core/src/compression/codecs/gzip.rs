//! codecs/gzip.rs
//! Deflate with gzip framing (RFC 1952), written by the legacy generation.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};
use flate2::{write::GzEncoder, Compression};

use crate::compression::codecs::inflate::{inflate_body, restore_trailer};
use crate::compression::constants::{GZIP_HEADER_LEN, GZIP_MAGIC, GZIP_TRAILER_LEN};
use crate::compression::types::{CompressionError, Compressor, Decompressor};
use crate::utils::compute_crc32;

const SCHEME: &str = "gzip";

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    pub fn new(level: u32) -> Self {
        Self { level: Compression::new(level.min(9)) }
    }
}

impl Compressor for GzipCompressor {
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = GzEncoder::new(Vec::new(), self.level);
        enc.write_all(input)
            .map_err(|e| CompressionError::CodecProcessFailed { scheme: SCHEME, msg: e.to_string() })?;
        let compressed = enc.finish()
            .map_err(|e| CompressionError::CodecProcessFailed { scheme: SCHEME, msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

pub struct GzipDecompressor;

/// Length of the member header including optional fields.
fn header_len(input: &[u8]) -> Result<usize, CompressionError> {
    let bad = |msg: &str| CompressionError::BadHeader { scheme: SCHEME, msg: msg.to_string() };

    if input.len() < GZIP_HEADER_LEN {
        return Err(CompressionError::Truncated { scheme: SCHEME });
    }
    if input[..2] != GZIP_MAGIC {
        return Err(bad("missing 1f8b signature"));
    }
    if input[2] != 0x08 {
        return Err(bad("compression method is not deflate"));
    }

    let flags = input[3];
    let mut pos = GZIP_HEADER_LEN;

    if flags & FEXTRA != 0 {
        let xlen = input.get(pos..pos + 2).ok_or(CompressionError::Truncated { scheme: SCHEME })?;
        pos += 2 + LittleEndian::read_u16(xlen) as usize;
    }
    for flag in [FNAME, FCOMMENT] {
        if flags & flag != 0 {
            let rest = input.get(pos..).ok_or(CompressionError::Truncated { scheme: SCHEME })?;
            let nul = rest.iter().position(|&b| b == 0).ok_or(bad("unterminated header string"))?;
            pos += nul + 1;
        }
    }
    if flags & FHCRC != 0 {
        pos += 2;
    }
    if pos > input.len() {
        return Err(CompressionError::Truncated { scheme: SCHEME });
    }
    Ok(pos)
}

impl Decompressor for GzipDecompressor {
    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let body = &input[header_len(input)?..];
        let (plain, used) = inflate_body(body, SCHEME)?;
        let trailer = restore_trailer::<GZIP_TRAILER_LEN>(&body[used..], SCHEME)?;

        let expected_crc = LittleEndian::read_u32(&trailer[..4]);
        let actual_crc = compute_crc32(&plain);
        if expected_crc != actual_crc {
            return Err(CompressionError::ChecksumMismatch { scheme: SCHEME, expected: expected_crc, actual: actual_crc });
        }

        let expected_len = LittleEndian::read_u32(&trailer[4..]);
        let actual_len = plain.len() as u32;
        if expected_len != actual_len {
            return Err(CompressionError::LengthMismatch { expected: expected_len, actual: actual_len });
        }

        out.extend_from_slice(&plain);
        Ok(())
    }
}
