//! compression/types.rs
//! Scheme identifiers, codec traits and errors.

use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::compression::constants::{scheme_ids, GZIP_MAGIC, ZLIB_METHOD_DEFLATE};
use crate::utils::enum_name_or_hex;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionScheme {
    Zlib = scheme_ids::ZLIB,
    Gzip = scheme_ids::GZIP,
}

impl CompressionScheme {
    pub fn verify(raw: u8) -> Result<(), CompressionError> {
        match raw {
            x if x == CompressionScheme::Zlib as u8 => Ok(()),
            x if x == CompressionScheme::Gzip as u8 => Ok(()),
            _ => Err(CompressionError::UnsupportedScheme { raw }),
        }
    }

    /// The other generation's scheme, tried when this one fails.
    pub fn alternate(self) -> Self {
        match self {
            CompressionScheme::Zlib => CompressionScheme::Gzip,
            CompressionScheme::Gzip => CompressionScheme::Zlib,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionScheme::Zlib => "zlib",
            CompressionScheme::Gzip => "gzip",
        }
    }

    /// Recognise a stream by its leading bytes.
    ///
    /// zlib: CM=8, window ≤ 32K, no preset dictionary, `(CMF<<8 | FLG) % 31 == 0`.
    /// gzip: `1F 8B 08`.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, 0x08, ..] if [*a, *b] == GZIP_MAGIC => Some(CompressionScheme::Gzip),
            [cmf, flg, ..] => {
                let method_ok = cmf & 0x0f == ZLIB_METHOD_DEFLATE && cmf >> 4 <= 7;
                let check_ok = ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0;
                let no_dict = flg & 0x20 == 0;
                (method_ok && check_ok && no_dict).then_some(CompressionScheme::Zlib)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionScheme {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zlib" | "deflate" => Ok(CompressionScheme::Zlib),
            "gzip" | "gz" => Ok(CompressionScheme::Gzip),
            other => Err(CompressionError::StateError(format!("unknown compression scheme '{}'", other))),
        }
    }
}

#[derive(Debug)]
pub enum CompressionError {
    UnsupportedScheme { raw: u8 },
    EmptyInput,
    BadHeader { scheme: &'static str, msg: String },
    Truncated { scheme: &'static str },
    TrailingData { scheme: &'static str, extra: usize },
    ChecksumMismatch { scheme: &'static str, expected: u32, actual: u32 },
    LengthMismatch { expected: u32, actual: u32 },
    TooLarge { max: usize },
    CodecProcessFailed { scheme: &'static str, msg: String },
    /// Every scheme in the fallback chain failed; one message per attempt.
    AllSchemesFailed(Vec<String>),
    StateError(String),
}

impl From<std::io::Error> for CompressionError {
    fn from(e: std::io::Error) -> Self {
        CompressionError::StateError(e.to_string())
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompressionError::*;
        match self {
            UnsupportedScheme { raw } =>
                write!(f, "unsupported compression scheme: {}", enum_name_or_hex::<CompressionScheme>(*raw)),
            EmptyInput =>
                write!(f, "empty input"),
            BadHeader { scheme, msg } =>
                write!(f, "{} header invalid: {}", scheme, msg),
            Truncated { scheme } =>
                write!(f, "{} stream truncated", scheme),
            TrailingData { scheme, extra } =>
                write!(f, "{} stream followed by {} unexpected bytes", scheme, extra),
            ChecksumMismatch { scheme, expected, actual } =>
                write!(f, "{} checksum mismatch: expected {:08x}, got {:08x}", scheme, expected, actual),
            LengthMismatch { expected, actual } =>
                write!(f, "gzip size mismatch: trailer says {}, inflated {}", expected, actual),
            TooLarge { max } =>
                write!(f, "inflated data exceeds {} bytes", max),
            CodecProcessFailed { scheme, msg } =>
                write!(f, "{} process failed: {}", scheme, msg),
            AllSchemesFailed(attempts) =>
                write!(f, "all decompression schemes failed: {}", attempts.join("; ")),
            StateError(msg) =>
                write!(f, "compression state error: {}", msg),
        }
    }
}

impl std::error::Error for CompressionError {}

pub trait Compressor {
    /// Compress the whole input as one stream.
    fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

pub trait Decompressor {
    /// Decompress one complete stream. Trailer bytes missing from the end are
    /// treated as zero bytes.
    fn decompress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}
