/// Stable scheme IDs (u8) used in telemetry and reports.
pub mod scheme_ids {
    pub const ZLIB: u8 = 0x01;
    pub const GZIP: u8 = 0x02;
}

/// "Best compression", as mandated for the payload.
pub const DEFAULT_LEVEL: u32 = 9;

/// gzip member signature (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// CM=8 (deflate) in the low nibble of the zlib CMF byte.
pub const ZLIB_METHOD_DEFLATE: u8 = 0x08;

pub const ZLIB_HEADER_LEN: usize = 2;
/// Adler-32, big endian.
pub const ZLIB_TRAILER_LEN: usize = 4;
pub const GZIP_HEADER_LEN: usize = 10;
/// CRC-32 + ISIZE, little endian.
pub const GZIP_TRAILER_LEN: usize = 8;

/// Refuse to inflate beyond this (64 MiB).
pub const MAX_INFLATED_LEN: usize = 64 * 1024 * 1024;
