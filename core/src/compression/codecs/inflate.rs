//! codecs/inflate.rs
//! Raw deflate body inflation and trailer restoration shared by both framings.

use flate2::{Decompress, FlushDecompress, Status};

use crate::compression::constants::MAX_INFLATED_LEN;
use crate::compression::types::CompressionError;

/// Inflate a raw deflate body. Returns the plaintext and how many input bytes
/// the deflate stream occupied; whatever follows is the framing trailer.
pub fn inflate_body(body: &[u8], scheme: &'static str) -> Result<(Vec<u8>, usize), CompressionError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(body.len().saturating_mul(4).max(1024));

    loop {
        if out.len() == out.capacity() {
            if out.len() >= MAX_INFLATED_LEN {
                return Err(CompressionError::TooLarge { max: MAX_INFLATED_LEN });
            }
            out.reserve(out.capacity().max(1024));
        }

        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&body[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| CompressionError::CodecProcessFailed { scheme, msg: e.to_string() })?;

        match status {
            Status::StreamEnd => return Ok((out, inflater.total_in() as usize)),
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_in() as usize == consumed && inflater.total_out() == produced;
                // No progress with room left in `out` means the input ran dry.
                if stalled && out.len() < out.capacity() {
                    return Err(CompressionError::Truncated { scheme });
                }
            }
        }
    }
}

/// Rebuild a fixed-size trailer from the bytes left after the deflate body.
///
/// Missing bytes are zeros stripped as padding. Extra bytes are tolerated only
/// if they are zeros too.
pub fn restore_trailer<const N: usize>(rest: &[u8], scheme: &'static str) -> Result<[u8; N], CompressionError> {
    let mut trailer = [0u8; N];
    if rest.len() > N {
        let extra = &rest[N..];
        if extra.iter().any(|&b| b != 0) {
            return Err(CompressionError::TrailingData { scheme, extra: extra.len() });
        }
    }
    let take = rest.len().min(N);
    trailer[..take].copy_from_slice(&rest[..take]);
    Ok(trailer)
}
