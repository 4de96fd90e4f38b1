use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::constants::LEGACY_MAX_SEGMENTS;
use crate::headers::{frame_chunk, ChunkHeader};
use crate::segmenting::types::{Segment, SegmentError, SegmentFlags, WireVariant};

/// Split `payload` into `ceil(len / capacity)` segments. Every segment is
/// padded to `capacity`, the last one usually being the only one that needs it.
pub fn split_segments(payload: &[u8], capacity: usize) -> Result<Vec<Segment>, SegmentError> {
    if payload.is_empty() {
        return Err(SegmentError::EmptyPayload);
    }
    if capacity == 0 {
        return Err(SegmentError::ZeroCapacity);
    }

    let shared = Bytes::copy_from_slice(payload);
    let total = payload.len().div_ceil(capacity);

    let segments = (0..total)
        .map(|i| {
            let start = i * capacity;
            let end = (start + capacity).min(shared.len());
            let bytes = shared.slice(start..end);
            let padding_length = capacity - bytes.len();

            let mut flags = SegmentFlags::empty();
            if i == 0 {
                flags |= SegmentFlags::FIRST;
            }
            if i + 1 == total {
                flags |= SegmentFlags::FINAL;
            }
            if padding_length > 0 {
                flags |= SegmentFlags::PADDED;
            }

            Segment { index: i as u32, total_count: total as u32, bytes, padding_length, flags }
        })
        .collect();

    Ok(segments)
}

/// Bytes handed to the symbol renderer for one segment.
///
/// - Direct: the padded segment bytes as-is.
/// - Chunked: Base64 of `id|index|total|` + padded bytes.
pub fn frame_segment(
    segment: &Segment,
    variant: WireVariant,
    document_id: &str,
) -> Result<Vec<u8>, SegmentError> {
    match variant {
        WireVariant::Direct => Ok(segment.padded_bytes()),
        WireVariant::Chunked => {
            if segment.total_count as usize > LEGACY_MAX_SEGMENTS {
                return Err(SegmentError::TooManySegments {
                    count: segment.total_count as usize,
                    max: LEGACY_MAX_SEGMENTS,
                });
            }
            let header = ChunkHeader::new(document_id, segment.wire_index(), segment.total_count);
            let framed = frame_chunk(&header, &segment.padded_bytes())?;
            Ok(STANDARD.encode(framed).into_bytes())
        }
    }
}
