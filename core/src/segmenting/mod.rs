//! Segmenting of the compressed payload into symbol-sized chunks.
//!
//! Responsibilities:
//! - Split a compressed payload into fixed-capacity, null-padded segments
//! - Frame segments for either wire variant (direct or chunked)
//! - Reassemble decoded chunks with sequence checks
//!
//! Non-responsibilities:
//! - Compression
//! - Symbol rendering
//! - Classification of decoded symbols

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{Segment, SegmentError, SegmentFlags, WireVariant};
pub use encode::{frame_segment, split_segments};
pub use decode::{
    reassemble_chunked, reassemble_direct, unwrap_text_transport, ChunkedPart, DirectPart, Reassembly,
    SequenceIssue,
};
