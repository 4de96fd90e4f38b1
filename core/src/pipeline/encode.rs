//! pipeline/encode.rs
//! compress → segment → render → assemble.

use log::{debug, info, warn};
use uuid::Uuid;

use crate::compression::compress;
use crate::config::CodecProfile;
use crate::document::{assemble_document, CoverSummary};
use crate::segmenting::{frame_segment, split_segments};
use crate::symbol::{encode_symbol, SymbolImage};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::CodecError;

/// Per-call inputs besides the payload and the profile.
#[derive(Debug, Clone, Default)]
pub struct EncodeParams {
    /// Cover values; derived from the payload when `None`.
    pub cover: Option<CoverSummary>,
    /// Fixed document id; a random UUID when `None`.
    pub document_id: Option<String>,
    /// Fail when the payload carries no `clientNumber` for the cover page.
    pub require_client: bool,
}

impl EncodeParams {
    pub fn with_cover(mut self, cover: CoverSummary) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    pub fn strict(mut self) -> Self {
        self.require_client = true;
        self
    }

    fn resolve_cover(&self, payload: &str) -> Result<CoverSummary, CodecError> {
        let cover = match &self.cover {
            Some(cover) => cover.clone(),
            None => CoverSummary::from_statement_xml(payload).unwrap_or_else(|e| {
                warn!("cover page falls back to placeholders: {}", e);
                CoverSummary::default()
            }),
        };
        if self.require_client && cover.client_number.is_none() {
            return Err(CodecError::MissingField("clientNumber"));
        }
        Ok(cover)
    }
}

#[derive(Debug, Clone)]
pub struct EncodedDocument {
    pub pdf: Vec<u8>,
    pub document_id: String,
    pub segment_count: usize,
    pub page_count: usize,
    pub compressed_len: usize,
    pub telemetry: TelemetrySnapshot,
}

/// Render `payload` into a PDF.
pub fn encode_document(
    payload: &str,
    profile: &CodecProfile,
    params: &EncodeParams,
) -> Result<EncodedDocument, CodecError> {
    profile.validate()?;
    if payload.is_empty() {
        return Err(CodecError::Payload("empty payload".into()));
    }

    let mut counters = TelemetryCounters::default();
    let mut timer = TelemetryTimer::new();

    let cover = params.resolve_cover(payload)?;
    let document_id = params.document_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    counters.bytes_payload = payload.len() as u64;

    let compressed = timer.time(Stage::Compress, || {
        compress(profile.compression, profile.compression_level, payload.as_bytes())
    })?;
    counters.bytes_compressed = compressed.len() as u64;
    debug!("{} payload bytes compressed to {} ({})", payload.len(), compressed.len(), profile.compression);

    let capacity = profile.segment_capacity();
    let segments = timer.time(Stage::Segment, || split_segments(&compressed, capacity))?;

    let symbols = timer.time(Stage::Render, || -> Result<Vec<SymbolImage>, CodecError> {
        let mut symbols = Vec::with_capacity(segments.len());
        for segment in &segments {
            let framed = frame_segment(segment, profile.variant, &document_id)?;
            let symbol = encode_symbol(&framed, &profile.geometry, &profile.raster)?;
            counters.add_segment(segment.padding_length);
            counters.symbols_rendered += 1;
            debug!("{} -> {}x{} px", segment.summary(), symbol.width(), symbol.height());
            symbols.push(symbol);
        }
        Ok(symbols)
    })?;

    let assembled = timer.time(Stage::Assemble, || assemble_document(profile, &symbols, &cover, &document_id))?;
    counters.pages = assembled.page_count as u64;
    timer.finish();

    info!(
        "encoded document {}: {} {} segments of {} bytes on {} pages",
        document_id,
        segments.len(),
        profile.variant,
        capacity,
        assembled.page_count
    );

    Ok(EncodedDocument {
        pdf: assembled.pdf,
        document_id,
        segment_count: segments.len(),
        page_count: assembled.page_count,
        compressed_len: compressed.len(),
        telemetry: TelemetrySnapshot::capture(&counters, &timer),
    })
}
