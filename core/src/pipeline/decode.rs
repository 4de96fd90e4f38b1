//! pipeline/decode.rs
//! harvest → read → check linking → classify → reassemble → depad →
//! decompress → validate.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use lopdf::Document;

use crate::compression::{decompress_with_fallback, CompressionScheme};
use crate::config::CodecProfile;
use crate::document::{harvest_images, DocumentError};
use crate::extract::{check_linking, classify_document, read_images, ClassifiedDocument, DocumentFormat};
use crate::io::{read_all, InputSource};
use crate::segmenting::{reassemble_chunked, reassemble_direct, Reassembly};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::CodecError;
use crate::utils::{hex_preview, strip_trailing_nulls};
use crate::validate::{check_structure, IssueKind, SchemaValidator, ValidationResult, XsdDeclarationValidator};

const UTF8_BOM: &str = "\u{feff}";

/// Optional inputs of a decode run.
pub struct DecodeParams<'a> {
    /// XSD to validate against; a missing file is reported as a warning.
    pub schema: Option<PathBuf>,
    pub validator: &'a dyn SchemaValidator,
}

impl Default for DecodeParams<'_> {
    fn default() -> Self {
        Self { schema: None, validator: &XsdDeclarationValidator }
    }
}

impl<'a> DecodeParams<'a> {
    pub fn with_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema = Some(path.into());
        self
    }

    pub fn with_validator(mut self, validator: &'a dyn SchemaValidator) -> Self {
        self.validator = validator;
        self
    }
}

/// Recover and validate the payload of a rendered document.
///
/// Returns `Err` only when the input cannot be read or is not a PDF with
/// pages; everything else is reported on the result.
pub fn decode_document(
    input: InputSource,
    profile: &CodecProfile,
    params: &DecodeParams<'_>,
) -> Result<ValidationResult, CodecError> {
    let mut counters = TelemetryCounters::default();
    let mut timer = TelemetryTimer::new();
    let mut result = ValidationResult::new();

    let bytes = read_all(input)?;
    let doc = Document::load_mem(&bytes).map_err(DocumentError::from)?;

    // A missing schema is reported however far the payload gets.
    let schema = params.schema.as_deref().and_then(|path| load_schema(path, &mut result));

    let harvest = timer.time(Stage::Harvest, || harvest_images(&doc, profile.harvest_depth));
    if harvest.page_count == 0 {
        return Err(DocumentError::NoPages.into());
    }
    counters.pages = harvest.page_count as u64;
    counters.images_harvested = harvest.images.len() as u64;
    result.set_meta("page_count", harvest.page_count);
    result.set_meta("images_harvested", harvest.images.len());
    for w in &harvest.warnings {
        result.warn(IssueKind::Harvest, w.clone());
    }

    let readings = timer.time(Stage::Read, || read_images(&harvest, &profile.transforms, &mut counters));
    result.set_meta("linking_symbols", readings.linking.len());
    result.set_meta("symbols_decoded", readings.symbols.len());
    result.set_meta("duplicates_dropped", readings.duplicates_dropped);
    for (page, name) in &readings.unreadable {
        result.warn(IssueKind::Harvest, format!("Page {}: image /{} could not be read", page, name));
    }

    check_linking(harvest.page_count as u32, &readings.linking, &mut result);

    if readings.symbols.is_empty() {
        result.error(IssueKind::Harvest, "No 2D symbols found in the document");
        return Ok(finish(result, &counters, timer));
    }

    let classified = timer.time(Stage::Classify, || classify_document(&readings.symbols));
    for (page, preview) in &classified.unknown {
        result.warn(IssueKind::FormatUnrecognized, format!("Page {}: unrecognised symbol content {}", page, preview));
    }

    let Some((reassembly, preferred)) =
        timer.time(Stage::Reassemble, || reassemble(&classified, profile, &mut result))
    else {
        result.error(IssueKind::FormatUnrecognized, "No symbol matches a known wire format");
        return Ok(finish(result, &counters, timer));
    };

    let depadded = strip_trailing_nulls(&reassembly.bytes);
    debug!("reassembled {} bytes, {} after depadding", reassembly.bytes.len(), depadded.len());

    let inflated = timer.time(Stage::Decompress, || decompress_with_fallback(preferred, depadded));
    let plain = match inflated {
        Ok((plain, scheme)) => {
            result.set_meta("compression", scheme.name());
            plain
        }
        Err(e) => {
            result.error(
                IssueKind::DecompressionFailure,
                format!("Could not decompress {} bytes ({}): {}", depadded.len(), hex_preview(depadded, 8), e),
            );
            return Ok(finish(result, &counters, timer));
        }
    };

    let text = match String::from_utf8(plain) {
        Ok(text) => text,
        Err(e) => {
            result.error(IssueKind::DecompressionFailure, format!("Decompressed payload is not UTF-8: {}", e));
            return Ok(finish(result, &counters, timer));
        }
    };
    let text = text.strip_prefix(UTF8_BOM).map(str::to_string).unwrap_or(text);
    result.set_meta("payload_length", text.len());

    timer.time(Stage::Validate, || {
        if check_structure(&text, &mut result) {
            if let Some(schema) = &schema {
                result.set_meta("schema_validator", params.validator.name());
                for violation in params.validator.validate(&text, schema) {
                    result.error(IssueKind::SchemaViolation, violation);
                }
            }
        }
    });
    result.extracted_payload = Some(text);

    Ok(finish(result, &counters, timer))
}

/// Pick the variant to reassemble and the scheme to try first.
fn reassemble(
    classified: &ClassifiedDocument,
    profile: &CodecProfile,
    result: &mut ValidationResult,
) -> Option<(Reassembly, CompressionScheme)> {
    let format = classified.format();
    result.set_meta("wire_format", format.name());
    if format == DocumentFormat::Mixed {
        warn!("document mixes {} chunked and {} direct symbols", classified.chunked.len(), classified.direct.len());
        result.warn(
            IssueKind::FormatUnrecognized,
            format!(
                "Document mixes {} chunked and {} direct symbols; using the majority",
                classified.chunked.len(),
                classified.direct.len()
            ),
        );
    }

    match classified.dominant() {
        DocumentFormat::Chunked => {
            let reassembly = reassemble_chunked(&classified.chunked);
            if let Some(id) = &reassembly.document_id {
                result.set_meta("document_id", id.as_str());
            }
            if let Some(total) = reassembly.total {
                result.set_meta("total_chunks", total);
            }
            result.set_meta("segments", reassembly.segments);
            for issue in &reassembly.issues {
                result.error(IssueKind::SequenceError, issue.to_string());
            }
            let preferred = CompressionScheme::sniff(&reassembly.bytes).unwrap_or(profile.compression);
            Some((reassembly, preferred))
        }
        DocumentFormat::Direct => {
            let reassembly = reassemble_direct(&classified.direct);
            result.set_meta("segments", reassembly.segments);
            Some((reassembly, classified.direct_scheme.unwrap_or(profile.compression)))
        }
        DocumentFormat::Mixed | DocumentFormat::Empty => None,
    }
}

/// Schema text, or a `MissingResource` warning when it cannot be read.
fn load_schema(schema: &Path, result: &mut ValidationResult) -> Option<String> {
    if !schema.exists() {
        result.warn(
            IssueKind::MissingResource,
            format!("Schema {} not found; schema validation skipped", schema.display()),
        );
        return None;
    }
    match std::fs::read_to_string(schema) {
        Ok(text) => Some(text),
        Err(e) => {
            result.warn(IssueKind::MissingResource, format!("Schema {} unreadable: {}", schema.display(), e));
            None
        }
    }
}

fn finish(mut result: ValidationResult, counters: &TelemetryCounters, mut timer: TelemetryTimer) -> ValidationResult {
    timer.finish();
    result.finalize();
    result.telemetry = Some(TelemetrySnapshot::capture(counters, &timer));
    info!(
        "decode finished: {} ({} errors, {} warnings)",
        if result.is_valid { "valid" } else { "invalid" },
        result.errors.len(),
        result.warnings.len()
    );
    result
}
