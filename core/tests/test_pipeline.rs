#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use lopdf::Document;
    use proptest::prelude::*;

    use etax_core::compression::compress;
    use etax_core::config::{ProfileError, RasterScale};
    use etax_core::document::{assemble_document, CoverSummary};
    use etax_core::headers::{frame_chunk, ChunkHeader};
    use etax_core::prelude::*;
    use etax_core::segmenting::split_segments;
    use etax_core::symbol::encode_symbol;
    use etax_core::telemetry::Stage;

    const NS: &str = "http://www.ech.ch/xmlns/eCH-0196/2";

    /// Deterministic eCH-0196 statement of roughly `target` characters.
    fn statement(target: usize) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><taxStatement xmlns="{}" minorVersion="22" taxPeriod="2024" canton="ZH" periodFrom="2024-01-01" periodTo="2024-12-31" totalTaxValue="182340.55"><institution name="Example Bank AG"/><client clientNumber="C-100234"/><depot depotNumber="D-77">"#,
            NS
        );
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut i = 0;
        while xml.len() < target {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            xml.push_str(&format!(
                r#"<security positionId="{}" valorNumber="{}" isin="CH{:010}" securityCategory="{}"><taxValue value="{}.{:02}"/></security>"#,
                i,
                state % 100_000_000,
                state % 10_000_000_000,
                ["SHARE", "BOND", "OPTION", "OTHER"][(state % 4) as usize],
                state % 250_000,
                state % 100
            ));
            i += 1;
        }
        xml.push_str("</depot></taxStatement>");
        xml
    }

    fn decode(pdf: &[u8]) -> ValidationResult {
        decode_document(InputSource::Memory(pdf.to_vec()), &CodecProfile::default(), &DecodeParams::default()).unwrap()
    }

    // # ✅ 1. Scenario A: current generation, large payload

    #[test]
    fn large_statement_round_trips_in_direct_variant() {
        let payload = statement(50_000);
        let profile = CodecProfile::default();
        let encoded = encode_document(&payload, &profile, &EncodeParams::default()).unwrap();

        assert_eq!(encoded.segment_count, encoded.compressed_len.div_ceil(470));
        assert_eq!(encoded.page_count, 1 + encoded.segment_count.div_ceil(6));
        assert!(encoded.telemetry.has_all_stages(&Stage::ENCODE));
        assert_eq!(encoded.telemetry.counters.symbols_rendered as usize, encoded.segment_count);

        let doc = Document::load_mem(&encoded.pdf).unwrap();
        assert_eq!(doc.get_pages().len(), encoded.page_count);

        let result = decode(&encoded.pdf);
        assert!(result.errors.is_empty(), "{}", result.summary());
        assert!(result.is_valid);
        assert_eq!(result.extracted_payload.as_deref(), Some(payload.as_str()));
        assert_eq!(result.meta("wire_format").unwrap(), "direct");
        assert_eq!(result.meta("compression").unwrap(), "zlib");
        assert_eq!(result.meta("segments").unwrap(), encoded.segment_count);
        assert_eq!(result.meta("minor_version").unwrap(), "22");
        assert_eq!(result.meta("page_count").unwrap(), encoded.page_count);
        assert_eq!(result.meta("linking_symbols").unwrap(), encoded.page_count);

        let telemetry = result.telemetry.as_ref().unwrap();
        assert!(telemetry.has_all_stages(&Stage::DECODE));
        assert_eq!(telemetry.counters.symbols_read as usize, encoded.segment_count);
    }

    // # ✅ 2. Dual format

    #[test]
    fn both_generations_decode_to_the_same_payload() {
        let payload = statement(6_000);
        let current = encode_document(&payload, &CodecProfile::default(), &EncodeParams::default()).unwrap();
        let legacy = encode_document(&payload, &CodecProfile::legacy(), &EncodeParams::default()).unwrap();

        let a = decode(&current.pdf);
        let b = decode(&legacy.pdf);
        assert!(a.is_valid, "{}", a.summary());
        assert!(b.is_valid, "{}", b.summary());
        assert_eq!(a.extracted_payload, b.extracted_payload);
        assert_eq!(a.extracted_payload.as_deref(), Some(payload.as_str()));

        assert_eq!(b.meta("wire_format").unwrap(), "chunked");
        assert_eq!(b.meta("compression").unwrap(), "gzip");
        assert_eq!(b.meta("document_id").unwrap(), legacy.document_id.as_str());
        assert_eq!(b.meta("total_chunks").unwrap(), legacy.segment_count);
    }

    #[test]
    fn legacy_capacity_fits_header_and_text() {
        let profile = CodecProfile::legacy();
        assert_eq!(profile.segment_capacity(), 333);
        let payload = statement(20_000);
        let encoded = encode_document(&payload, &profile, &EncodeParams::default()).unwrap();
        assert_eq!(encoded.segment_count, encoded.compressed_len.div_ceil(333));
    }

    #[test]
    fn chunked_zlib_with_scaled_raster_decodes_under_default_profile() {
        let profile = CodecProfile::default()
            .with_variant(WireVariant::Chunked)
            .with_compression(CompressionScheme::Zlib, 6)
            .with_raster(RasterScale { module_px: 2, row_px: 2, quiet_zone_modules: 2 });
        let payload = statement(4_000);
        let encoded = encode_document(&payload, &profile, &EncodeParams::default()).unwrap();

        let result = decode(&encoded.pdf);
        assert!(result.is_valid, "{}", result.summary());
        assert_eq!(result.meta("wire_format").unwrap(), "chunked");
        assert_eq!(result.meta("compression").unwrap(), "zlib");
        assert_eq!(result.extracted_payload.as_deref(), Some(payload.as_str()));
    }

    #[test]
    fn clean_document_reads_without_fallback_transforms() {
        let payload = statement(3_000);
        let encoded = encode_document(&payload, &CodecProfile::default(), &EncodeParams::default()).unwrap();

        let bare = CodecProfile::default().with_transforms(Vec::new());
        let result = decode_document(InputSource::Memory(encoded.pdf), &bare, &DecodeParams::default()).unwrap();
        assert!(result.is_valid, "{}", result.summary());
        assert_eq!(result.meta("segments").unwrap(), encoded.segment_count);
    }

    // # ✅ 3. Scenario B: out-of-range chunk index

    #[test]
    fn out_of_range_index_is_a_sequence_error() {
        let profile = CodecProfile::legacy();
        let payload = statement(3_000);
        let id = "3f1c8d2e-5b6a-4c7d-8e9f-0a1b2c3d4e5f";

        let compressed = compress(profile.compression, 9, payload.as_bytes()).unwrap();
        let segments = split_segments(&compressed, profile.segment_capacity()).unwrap();
        let total = segments.len() as u32;
        assert!(total >= 2);

        let symbols: Vec<_> = segments
            .iter()
            .map(|seg| {
                let index = if seg.index == 1 { total + 5 } else { seg.wire_index() };
                let framed = frame_chunk(&ChunkHeader::new(id, index, total), &seg.padded_bytes()).unwrap();
                let text = STANDARD.encode(framed).into_bytes();
                encode_symbol(&text, &profile.geometry, &profile.raster).unwrap()
            })
            .collect();
        let cover = CoverSummary::from_statement_xml(&payload).unwrap();
        let assembled = assemble_document(&profile, &symbols, &cover, id).unwrap();

        let result = decode(&assembled.pdf);
        assert!(!result.is_valid);
        assert!(result.has_error(IssueKind::SequenceError));
        assert!(result.errors.iter().any(|e| e.message.contains(&format!("Missing chunk 2 of {}", total))));
        assert_eq!(result.meta("document_id").unwrap(), id);
        assert_eq!(result.meta("total_chunks").unwrap(), total);
    }

    // # ✅ 4. Scenario C: missing schema

    #[test]
    fn missing_schema_is_only_a_warning() {
        let payload = statement(2_000);
        let encoded = encode_document(&payload, &CodecProfile::default(), &EncodeParams::default()).unwrap();
        let params = DecodeParams::default().with_schema("/nonexistent/eCH-0196-2-2.xsd");
        let result =
            decode_document(InputSource::Memory(encoded.pdf), &CodecProfile::default(), &params).unwrap();

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.has_warning(IssueKind::MissingResource));
    }

    #[test]
    fn missing_schema_is_reported_alongside_a_corrupt_stream() {
        let profile = CodecProfile::default();
        let payload = statement(1_500);
        let mut compressed = compress(profile.compression, 9, payload.as_bytes()).unwrap();
        compressed.truncate(400);
        // Keep the zlib header so the symbol still classifies as direct; 0xFF
        // opens a deflate block of the reserved type.
        for b in compressed.iter_mut().skip(2) {
            *b = 0xFF;
        }
        let symbol = encode_symbol(&compressed, &profile.geometry, &profile.raster).unwrap();
        let cover = CoverSummary::from_statement_xml(&payload).unwrap();
        let assembled = assemble_document(&profile, &[symbol], &cover, "corrupt").unwrap();

        let params = DecodeParams::default().with_schema("/nonexistent/eCH-0196-2-2.xsd");
        let result = decode_document(InputSource::Memory(assembled.pdf), &profile, &params).unwrap();

        assert!(!result.is_valid);
        assert!(result.has_error(IssueKind::DecompressionFailure));
        assert!(result.has_warning(IssueKind::MissingResource));
        assert!(result.extracted_payload.is_none());
    }

    #[test]
    fn schema_violations_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("statement.xsd");
        std::fs::write(
            &schema,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:other">
                 <xs:element name="taxStatement"/>
               </xs:schema>"#,
        )
        .unwrap();

        let encoded =
            encode_document(&statement(1_000), &CodecProfile::default(), &EncodeParams::default()).unwrap();
        let params = DecodeParams::default().with_schema(&schema);
        let result = decode_document(InputSource::Memory(encoded.pdf), &CodecProfile::default(), &params).unwrap();

        assert!(!result.is_valid);
        assert!(result.has_error(IssueKind::SchemaViolation));
        assert!(result.extracted_payload.is_some());
    }

    // # ✅ 5. Padding

    #[test]
    fn exactly_full_final_segment_round_trips() {
        let payload = statement(700);
        let compressed_len = compress(CompressionScheme::Zlib, 9, payload.as_bytes()).unwrap().len();
        assert!(compressed_len <= 470, "payload must fit one symbol");

        let exact = CodecProfile::default().with_capacity(compressed_len);
        let encoded = encode_document(&payload, &exact, &EncodeParams::default()).unwrap();
        assert_eq!(encoded.segment_count, 1);
        assert_eq!(encoded.telemetry.counters.bytes_padding, 0);

        let padded = CodecProfile::default().with_capacity(compressed_len + 1);
        let encoded_padded = encode_document(&payload, &padded, &EncodeParams::default()).unwrap();
        assert_eq!(encoded_padded.telemetry.counters.bytes_padding, 1);

        for pdf in [encoded.pdf, encoded_padded.pdf] {
            let result = decode(&pdf);
            assert_eq!(result.extracted_payload.as_deref(), Some(payload.as_str()));
        }
    }

    // # ✅ 6. Failure surfaces

    #[test]
    fn not_a_pdf_is_an_error() {
        let err = decode_document(
            InputSource::Memory(b"hello".to_vec()),
            &CodecProfile::default(),
            &DecodeParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Document(_)));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = encode_document("", &CodecProfile::default(), &EncodeParams::default()).unwrap_err();
        assert!(matches!(err, CodecError::Payload(_)));
        assert_eq!(err.issue_kind(), Some(IssueKind::StructuralError));
    }

    #[test]
    fn strict_mode_requires_client_number() {
        let payload = format!(r#"<taxStatement xmlns="{}" minorVersion="22"/>"#, NS);
        let err = encode_document(&payload, &CodecProfile::default(), &EncodeParams::default().strict()).unwrap_err();
        assert!(matches!(err, CodecError::MissingField("clientNumber")));
        assert!(encode_document(&statement(500), &CodecProfile::default(), &EncodeParams::default().strict()).is_ok());
    }

    #[test]
    fn oversized_capacity_is_a_profile_error() {
        let profile = CodecProfile::default().with_capacity(506);
        let err = encode_document("<x/>", &profile, &EncodeParams::default()).unwrap_err();
        assert!(matches!(err, CodecError::Profile(_)));
        assert_eq!(err.issue_kind(), Some(IssueKind::RenderingFailure));
    }

    #[test]
    fn explicit_capacity_is_refused_for_the_chunked_variant() {
        let profile = CodecProfile::new(Some(WireVariant::Chunked), Some(400), None);
        let err = encode_document(&statement(800), &profile, &EncodeParams::default()).unwrap_err();
        assert!(matches!(err, CodecError::Profile(ProfileError::CapacityNotApplicable(400))));

        let derived = CodecProfile::new(Some(WireVariant::Chunked), None, None);
        assert!(derived.validate().is_ok());
        assert_eq!(derived.segment_capacity(), 333);
    }

    #[test]
    fn non_statement_payload_round_trips_but_is_invalid() {
        let payload = "<note>not a tax statement</note>";
        let encoded = encode_document(payload, &CodecProfile::default(), &EncodeParams::default()).unwrap();
        let result = decode(&encoded.pdf);
        assert_eq!(result.extracted_payload.as_deref(), Some(payload));
        assert!(result.has_error(IssueKind::StructuralError));
        assert!(!result.is_valid);
    }

    #[test]
    fn fixed_document_id_is_used() {
        let params = EncodeParams::default().with_document_id("fixed-id");
        let encoded = encode_document(&statement(800), &CodecProfile::legacy(), &params).unwrap();
        assert_eq!(encoded.document_id, "fixed-id");
        assert_eq!(decode(&encoded.pdf).meta("document_id").unwrap(), "fixed-id");
    }

    #[test]
    fn result_serialises_to_json() {
        let encoded = encode_document(&statement(800), &CodecProfile::default(), &EncodeParams::default()).unwrap();
        let json = decode(&encoded.pdf).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["is_valid"], true);
        assert!(value["metadata"]["payload_length"].as_u64().unwrap() > 0);
    }

    // # ✅ 7. Round-trip property

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_round_trip(size in 1usize..4_000, legacy in any::<bool>()) {
            let payload = statement(size);
            let profile = if legacy { CodecProfile::legacy() } else { CodecProfile::default() };
            let encoded = encode_document(&payload, &profile, &EncodeParams::default()).unwrap();
            let result = decode(&encoded.pdf);
            prop_assert_eq!(result.extracted_payload.as_deref(), Some(payload.as_str()));
            prop_assert!(result.is_valid);
        }
    }
}
