// Chunk header and linking record tests:

// * textual layout of both headers
// * structural validation on encode
// * parser tolerance limits
// * linking form registry

#[cfg(test)]
mod tests {

use etax_core::headers::{
    decode_chunk_header, decode_linking_code, encode_chunk_header, encode_linking_code, frame_chunk, ChunkHeader,
    HeaderError, LinkingCode, LinkingForm,
};

const ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

fn linking(form: u16, page: u16) -> LinkingCode {
    LinkingCode {
        form,
        version: 21,
        organization: "00000".into(),
        page,
        has_2d: 0,
        orientation: 0,
        position: 3,
    }
}

// ## 1️⃣ Chunk header

    #[test]
    fn chunk_header_layout() {
        let bytes = encode_chunk_header(&ChunkHeader::new(ID, 2, 17)).unwrap();
        assert_eq!(bytes, format!("{}|2|17|", ID).into_bytes());
        assert!(bytes.len() <= ChunkHeader::MAX_LEN);
    }

    #[test]
    fn chunk_header_parses_with_data_offset() {
        let framed = frame_chunk(&ChunkHeader::new(ID, 3, 3), b"\x78\xda\x00|tail").unwrap();
        let (header, offset) = decode_chunk_header(&framed).unwrap();
        assert_eq!(header, ChunkHeader::new(ID, 3, 3));
        // delimiters inside the data are not part of the header
        assert_eq!(&framed[offset..], b"\x78\xda\x00|tail");
    }

    #[test]
    fn longest_header_matches_max_len() {
        let bytes = encode_chunk_header(&ChunkHeader::new(ID, 999, 999)).unwrap();
        assert_eq!(bytes.len(), ChunkHeader::MAX_LEN);
    }

    #[test]
    fn chunk_header_encode_rejects_bad_fields() {
        assert!(matches!(
            encode_chunk_header(&ChunkHeader::new("", 1, 1)),
            Err(HeaderError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            encode_chunk_header(&ChunkHeader::new("a|b", 1, 1)),
            Err(HeaderError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            encode_chunk_header(&ChunkHeader::new(ID, 1, 0)),
            Err(HeaderError::FieldOutOfRange { field: "total", .. })
        ));
        assert!(matches!(
            encode_chunk_header(&ChunkHeader::new(ID, 1, 1000)),
            Err(HeaderError::FieldOutOfRange { field: "total", .. })
        ));
    }

    #[test]
    fn out_of_range_index_still_parses() {
        // Reassembly must see these to report them.
        let (header, _) = decode_chunk_header(format!("{}|9|3|", ID).as_bytes()).unwrap();
        assert!(!header.in_range());
        let (header, _) = decode_chunk_header(format!("{}|0|3|", ID).as_bytes()).unwrap();
        assert!(!header.in_range());
    }

    #[test]
    fn chunk_header_decode_failures() {
        assert_eq!(decode_chunk_header(b""), Err(HeaderError::Truncated));
        assert_eq!(decode_chunk_header(b"abc|1|"), Err(HeaderError::MissingDelimiter { found: 2 }));
        assert!(matches!(
            decode_chunk_header(b"abc|x|2|"),
            Err(HeaderError::InvalidNumber { field: "index", .. })
        ));
        assert!(matches!(
            decode_chunk_header(b"abc|1|-2|"),
            Err(HeaderError::InvalidNumber { field: "total", .. })
        ));
    }

// ## 2️⃣ Linking record

    #[test]
    fn linking_code_layout() {
        assert_eq!(encode_linking_code(&linking(197, 1)).unwrap(), "1972100000001003");
        assert_eq!(encode_linking_code(&linking(196, 12)).unwrap(), "1962100000012003");
    }

    #[test]
    fn linking_code_parses_back() {
        let code = decode_linking_code("1962200000004103").unwrap();
        assert_eq!(code.form, 196);
        assert_eq!(code.version, 22);
        assert_eq!(code.organization, "00000");
        assert_eq!(code.page, 4);
        assert_eq!(code.has_2d, 1);
        assert_eq!(code.orientation, 0);
        assert_eq!(code.position, 3);
        assert!(code.is_data_form());
        assert!(code.is_known_version());
    }

    #[test]
    fn linking_code_rejects_wrong_length_and_letters() {
        assert_eq!(
            decode_linking_code("19721"),
            Err(HeaderError::InvalidLength { expected: 16, actual: 5 })
        );
        assert!(matches!(
            decode_linking_code("19721000000010A3"),
            Err(HeaderError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn linking_code_encode_validates() {
        let mut code = linking(197, 1);
        code.organization = "12".into();
        assert!(encode_linking_code(&code).is_err());

        let mut code = linking(197, 1000);
        assert!(matches!(
            encode_linking_code(&code),
            Err(HeaderError::FieldOutOfRange { field: "page", .. })
        ));
        code.page = 1;
        code.position = 10;
        assert!(encode_linking_code(&code).is_err());
    }

// ## 3️⃣ Linking form registry

    #[test]
    fn linking_form_verify() {
        assert_eq!(LinkingForm::verify(197).unwrap(), LinkingForm::Summary);
        assert_eq!(LinkingForm::verify(196).unwrap(), LinkingForm::Data);
        assert_eq!(LinkingForm::verify(198), Err(HeaderError::UnknownForm(198)));
        assert_eq!(HeaderError::UnknownForm(42).to_string(), "unknown linking form 042");
    }

    #[test]
    fn expected_form_by_page() {
        assert_eq!(LinkingForm::expected_for_page(1), LinkingForm::Summary);
        assert_eq!(LinkingForm::expected_for_page(2), LinkingForm::Data);
        assert_eq!(LinkingForm::expected_for_page(40), LinkingForm::Data);
    }
}
