#[cfg(test)]
mod tests {
    use image::{imageops, GrayImage, Luma};
    use rxing::oned::Code128Writer;
    use rxing::pdf417::encoder::Dimensions;
    use rxing::pdf417::PDF417Writer;
    use rxing::{BarcodeFormat, DecodeHintValue, DecodeHints, EncodeHintValue, EncodeHints, Writer};

    use etax_core::config::{CodecProfile, RasterScale, SymbolGeometry};
    use etax_core::symbol::pdf417::ecc::correct;
    use etax_core::symbol::pdf417::{build_codewords, row_modules};
    use etax_core::symbol::{encode_linking, encode_symbol, read_linking, read_symbol, SymbolError};

    fn geometry() -> SymbolGeometry {
        CodecProfile::default().geometry
    }

    fn unit() -> RasterScale {
        RasterScale { module_px: 1, row_px: 1, quiet_zone_modules: 0 }
    }

    fn bytes(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(seed)).collect()
    }

    // # ✅ 1. Geometry

    #[test]
    fn default_geometry_budget() {
        let g = geometry();
        assert_eq!((g.columns, g.rows, g.ec_level), (13, 35, 4));
        assert_eq!(g.ec_codewords(), 32);
        assert_eq!(g.data_codewords(), 423);
        assert_eq!(g.byte_capacity(), 505);
        assert_eq!(row_modules(13), 290);
    }

    #[test]
    fn unit_scale_raster_is_290_by_35() {
        let symbol = encode_symbol(&bytes(470, 1), &geometry(), &unit()).unwrap();
        assert_eq!((symbol.width(), symbol.height()), (290, 35));
    }

    #[test]
    fn geometry_does_not_depend_on_length() {
        let small = encode_symbol(&bytes(1, 0), &geometry(), &unit()).unwrap();
        let full = encode_symbol(&bytes(505, 0), &geometry(), &unit()).unwrap();
        assert_eq!(small.raster.dimensions(), full.raster.dimensions());
        assert_eq!(small.geometry, full.geometry);
        assert!(small.used_codewords < full.used_codewords);
    }

    #[test]
    fn oversize_input_is_a_capacity_error() {
        let err = encode_symbol(&bytes(506, 0), &geometry(), &unit()).unwrap_err();
        assert_eq!(err, SymbolError::Capacity { len: 506, max: 505 });
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let g = SymbolGeometry { columns: 31, rows: 35, ec_level: 4 };
        assert!(matches!(encode_symbol(b"x", &g, &unit()), Err(SymbolError::Geometry(_))));
    }

    // # ✅ 2. Round trips

    #[test]
    fn symbol_round_trip_at_unit_scale() {
        for len in [1, 5, 6, 7, 333, 470, 505] {
            let data = bytes(len, len as u8);
            let symbol = encode_symbol(&data, &geometry(), &unit()).unwrap();
            let decoded = read_symbol(&symbol.raster).unwrap();
            assert_eq!(decoded.bytes, data, "len {len}");
            assert_eq!((decoded.columns, decoded.rows, decoded.ec_level), (13, 35, 4));
            assert_eq!(decoded.corrected, 0);
        }
    }

    #[test]
    fn symbol_round_trip_scaled_with_quiet_zone() {
        let data = bytes(200, 9);
        let scale = RasterScale { module_px: 3, row_px: 4, quiet_zone_modules: 2 };
        let symbol = encode_symbol(&data, &geometry(), &scale).unwrap();
        assert_eq!(symbol.width(), 290 * 3 + 2 * 6);
        assert_eq!(read_symbol(&symbol.raster).unwrap().bytes, data);
    }

    #[test]
    fn rotated_symbols_are_read() {
        let data = bytes(120, 3);
        let symbol = encode_symbol(&data, &geometry(), &unit()).unwrap();
        for rotated in [
            imageops::rotate90(&symbol.raster),
            imageops::rotate180(&symbol.raster),
            imageops::rotate270(&symbol.raster),
        ] {
            assert_eq!(read_symbol(&rotated).unwrap().bytes, data);
        }
    }

    #[test]
    fn zero_bytes_survive_compaction() {
        let data = vec![0u8; 470];
        let symbol = encode_symbol(&data, &geometry(), &unit()).unwrap();
        assert_eq!(read_symbol(&symbol.raster).unwrap().bytes, data);
    }

    // # ✅ 3. Error correction

    #[test]
    fn reed_solomon_corrects_sixteen_codewords() {
        let g = geometry();
        let (clean, _) = build_codewords(&bytes(400, 7), &g).unwrap();
        let mut damaged = clean.clone();
        for i in 0..16 {
            let at = i * 28 + 3;
            damaged[at] = (damaged[at] + 1 + i as u16) % 929;
        }
        assert_eq!(correct(&mut damaged, g.ec_codewords()).unwrap(), 16);
        assert_eq!(damaged, clean);
    }

    #[test]
    fn missing_row_is_repaired() {
        let data = bytes(470, 11);
        let mut symbol = encode_symbol(&data, &geometry(), &unit()).unwrap();
        for x in 0..symbol.width() {
            symbol.raster.put_pixel(x, 10, Luma([255]));
        }
        let decoded = read_symbol(&symbol.raster).unwrap();
        assert_eq!(decoded.bytes, data);
        assert!(decoded.corrected > 0);
    }

    #[test]
    fn blank_image_is_not_found() {
        let blank = GrayImage::from_pixel(300, 40, Luma([255]));
        assert_eq!(read_symbol(&blank).unwrap_err(), SymbolError::NotFound);
    }

    #[test]
    fn half_the_rows_missing_is_uncorrectable() {
        let data = bytes(470, 5);
        let mut symbol = encode_symbol(&data, &geometry(), &unit()).unwrap();
        for y in 0..17 {
            for x in 0..symbol.width() {
                symbol.raster.put_pixel(x, y, Luma([255]));
            }
        }
        assert!(read_symbol(&symbol.raster).is_err());
    }

    // # ✅ 4. Linking symbol

    #[test]
    fn linking_symbol_round_trip() {
        for text in ["1972100000001003", "1962200000042103"] {
            let img = encode_linking(text, 28, 10).unwrap();
            assert_eq!(read_linking(&img).unwrap(), text);
            assert_eq!(read_linking(&imageops::rotate90(&img)).unwrap(), text);
        }
    }

    #[test]
    fn linking_symbol_is_not_a_2d_symbol() {
        let img = encode_linking("1972100000001003", 28, 10).unwrap();
        assert!(read_symbol(&img).is_err());

        let symbol = encode_symbol(b"abc", &geometry(), &unit()).unwrap();
        assert!(read_linking(&symbol.raster).is_err());
    }

    #[test]
    fn linking_symbol_rejects_odd_or_non_digit_text() {
        assert!(matches!(encode_linking("123", 28, 10), Err(SymbolError::InvalidText(_))));
        assert!(matches!(encode_linking("12a4", 28, 10), Err(SymbolError::InvalidText(_))));
    }

    // # ✅ 5. Interchange with an independent implementation

    /// 13 x 35 at level 4, the layout statement generators use.
    fn written_elsewhere(text: &str, compaction: &str) -> GrayImage {
        let hints = EncodeHints::default()
            .with(EncodeHintValue::Pdf417Compaction(compaction.to_string()))
            .with(EncodeHintValue::Pdf417Dimensions(Dimensions::new(13, 13, 35, 35)))
            .with(EncodeHintValue::ErrorCorrection("4".to_string()))
            .with(EncodeHintValue::Margin("0".to_string()));
        let matrix = PDF417Writer::default()
            .encode_with_hints(text, &BarcodeFormat::PDF_417, 0, 0, &hints)
            .unwrap();
        let (w, h) = (matrix.getWidth(), matrix.getHeight());
        let (scale, quiet) = (3, 30);
        GrayImage::from_fn(w * scale + 2 * quiet, h * scale + 2 * quiet, |x, y| {
            let inside = x >= quiet && y >= quiet && x < w * scale + quiet && y < h * scale + quiet;
            if inside && matrix.get((x - quiet) / scale, (y - quiet) / scale) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    fn read_elsewhere(img: &GrayImage, format: BarcodeFormat) -> String {
        let (w, h) = img.dimensions();
        let mut hints = DecodeHints::default().with(DecodeHintValue::TryHarder(true));
        rxing::helpers::detect_in_luma_with_hints(img.as_raw().clone(), w, h, Some(format), &mut hints)
            .unwrap()
            .getText()
            .to_string()
    }

    #[test]
    fn byte_compacted_symbol_from_another_writer_is_read() {
        for text in [
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><taxStatement id=\"CH-2023-000042\"/>",
            "HELLO-ETAX-12345",
        ] {
            let img = written_elsewhere(text, "2");
            let decoded = read_symbol(&img).unwrap();
            assert_eq!(decoded.bytes, text.as_bytes());
            assert_eq!((decoded.columns, decoded.rows, decoded.ec_level), (13, 35, 4));
        }
    }

    #[test]
    fn text_and_numeric_compaction_from_another_writer_are_read() {
        let text = "eCH-0196 Steuerauszug; AHV 7561234567897123, Total: CHF 1'234.50";
        let img = written_elsewhere(text, "0");
        assert_eq!(read_symbol(&img).unwrap().bytes, text.as_bytes());
    }

    #[test]
    fn our_symbol_is_read_by_another_reader() {
        let text = "HELLO-ETAX-12345 <valor>1234567</valor>";
        let scale = RasterScale { module_px: 3, row_px: 9, quiet_zone_modules: 12 };
        let symbol = encode_symbol(text.as_bytes(), &geometry(), &scale).unwrap();
        assert_eq!(read_elsewhere(&symbol.raster, BarcodeFormat::PDF_417), text);
    }

    #[test]
    fn linking_symbol_interchanges_both_ways() {
        let text = "1972100000001003";
        let ours = encode_linking(text, 28, 10).unwrap();
        let (w, h) = ours.dimensions();
        let ours = imageops::resize(&ours, w * 3, h * 3, imageops::FilterType::Nearest);
        assert_eq!(read_elsewhere(&ours, BarcodeFormat::CODE_128), text);

        let matrix = Code128Writer::default().encode(text, &BarcodeFormat::CODE_128, 0, 30).unwrap();
        let theirs = GrayImage::from_fn(matrix.getWidth(), matrix.getHeight(), |x, y| {
            if matrix.get(x, y) {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        assert_eq!(read_linking(&theirs).unwrap(), text);
    }
}
