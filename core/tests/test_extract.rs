#[cfg(test)]
mod tests {
    use image::GrayImage;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, ObjectId, Stream};

    use etax_core::compression::{compress, CompressionScheme};
    use etax_core::config::{CodecProfile, RasterScale};
    use etax_core::document::{harvest_images, DocumentError, Harvest, HarvestedImage};
    use etax_core::extract::{classify, classify_document, read_images, DocumentFormat, WireFormat};
    use etax_core::raster::{binarize, otsu_threshold, stretch_contrast, Transform};
    use etax_core::segmenting::{frame_segment, split_segments, WireVariant};
    use etax_core::symbol::{encode_linking, encode_symbol};
    use etax_core::telemetry::TelemetryCounters;

    const ID: &str = "9b2c6a60-7a4e-4bd7-9a36-0b8e6f1d8c11";

    fn unit() -> RasterScale {
        RasterScale { module_px: 1, row_px: 1, quiet_zone_modules: 0 }
    }

    fn symbol_raster(data: &[u8]) -> GrayImage {
        encode_symbol(data, &CodecProfile::default().geometry, &unit()).unwrap().raster
    }

    fn harvest(images: Vec<(u32, GrayImage)>) -> Harvest {
        let page_count = images.iter().map(|(p, _)| *p as usize).max().unwrap_or(0);
        Harvest {
            page_count,
            images: images
                .into_iter()
                .enumerate()
                .map(|(i, (page, raster))| HarvestedImage {
                    page,
                    name: format!("Im{}", i + 1),
                    object_id: (i as u32 + 10, 0),
                    raster,
                })
                .collect(),
            warnings: Vec::new(),
        }
    }

    /// Map 0..=255 linearly onto lo..=hi.
    fn squash(img: &GrayImage, lo: u8, hi: u8) -> GrayImage {
        let mut out = img.clone();
        for p in out.pixels_mut() {
            p[0] = lo + ((u16::from(p[0]) * u16::from(hi - lo)) / 255) as u8;
        }
        out
    }

    fn image_xobject(doc: &mut Document, raster: &GrayImage) -> ObjectId {
        doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width() as i64,
                "Height" => raster.height() as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            raster.as_raw().clone(),
        ))
    }

    /// Content stream that draws each named XObject inside its own `q ... Q`.
    fn draws(names: &[&str]) -> Vec<u8> {
        let operations: Vec<Operation> = names
            .iter()
            .flat_map(|name| {
                [
                    Operation::new("q", vec![]),
                    Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ]
            })
            .collect();
        Content { operations }.encode().unwrap()
    }

    /// Form XObject whose own resources map each name to an object.
    fn form_xobject(resources: &[(&str, ObjectId)]) -> Object {
        let mut xobjects = lopdf::Dictionary::new();
        for &(name, id) in resources {
            xobjects.set(name, id);
        }
        let names: Vec<&str> = resources.iter().map(|&(name, _)| name).collect();
        Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 300.into(), 40.into()],
                "Resources" => dictionary! { "XObject" => xobjects },
            },
            draws(&names),
        ))
    }

    /// Single page drawing `/name`, resolved in the page resources to `target`.
    fn one_page(doc: &mut Document, name: &str, target: ObjectId) {
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, draws(&[name])));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! { "XObject" => dictionary! { name => target } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
    }

    /// Page -> Fm0 -> Fm1 -> ... -> Fm{forms-1} -> Im0.
    fn form_chain(forms: usize, raster: &GrayImage) -> Document {
        let mut doc = Document::with_version("1.5");
        let mut target = image_xobject(&mut doc, raster);
        let mut name = "Im0".to_string();
        for level in (0..forms).rev() {
            target = doc.add_object(form_xobject(&[(name.as_str(), target)]));
            name = format!("Fm{}", level);
        }
        one_page(&mut doc, &name, target);
        doc
    }

    fn compressed_payload() -> Vec<u8> {
        let text: String = (0..400).map(|i| format!("<position id=\"{}\" value=\"{}\"/>", i, i * 17 % 1000)).collect();
        compress(CompressionScheme::Zlib, 9, text.as_bytes()).unwrap()
    }

    // # ✅ 1. Transforms

    #[test]
    fn contrast_stretch_restores_full_range() {
        let faded = squash(&symbol_raster(b"faded"), 140, 200);
        let stretched = stretch_contrast(&faded).unwrap();
        let (lo, hi) = stretched.pixels().fold((255u8, 0u8), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        assert_eq!((lo, hi), (0, 255));
        assert!(stretch_contrast(&stretched).is_none());
    }

    #[test]
    fn otsu_splits_two_levels() {
        let img = squash(&symbol_raster(b"two levels"), 60, 100);
        let t = otsu_threshold(&img);
        assert!((60..100).contains(&t));
        let bw = binarize(&img, t);
        assert!(bw.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn low_contrast_symbol_is_recovered() {
        let data = b"low contrast payload".to_vec();
        let h = harvest(vec![(2, squash(&symbol_raster(&data), 140, 200))]);
        let mut counters = TelemetryCounters::default();

        let readings = read_images(&h, &Transform::default_chain(), &mut counters);
        assert_eq!(readings.symbols.len(), 1);
        assert_eq!(readings.symbols[0].bytes, data);
        assert_eq!(readings.symbols[0].transforms, vec![Transform::ContrastBoost]);
        assert_eq!(counters.transforms_applied, 1);
    }

    #[test]
    fn offset_brightness_symbol_is_recovered() {
        // Everything is below the fixed dark threshold until stretched.
        let data = b"dark scan".to_vec();
        let h = harvest(vec![(2, squash(&symbol_raster(&data), 20, 90))]);
        let readings = read_images(&h, &Transform::default_chain(), &mut TelemetryCounters::default());
        assert_eq!(readings.symbols.len(), 1);
        assert_eq!(readings.symbols[0].bytes, data);
    }

    #[test]
    fn without_transforms_the_faded_symbol_is_unreadable() {
        let h = harvest(vec![(2, squash(&symbol_raster(b"x"), 140, 200))]);
        let mut counters = TelemetryCounters::default();
        let readings = read_images(&h, &[], &mut counters);
        assert!(readings.symbols.is_empty());
        assert_eq!(readings.unreadable, vec![(2, "Im1".to_string())]);
        assert_eq!(counters.unreadable_images, 1);
    }

    #[test]
    fn transform_names_parse() {
        for t in Transform::default_chain() {
            assert_eq!(t.name().parse::<Transform>().unwrap(), t);
        }
        assert!("sharpen".parse::<Transform>().is_err());
    }

    // # ✅ 2. Reading

    #[test]
    fn both_symbologies_and_duplicates() {
        let data = b"same bytes twice".to_vec();
        let h = harvest(vec![
            (1, encode_linking("1972100000001003", 28, 10).unwrap()),
            (2, symbol_raster(&data)),
            (2, symbol_raster(&data)),
            (2, encode_linking("1962100000002003", 28, 10).unwrap()),
        ]);
        let mut counters = TelemetryCounters::default();
        let readings = read_images(&h, &Transform::default_chain(), &mut counters);

        assert_eq!(readings.symbols.len(), 1);
        assert_eq!(readings.duplicates_dropped, 1);
        assert_eq!(readings.linking.len(), 2);
        assert_eq!(readings.linking[1].page, 2);
        assert_eq!(counters.symbols_read, 2);
        assert_eq!(counters.linking_read, 2);
    }

    // # ✅ 3. Classification

    #[test]
    fn classification_is_stable() {
        let compressed = compressed_payload();
        let segments = split_segments(&compressed, 333).unwrap();
        for variant in [WireVariant::Direct, WireVariant::Chunked] {
            for seg in &segments {
                let framed = frame_segment(seg, variant, ID).unwrap();
                assert_eq!(classify(&framed), classify(&framed));
            }
        }
    }

    #[test]
    fn first_symbols_classify_by_variant() {
        let compressed = compressed_payload();
        let segments = split_segments(&compressed, 333).unwrap();

        let direct = frame_segment(&segments[0], WireVariant::Direct, ID).unwrap();
        assert_eq!(classify(&direct), WireFormat::Direct { scheme: CompressionScheme::Zlib });

        for seg in &segments {
            let chunked = frame_segment(seg, WireVariant::Chunked, ID).unwrap();
            match classify(&chunked) {
                WireFormat::Chunked { header, data } => {
                    assert_eq!(header.document_id, ID);
                    assert_eq!(header.index, seg.wire_index());
                    assert_eq!(data, seg.padded_bytes());
                }
                other => panic!("expected chunked, got {other}"),
            }
        }
    }

    #[test]
    fn gzip_stream_classifies_as_direct() {
        let gz = compress(CompressionScheme::Gzip, 9, b"<taxStatement/>").unwrap();
        assert_eq!(classify(&gz), WireFormat::Direct { scheme: CompressionScheme::Gzip });
        assert_eq!(classify(b"\x00\x01\x02plain"), WireFormat::Unknown);
    }

    #[test]
    fn mixed_documents_pick_the_majority() {
        let compressed = compressed_payload();
        let segments = split_segments(&compressed, 333).unwrap();
        assert!(segments.len() >= 2);

        let mut rasters: Vec<(u32, GrayImage)> = segments
            .iter()
            .map(|s| (2, symbol_raster(&frame_segment(s, WireVariant::Chunked, ID).unwrap())))
            .collect();
        rasters.push((3, symbol_raster(&frame_segment(&segments[0], WireVariant::Direct, ID).unwrap())));

        let readings = read_images(&harvest(rasters), &[], &mut TelemetryCounters::default());
        let doc = classify_document(&readings.symbols);
        assert_eq!(doc.format(), DocumentFormat::Mixed);
        assert_eq!(doc.dominant(), DocumentFormat::Chunked);
        assert_eq!(doc.chunked.len(), segments.len());
    }

    // # ✅ 4. Harvesting through form XObjects

    #[test]
    fn image_inside_nested_forms_is_harvested() {
        let raster = symbol_raster(b"drawn through two forms");
        let doc = form_chain(2, &raster);

        let h = harvest_images(&doc, CodecProfile::default().harvest_depth);
        assert_eq!(h.page_count, 1);
        assert_eq!(h.images.len(), 1);
        assert_eq!(h.images[0].page, 1);
        assert_eq!(h.images[0].name, "Im0");
        assert_eq!(h.images[0].raster, raster);
        assert!(h.warnings.is_empty(), "{:?}", h.warnings);
    }

    #[test]
    fn forms_beyond_the_depth_bound_are_skipped() {
        let raster = symbol_raster(b"too deep");
        let doc = form_chain(5, &raster);

        let shallow = harvest_images(&doc, 3);
        assert!(shallow.images.is_empty());
        assert_eq!(shallow.warnings.len(), 1);
        assert!(shallow.warnings[0].contains("/Fm3 nested deeper than 3"), "{}", shallow.warnings[0]);

        let deep = harvest_images(&doc, 5);
        assert_eq!(deep.images.len(), 1);
        assert!(deep.warnings.is_empty());
    }

    #[test]
    fn self_referencing_form_terminates() {
        let raster = symbol_raster(b"loop");
        let mut doc = Document::with_version("1.5");
        let image_id = image_xobject(&mut doc, &raster);
        let form_id = doc.new_object_id();
        doc.objects.insert(form_id, form_xobject(&[("Fm0", form_id), ("Im0", image_id)]));
        one_page(&mut doc, "Fm0", form_id);

        let h = harvest_images(&doc, 64);
        assert_eq!(h.images.len(), 1);
        assert_eq!(h.images[0].raster, raster);
        assert!(h.warnings.is_empty(), "{:?}", h.warnings);
    }

    // # ✅ 5. Document container

    #[test]
    fn write_failures_convert_into_document_errors() {
        let err: DocumentError = std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full").into();
        assert!(matches!(err, DocumentError::Io(_)));
        assert_eq!(err.to_string(), "pdf write failed: disk full");
    }
}
