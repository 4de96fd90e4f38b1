//! extract/reader.rs
//! Turn harvested images into symbol readings.
//!
//! Industry notes:
//! - Every image is tried as-is first, then through the configured transform
//!   chain. Transforms accumulate (a contrast-boosted image is what gets
//!   upscaled), and the first attempt that reads stops the chain.
//! - Each attempt tries the 2D reader and then the linking reader, so an image
//!   never has to be classified before it is read.
//! - 2D readings are de-duplicated on their bytes.

use std::collections::HashSet;

use image::GrayImage;
use log::{debug, trace};

use crate::document::{Harvest, HarvestedImage};
use crate::raster::Transform;
use crate::symbol::{read_linking, read_symbol, DecodedSymbol};
use crate::telemetry::TelemetryCounters;

/// One 2D symbol read off a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReading {
    pub page: u32,
    pub image: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
    pub columns: usize,
    pub corrected: usize,
    /// Transforms applied before the read succeeded.
    pub transforms: Vec<Transform>,
}

/// One linking symbol read off a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingReading {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Readings {
    pub symbols: Vec<SymbolReading>,
    pub linking: Vec<LinkingReading>,
    pub duplicates_dropped: usize,
    /// `(page, image name)` of images nothing could be read from.
    pub unreadable: Vec<(u32, String)>,
}

enum Read {
    Symbol(DecodedSymbol),
    Linking(String),
}

fn attempt(img: &GrayImage) -> Option<Read> {
    match read_symbol(img) {
        Ok(decoded) => return Some(Read::Symbol(decoded)),
        Err(e) => trace!("2D read failed: {}", e),
    }
    read_linking(img).ok().map(Read::Linking)
}

/// Read one image through the fallback chain.
fn read_image(img: &HarvestedImage, transforms: &[Transform]) -> Option<(Read, Vec<Transform>)> {
    if let Some(read) = attempt(&img.raster) {
        return Some((read, Vec::new()));
    }

    let mut current = img.raster.clone();
    let mut applied = Vec::new();
    for transform in transforms {
        let Some(next) = transform.apply(&current) else {
            continue;
        };
        current = next;
        applied.push(*transform);
        if let Some(read) = attempt(&current) {
            debug!("page {}: /{} read after {:?}", img.page, img.name, applied);
            return Some((read, applied));
        }
    }
    None
}

/// Read every harvested image, in harvest order.
pub fn read_images(harvest: &Harvest, transforms: &[Transform], counters: &mut TelemetryCounters) -> Readings {
    let mut readings = Readings::default();
    let mut seen_symbols: HashSet<Vec<u8>> = HashSet::new();
    let mut seen_linking: HashSet<(u32, String)> = HashSet::new();

    for img in &harvest.images {
        match read_image(img, transforms) {
            Some((Read::Symbol(decoded), applied)) => {
                counters.add_symbol_read(decoded.corrected, applied.len());
                if !seen_symbols.insert(decoded.bytes.clone()) {
                    readings.duplicates_dropped += 1;
                    counters.duplicates_dropped += 1;
                    debug!("page {}: /{} duplicates an earlier symbol", img.page, img.name);
                    continue;
                }
                readings.symbols.push(SymbolReading {
                    page: img.page,
                    image: img.name.clone(),
                    bytes: decoded.bytes,
                    rows: decoded.rows,
                    columns: decoded.columns,
                    corrected: decoded.corrected,
                    transforms: applied,
                });
            }
            Some((Read::Linking(text), applied)) => {
                counters.add_linking_read(applied.len());
                if seen_linking.insert((img.page, text.clone())) {
                    readings.linking.push(LinkingReading { page: img.page, text });
                }
            }
            None => {
                counters.unreadable_images += 1;
                readings.unreadable.push((img.page, img.name.clone()));
            }
        }
    }
    readings
}
