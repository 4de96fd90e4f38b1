//! telemetry/counters.rs
//! Mutable counters collected while a document is encoded or decoded.
//!
//! Converted into an immutable `TelemetrySnapshot` when the run ends.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub bytes_payload: u64,
    pub bytes_compressed: u64,
    pub bytes_padding: u64,
    pub segments: u64,
    pub symbols_rendered: u64,
    pub pages: u64,
    pub images_harvested: u64,
    pub symbols_read: u64,
    pub linking_read: u64,
    pub transforms_applied: u64,
    pub duplicates_dropped: u64,
    pub codewords_corrected: u64,
    pub unreadable_images: u64,
}

impl TelemetryCounters {
    /// Record one segment handed to the renderer.
    pub fn add_segment(&mut self, padding: usize) {
        self.segments += 1;
        self.bytes_padding += padding as u64;
    }

    /// Record one successful 2D read.
    ///
    /// - `corrected`: codewords repaired by error correction
    /// - `transforms`: fallback transforms applied before the read succeeded
    pub fn add_symbol_read(&mut self, corrected: usize, transforms: usize) {
        self.symbols_read += 1;
        self.codewords_corrected += corrected as u64;
        self.transforms_applied += transforms as u64;
    }

    pub fn add_linking_read(&mut self, transforms: usize) {
        self.linking_read += 1;
        self.transforms_applied += transforms as u64;
    }

    /// Padding share of the rendered bytes.
    pub fn padding_ratio(&self) -> f64 {
        let total = self.bytes_compressed + self.bytes_padding;
        if total == 0 {
            0.0
        } else {
            self.bytes_padding as f64 / total as f64
        }
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.bytes_payload       += rhs.bytes_payload;
        self.bytes_compressed    += rhs.bytes_compressed;
        self.bytes_padding       += rhs.bytes_padding;
        self.segments            += rhs.segments;
        self.symbols_rendered    += rhs.symbols_rendered;
        self.pages               += rhs.pages;
        self.images_harvested    += rhs.images_harvested;
        self.symbols_read        += rhs.symbols_read;
        self.linking_read        += rhs.linking_read;
        self.transforms_applied  += rhs.transforms_applied;
        self.duplicates_dropped  += rhs.duplicates_dropped;
        self.codewords_corrected += rhs.codewords_corrected;
        self.unreadable_images   += rhs.unreadable_images;
    }
}
