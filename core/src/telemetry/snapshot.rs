//! telemetry/snapshot.rs
//! Immutable summary of one encode or decode run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    /// `bytes_compressed / bytes_payload`, capped at 1.
    pub compression_ratio: f64,
    /// Null padding as a share of all bytes carried by symbols.
    pub padding_ratio: f64,
    /// Reed-Solomon repairs per successfully read symbol.
    pub corrections_per_symbol: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn capture(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        Self {
            counters: counters.clone(),
            compression_ratio: ratio(counters.bytes_compressed, counters.bytes_payload).min(1.0),
            padding_ratio: counters.padding_ratio(),
            corrections_per_symbol: ratio(counters.codewords_corrected, counters.symbols_read),
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Ratios bounded and stage times within the run's wall time.
    pub fn is_consistent(&self) -> bool {
        self.compression_ratio <= 1.0 && self.padding_ratio <= 1.0 && self.total_stage_time() <= self.elapsed
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
