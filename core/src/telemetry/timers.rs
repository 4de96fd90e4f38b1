//! telemetry/timers.rs
//! Wall-clock accounting per codec stage.
//!
//! Industry notes:
//! - Encode and decode share one `Stage` enum so a report can compare, say,
//!   render time against read time without translating names.
//! - Times are kept in a `BTreeMap` so serialised reports list stages in
//!   pipeline order.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Compress,
    Segment,
    Render,
    Assemble,
    Harvest,
    Read,
    Classify,
    Reassemble,
    Decompress,
    Validate,
}

impl Stage {
    pub const ENCODE: [Stage; 4] = [Stage::Compress, Stage::Segment, Stage::Render, Stage::Assemble];

    /// Stages every decode that gets as far as a payload passes through.
    pub const DECODE: [Stage; 6] = [
        Stage::Harvest,
        Stage::Read,
        Stage::Classify,
        Stage::Reassemble,
        Stage::Decompress,
        Stage::Validate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Compress => "compress",
            Stage::Segment => "segment",
            Stage::Render => "render",
            Stage::Assemble => "assemble",
            Stage::Harvest => "harvest",
            Stage::Read => "read",
            Stage::Classify => "classify",
            Stage::Reassemble => "reassemble",
            Stage::Decompress => "decompress",
            Stage::Validate => "validate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTimes(BTreeMap<Stage, Duration>);

impl StageTimes {
    /// Charge `dur` to `stage`; repeated stages accumulate.
    pub fn record(&mut self, stage: Stage, dur: Duration) {
        *self.0.entry(stage).or_default() += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.0.get(&stage).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.0.values().sum()
    }

    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.0.contains_key(s))
    }

    /// Stage that took longest, if any was recorded.
    pub fn slowest(&self) -> Option<(Stage, Duration)> {
        self.0.iter().max_by_key(|(_, d)| **d).map(|(s, d)| (*s, *d))
    }
}

/// `compress 1.20ms, segment 0.01ms, ...`
impl fmt::Display for StageTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (stage, dur)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {:.2}ms", stage, dur.as_secs_f64() * 1_000.0)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    started: Instant,
    ended: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { started: Instant::now(), ended: None, stage_times: StageTimes::default() }
    }

    /// Freeze `elapsed()`. Later calls keep the first end time.
    pub fn finish(&mut self) {
        self.ended.get_or_insert_with(Instant::now);
    }

    pub fn record(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.record(stage, dur);
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.record(stage, t.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        self.ended.unwrap_or_else(Instant::now).duration_since(self.started)
    }
}
