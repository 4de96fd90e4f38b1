//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for encode and decode runs.
//!
//! Industry notes:
//! - Counters are plain integers owned by one run and merged at the end; no
//!   atomics or locks are involved.
//! - Stage timers make it visible whether time goes to compression, symbol
//!   rendering or image reading.
//! - Snapshots are immutable and serde-serialisable so the CLI can print them
//!   next to a validation report.

pub mod counters;
pub mod snapshot;
pub mod timers;

pub use counters::*;
pub use snapshot::*;
pub use timers::*;
