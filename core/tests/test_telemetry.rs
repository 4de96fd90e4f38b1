#[cfg(test)]
mod tests {
    use std::time::Duration;

    use etax_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    /// Counters of a typical 50k-character statement in the direct variant.
    fn encode_counters() -> TelemetryCounters {
        TelemetryCounters {
            bytes_payload: 50_000,
            bytes_compressed: 8_000,
            bytes_padding: 460,
            segments: 18,
            symbols_rendered: 18,
            pages: 4,
            ..TelemetryCounters::default()
        }
    }

    /// Finished timer with 15 ms charged to stages inside a longer run.
    fn finished_timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        std::thread::sleep(Duration::from_millis(20));
        timer.record(Stage::Compress, Duration::from_millis(5));
        timer.record(Stage::Render, Duration::from_millis(10));
        timer.finish();
        timer
    }

    // # ✅ 1. Ratios

    #[test]
    fn compression_ratio_never_exceeds_one() {
        let mut counters = encode_counters();
        counters.bytes_compressed = counters.bytes_payload + 30;
        let snapshot = TelemetrySnapshot::capture(&counters, &finished_timer());
        assert_eq!(snapshot.compression_ratio, 1.0);
    }

    #[test]
    fn padding_ratio_is_share_of_symbol_bytes() {
        let snapshot = TelemetrySnapshot::capture(&encode_counters(), &finished_timer());
        assert!((snapshot.padding_ratio - 460.0 / 8_460.0).abs() < 1e-9);
        assert_eq!(TelemetryCounters::default().padding_ratio(), 0.0);
    }

    #[test]
    fn corrections_are_averaged_over_reads() {
        let mut counters = TelemetryCounters::default();
        counters.add_symbol_read(4, 0);
        counters.add_symbol_read(0, 2);
        let snapshot = TelemetrySnapshot::capture(&counters, &finished_timer());
        assert_eq!(snapshot.corrections_per_symbol, 2.0);

        let empty = TelemetrySnapshot::capture(&TelemetryCounters::default(), &finished_timer());
        assert_eq!(empty.corrections_per_symbol, 0.0);
    }

    // # ✅ 2. Consistency

    #[test]
    fn finished_run_is_consistent() {
        let snapshot = TelemetrySnapshot::capture(&encode_counters(), &finished_timer());
        assert!(snapshot.is_consistent());
        assert_eq!(snapshot.total_stage_time(), Duration::from_millis(15));
    }

    #[test]
    fn stage_time_beyond_wall_time_is_inconsistent() {
        let mut timer = finished_timer();
        let over = timer.elapsed() + Duration::from_millis(1);
        timer.record(Stage::Assemble, over);
        let snapshot = TelemetrySnapshot::capture(&encode_counters(), &timer);
        assert!(!snapshot.is_consistent());
    }

    #[test]
    fn finish_freezes_elapsed() {
        let mut timer = finished_timer();
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        timer.finish();
        assert_eq!(timer.elapsed(), first);
    }

    // # ✅ 3. Stage accounting

    #[test]
    fn repeated_stage_accumulates() {
        let mut timer = finished_timer();
        timer.record(Stage::Compress, Duration::from_millis(5));
        assert_eq!(timer.stage_times.get(Stage::Compress), Duration::from_millis(10));
        assert_eq!(timer.stage_times.get(Stage::Harvest), Duration::ZERO);
    }

    #[test]
    fn missing_stage_is_detected() {
        let snapshot = TelemetrySnapshot::capture(&encode_counters(), &finished_timer());
        assert!(snapshot.has_all_stages(&[Stage::Compress, Stage::Render]));
        assert!(!snapshot.has_all_stages(&Stage::ENCODE));
    }

    #[test]
    fn timed_closure_returns_its_value() {
        let mut timer = TelemetryTimer::new();
        let value = timer.time(Stage::Decompress, || {
            std::thread::sleep(Duration::from_millis(2));
            7
        });
        assert_eq!(value, 7);
        assert!(timer.stage_times.get(Stage::Decompress) >= Duration::from_millis(2));
    }

    #[test]
    fn display_lists_stages_in_pipeline_order() {
        let mut times = StageTimes::default();
        times.record(Stage::Validate, Duration::from_millis(1));
        times.record(Stage::Harvest, Duration::from_millis(3));
        assert_eq!(times.to_string(), "harvest 3.00ms, validate 1.00ms");
        assert_eq!(times.slowest(), Some((Stage::Harvest, Duration::from_millis(3))));
        assert_eq!(StageTimes::default().slowest(), None);
    }

    // # ✅ 4. Merging and serialisation

    #[test]
    fn counters_merge_with_add_assign() {
        let mut a = encode_counters();
        let mut b = TelemetryCounters::default();
        b.add_symbol_read(3, 1);
        b.add_symbol_read(0, 0);
        b.add_linking_read(2);
        a += b.clone();
        assert_eq!(a.symbols_read, 2);
        assert_eq!(a.codewords_corrected, 3);
        assert_eq!(a.transforms_applied, 3);

        let mut c = encode_counters();
        c.merge(&b);
        assert_eq!(c, a);
    }

    #[test]
    fn snapshot_serialises_with_lowercase_stage_keys() {
        let snapshot = TelemetrySnapshot::capture(&encode_counters(), &finished_timer());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"bytes_padding\":460"));
        assert!(json.contains("\"compress\""));

        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.counters, snapshot.counters);
        assert_eq!(back.stage_times, snapshot.stage_times);
    }
}
