//! Scenario and property tests over the telemetry ring buffer, from
//! `SPEC_FULL.md` §8.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jit_expr_ir::telemetry::record::{Entry, Kind};
use jit_expr_ir::telemetry::{Sink, Telemetry, TelemetryConfig};

struct VecSink(Mutex<Vec<Entry>>);

impl VecSink {
    fn new() -> Self {
        VecSink(Mutex::new(Vec::new()))
    }
}

impl Sink for VecSink {
    fn write_line(&self, _line: &str) -> std::io::Result<()> {
        unreachable!("write_entry is overridden below")
    }

    fn write_entry(&self, entry: &Entry, _epoch_cycles: u64) -> std::io::Result<()> {
        self.0.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Scenario 4: two producers each calling `interval_start` 100000 times
/// concurrently must yield 200000 distinct interval ids, even though the
/// ring is far smaller and most records get overwritten before the drain
/// thread ever sees them.
#[test]
fn two_producers_emit_two_hundred_thousand_distinct_interval_ids() {
    let sink = Arc::new(VecSink::new());
    let config = TelemetryConfig {
        ring_capacity: 256,
        calibrate_on_init: false,
        drain_interval: Duration::from_secs(3600),
        ..TelemetryConfig::default()
    };
    let telemetry = Arc::new(Telemetry::new(config, sink));

    const PER_PRODUCER: usize = 100_000;
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let telemetry = Arc::clone(&telemetry);
            std::thread::spawn(move || {
                let mut ids = Vec::with_capacity(PER_PRODUCER);
                for _ in 0..PER_PRODUCER {
                    ids.push(telemetry.interval_start("work"));
                }
                ids
            })
        })
        .collect();

    let mut all_ids = Vec::with_capacity(2 * PER_PRODUCER);
    for h in handles {
        all_ids.extend(h.join().unwrap());
    }

    assert_eq!(all_ids.len(), 2 * PER_PRODUCER);
    let unique: std::collections::HashSet<u64> = all_ids.iter().copied().collect();
    assert_eq!(unique.len(), 2 * PER_PRODUCER);
}

/// Scenario 5: calibration, when enabled, emits exactly one `Calibration`
/// record followed by exactly one `Epoch` record, both before any
/// subsequent record.
#[test]
fn calibration_precedes_a_single_epoch_record() {
    let sink = Arc::new(VecSink::new());
    let config = TelemetryConfig {
        calibrate_on_init: true,
        calibration_sleep: Duration::from_millis(20),
        drain_interval: Duration::from_secs(3600),
        ..TelemetryConfig::default()
    };
    let telemetry = Telemetry::new(config, Arc::clone(&sink));
    telemetry.timestamp("first observable event");
    telemetry.finish();

    let entries = sink.0.lock().unwrap();
    let kinds: Vec<&Kind> = entries.iter().map(|e| &e.kind).collect();
    assert!(matches!(kinds[0], Kind::Calibration { .. }));
    assert!(matches!(kinds[1], Kind::Epoch { .. }));
    assert!(kinds[2..].iter().all(|k| !matches!(k, Kind::Calibration { .. } | Kind::Epoch { .. })));
}

/// Scenario 6: start A, start B, stop A, stop B — the serialized stream
/// preserves producer order and the start/end pairs share an interval id.
#[test]
fn interleaved_intervals_preserve_producer_order_and_matching_ids() {
    let sink = Arc::new(VecSink::new());
    let config = TelemetryConfig {
        calibrate_on_init: false,
        drain_interval: Duration::from_secs(3600),
        ..TelemetryConfig::default()
    };
    let telemetry = Telemetry::new(config, Arc::clone(&sink));

    let a = telemetry.interval_start("a");
    let b = telemetry.interval_start("b");
    telemetry.interval_end(a, "a");
    telemetry.interval_end(b, "b");
    telemetry.finish();

    let entries = sink.0.lock().unwrap();
    let descriptions_and_kinds: Vec<(String, u64)> = entries
        .iter()
        .filter_map(|e| match &e.kind {
            Kind::IntervalStart { interval_id, description, .. } => {
                Some((format!("start-{description}"), *interval_id))
            }
            Kind::IntervalEnd { interval_id, description, .. } => {
                Some((format!("end-{description}"), *interval_id))
            }
            _ => None,
        })
        .collect();

    assert_eq!(
        descriptions_and_kinds.iter().map(|(label, _)| label.clone()).collect::<Vec<_>>(),
        vec!["start-a", "start-b", "end-a", "end-b"],
    );
    assert_eq!(descriptions_and_kinds[0].1, a);
    assert_eq!(descriptions_and_kinds[2].1, a);
    assert_eq!(descriptions_and_kinds[1].1, b);
    assert_eq!(descriptions_and_kinds[3].1, b);
    assert_ne!(a, b);
}

/// For any interval id seen in both an `IntervalStart` and an
/// `IntervalEnd`, the start's cycle count never exceeds the end's.
#[test]
fn interval_end_cycle_never_precedes_its_start() {
    let sink = Arc::new(VecSink::new());
    let config = TelemetryConfig {
        calibrate_on_init: false,
        drain_interval: Duration::from_secs(3600),
        ..TelemetryConfig::default()
    };
    let telemetry = Telemetry::new(config, Arc::clone(&sink));

    for _ in 0..64 {
        let id = telemetry.interval_start("probe");
        telemetry.interval_end(id, "probe");
    }
    telemetry.finish();

    let entries = sink.0.lock().unwrap();
    let mut starts: HashMap<u64, u64> = HashMap::new();
    for entry in entries.iter() {
        if let Kind::IntervalStart { interval_id, cycles, .. } = &entry.kind {
            starts.insert(*interval_id, *cycles);
        }
    }
    for entry in entries.iter() {
        if let Kind::IntervalEnd { interval_id, cycles, .. } = &entry.kind {
            if let Some(start_cycles) = starts.get(interval_id) {
                assert!(*start_cycles <= *cycles);
            }
        }
    }
}

/// The ring never serializes more records than it has capacity for: with a
/// capacity of `n` and more than `n` records produced before a drain, the
/// number handed to the sink is exactly `n`.
#[test]
fn drained_record_count_is_capped_at_ring_capacity() {
    let sink = Arc::new(VecSink::new());
    let config = TelemetryConfig {
        calibrate_on_init: false,
        ring_capacity: 16,
        drain_interval: Duration::from_secs(3600),
        ..TelemetryConfig::default()
    };
    let telemetry = Telemetry::new(config, Arc::clone(&sink));
    for _ in 0..100 {
        telemetry.timestamp("tick");
    }
    telemetry.finish();

    assert_eq!(sink.0.lock().unwrap().len(), 16);
}
