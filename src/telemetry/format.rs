//! Rendering [`Entry`] records to the plain-text trace format the
//! background drain thread writes.
//!
//! One line per record, thread id first, matching the layout the original
//! profiler's `serializeTelemetryBuffer` produces: a calibration line is
//! self-describing prose, everything else is `<tid> <cycles> <marker>
//! "<description>"`, with the marker distinguishing timestamps (`-|-`),
//! interval open/close (`(-`/`-)`), and annotations (`???`, which carry no
//! cycle count of their own). The thread id always prints as a 10-wide hex
//! field, and every cycle count except the epoch baseline itself is
//! rendered relative to that baseline.

use std::fmt::Write as _;

use crate::telemetry::record::{Entry, Kind};

/// Render one entry as a single trace line, without a trailing newline.
///
/// `epoch_cycles` is the baseline sampled by the session's `Epoch` record;
/// every cycle count other than `Epoch`'s own is rendered as its distance
/// from that baseline (saturating at zero if a record predates it, which
/// can only happen if the ring overwrote the `Epoch` entry before it was
/// drained).
pub fn format_entry(entry: &Entry, epoch_cycles: u64) -> String {
    let mut line = String::new();
    let tid = entry.tid;
    let relative = |cycles: u64| cycles.saturating_sub(epoch_cycles);
    match &entry.kind {
        Kind::Calibration { ticks_per_second } => {
            let _ = write!(line, "{tid:>10x} Calibration: {ticks_per_second} ticks per second");
        }
        Kind::Epoch { cycles } => {
            let _ = write!(line, "{tid:>10x} Epoch counter: {cycles}");
        }
        Kind::Timestamp { cycles, description } => {
            let _ = write!(line, "{tid:>10x} {} -|- \"{description}\"", relative(*cycles));
        }
        Kind::IntervalStart { interval_id, cycles, description } => {
            let _ = write!(line, "{tid:>10x} {} (- \"{description}\" ({interval_id})", relative(*cycles));
        }
        Kind::IntervalEnd { interval_id, cycles, description } => {
            let _ = write!(line, "{tid:>10x} {} -) \"{description}\" ({interval_id})", relative(*cycles));
        }
        Kind::IntervalAnnotation { interval_id, description } => {
            let _ = write!(line, "{tid:>10x}                ???  \"{description}\" ({interval_id})");
        }
        Kind::DynamicString { interval_id, description } => {
            let _ = write!(line, "{tid:>10x}                ???  \"{description}\" ({interval_id})");
        }
    }
    line
}
