//! A low-overhead, multi-threaded profiling ring buffer.
//!
//! [`Telemetry`] is the handle application code reaches for: it owns a
//! lock-striped [`ring::Ring`] that any number of threads can push
//! [`record::Entry`] values into, and a single background [`drain::Drain`]
//! thread that periodically serializes whatever the ring currently holds
//! out to a [`sink::Sink`]. This is a direct port of the original
//! profiler's telemetry subsystem: one calibration pass relating the TSC
//! to wall-clock time, then timestamp/interval/annotation records keyed by
//! a small per-thread id.

pub mod calibrate;
pub mod config;
pub mod drain;
pub mod format;
pub mod record;
pub mod ring;
pub mod sink;

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use config::TelemetryConfig;
pub use record::{Entry, Kind};
pub use sink::{Sink, TextSink};

static NEXT_TID: AtomicU64 = AtomicU64::new(1);
static NEXT_INTERVAL_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// A small, process-lifetime-unique id for the calling thread, assigned
/// lazily on first use.
///
/// Deliberately not `std::thread::ThreadId`: that type prints as an opaque
/// debug string, where trace output wants a short integer.
pub fn thread_id() -> u64 {
    THREAD_ID.with(|cell| {
        let mut id = cell.get();
        if id == 0 {
            id = NEXT_TID.fetch_add(1, Ordering::Relaxed);
            cell.set(id);
        }
        id
    })
}

/// Allocate a fresh, globally unique interval id.
///
/// Shared across every thread using a given process's telemetry, so two
/// concurrent `interval_start` calls never collide (§8 scenario 4).
fn next_interval_id() -> u64 {
    NEXT_INTERVAL_ID.fetch_add(1, Ordering::Relaxed)
}

/// A handle to the telemetry ring buffer and its background drain thread.
///
/// Cloning is not supported — `Telemetry` owns the drain thread's
/// lifetime, so share one handle (behind an `Arc`, if needed) across the
/// threads that record events.
pub struct Telemetry {
    ring: Arc<ring::Ring>,
    drain: Option<drain::Drain>,
}

impl Telemetry {
    /// Start a telemetry session: allocate the ring, optionally run TSC
    /// calibration, emit an `Epoch` record, and spawn the background
    /// drain thread writing to `sink`.
    pub fn new(config: TelemetryConfig, sink: Arc<dyn Sink>) -> Self {
        let ring = Arc::new(ring::Ring::new(config.ring_capacity));

        if config.calibrate_on_init {
            let cal = calibrate::calibrate(config.calibration_sleep);
            ring.push(Entry {
                tid: thread_id(),
                kind: Kind::Calibration { ticks_per_second: cal.ticks_per_second },
            });
        }
        ring.push(Entry {
            tid: thread_id(),
            kind: Kind::Epoch { cycles: calibrate::read_cycles() },
        });

        let drain = drain::Drain::spawn(Arc::clone(&ring), sink, config.drain_interval);
        Telemetry { ring, drain: Some(drain) }
    }

    /// Record a point-in-time marker.
    pub fn timestamp(&self, description: &'static str) {
        self.push(Kind::Timestamp { cycles: calibrate::read_cycles(), description });
    }

    /// Record the start of a named interval, returning the id its matching
    /// [`interval_end`](Telemetry::interval_end) and any annotations must
    /// reference. Prefer [`Telemetry::interval`] for an RAII-scoped pair.
    pub fn interval_start(&self, description: &'static str) -> u64 {
        let interval_id = next_interval_id();
        self.push(Kind::IntervalStart { interval_id, cycles: calibrate::read_cycles(), description });
        interval_id
    }

    /// Record the end of the interval identified by `interval_id`.
    pub fn interval_end(&self, interval_id: u64, description: &'static str) {
        self.push(Kind::IntervalEnd { interval_id, cycles: calibrate::read_cycles(), description });
    }

    /// Start and automatically end a named interval for the lifetime of
    /// the returned guard.
    pub fn interval(&self, description: &'static str) -> IntervalGuard<'_> {
        let interval_id = self.interval_start(description);
        IntervalGuard { telemetry: self, interval_id, description }
    }

    /// Attach a static annotation to the in-flight interval `interval_id`.
    pub fn interval_annotate(&self, interval_id: u64, description: &'static str) {
        self.push(Kind::IntervalAnnotation { interval_id, description });
    }

    /// Attach a runtime-built annotation to the in-flight interval
    /// `interval_id`, for call sites that need to include dynamic data in
    /// the trace.
    pub fn interval_annotate_dynamic(&self, interval_id: u64, description: String) {
        self.push(Kind::DynamicString { interval_id, description });
    }

    fn push(&self, kind: Kind) {
        self.ring.push(Entry { tid: thread_id(), kind });
    }

    /// Shut down the drain thread, flushing everything left in the ring.
    ///
    /// Equivalent to dropping the handle; exists so callers can make the
    /// wait for the final flush explicit.
    pub fn finish(mut self) {
        if let Some(drain) = self.drain.take() {
            drain.shutdown();
        }
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if let Some(drain) = self.drain.take() {
            drain.shutdown();
        }
    }
}

/// An RAII guard recording an interval's end when dropped.
///
/// Returned by [`Telemetry::interval`].
pub struct IntervalGuard<'t> {
    telemetry: &'t Telemetry,
    interval_id: u64,
    description: &'static str,
}

impl IntervalGuard<'_> {
    /// The id allocated for this interval, shared by its start/end records.
    pub fn interval_id(&self) -> u64 {
        self.interval_id
    }
}

impl Drop for IntervalGuard<'_> {
    fn drop(&mut self) {
        self.telemetry.interval_end(self.interval_id, self.description);
    }
}
