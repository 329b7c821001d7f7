//! The record kinds a [`crate::telemetry::Telemetry`] handle can emit.
//!
//! Mirrors the original profiler's `RecordType` tagged union: most records
//! carry the cycle count they were taken at (except `Calibration`, which
//! predates having one, and the annotation kinds, which attach to an
//! already-timestamped interval rather than marking a new point in time),
//! and most carry a description — either a `'static` string for hot-path
//! call sites, or an owned `String` for `DynamicString`, the one kind
//! allowed to describe itself at runtime at the cost of an allocation.

/// One telemetry event, tagged with the producing thread's id.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Id of the thread that recorded this entry, assigned by
    /// [`crate::telemetry::thread_id`].
    pub tid: u64,
    /// The event itself.
    pub kind: Kind,
}

/// The event payload, keyed by what originally recorded it.
#[derive(Debug, Clone)]
pub enum Kind {
    /// One-time record emitted after TSC calibration completes.
    Calibration {
        /// Estimated TSC ticks per wall-clock second.
        ticks_per_second: u64,
    },
    /// Marks the start of the telemetry session on this thread, carrying
    /// the baseline cycle count every later record on this thread is
    /// conceptually relative to.
    Epoch {
        /// TSC (or fallback) cycle count at session start.
        cycles: u64,
    },
    /// A single point-in-time marker.
    Timestamp {
        /// TSC (or fallback) cycle count.
        cycles: u64,
        /// Static description of what this timestamp marks.
        description: &'static str,
    },
    /// The start of a named interval.
    IntervalStart {
        /// Globally unique id identifying this interval, shared by its
        /// matching `IntervalEnd` (and any annotations attached to it).
        interval_id: u64,
        /// TSC (or fallback) cycle count.
        cycles: u64,
        /// Static description of the interval.
        description: &'static str,
    },
    /// The end of a named interval.
    IntervalEnd {
        /// Id allocated by the matching `IntervalStart`.
        interval_id: u64,
        /// TSC (or fallback) cycle count.
        cycles: u64,
        /// Static description of the interval.
        description: &'static str,
    },
    /// A static annotation attached to an in-flight interval.
    ///
    /// Carries no cycle count: an annotation marks a fact about an interval
    /// already bracketed by timestamped `IntervalStart`/`IntervalEnd`
    /// records, not a new point in time.
    IntervalAnnotation {
        /// Id of the interval this annotation is attached to.
        interval_id: u64,
        /// Static annotation text.
        description: &'static str,
    },
    /// Like `IntervalAnnotation`, but built at runtime and owned, for call
    /// sites that need to include dynamic data in the trace.
    DynamicString {
        /// Id of the interval this annotation is attached to.
        interval_id: u64,
        /// Runtime-built annotation text.
        description: String,
    },
}
