//! Crate-wide sizing constants.

/// Default capacity of the telemetry ring buffer, in records.
///
/// Matches the original profiler's `RECORD_BUFFER_SIZE`.
pub const DEFAULT_RING_SIZE: usize = 10_000;

/// Default interval, in seconds, between background drain passes.
pub const DEFAULT_DRAIN_INTERVAL_SECS: u64 = 1;

/// Duration, in seconds, the one-shot TSC calibration sleeps for while
/// sampling the wall clock against the cycle counter.
pub const CALIBRATION_SLEEP_SECS: u64 = 1;

/// Upper bound on the number of words a single tree's arena may grow to
/// before construction is aborted with [`crate::error::IrError::ArenaCapacityExceeded`].
///
/// The original C implementation never bounded this explicitly (it grows
/// until the allocator fails); a closed-source arena backed by a `Vec` needs
/// an explicit ceiling so a pathological lowering can't exhaust memory
/// silently instead of failing the compilation attempt.
pub const MAX_ARENA_WORDS: usize = 16 * 1024 * 1024;
