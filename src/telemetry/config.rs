//! Tunables for a [`crate::telemetry::Telemetry`] handle.

use std::time::Duration;

use crate::consts::{CALIBRATION_SLEEP_SECS, DEFAULT_DRAIN_INTERVAL_SECS, DEFAULT_RING_SIZE};

/// Configuration consumed by [`crate::telemetry::Telemetry::new`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Number of entries the ring buffer holds before it starts
    /// overwriting the oldest unsent records.
    pub ring_capacity: usize,
    /// How often the background thread drains the ring to its sink.
    pub drain_interval: Duration,
    /// Whether to run TSC calibration at startup and emit a `Calibration`
    /// record. Disable in tests that don't want to block on the
    /// calibration sleep.
    pub calibrate_on_init: bool,
    /// How long calibration samples the wall clock against the cycle
    /// counter for, when `calibrate_on_init` is set.
    pub calibration_sleep: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            ring_capacity: DEFAULT_RING_SIZE,
            drain_interval: Duration::from_secs(DEFAULT_DRAIN_INTERVAL_SECS),
            calibrate_on_init: true,
            calibration_sleep: Duration::from_secs(CALIBRATION_SLEEP_SECS),
        }
    }
}
