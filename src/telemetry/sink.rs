//! The output abstraction the background drain thread writes through.
//!
//! Kept as a trait (rather than hardcoding `std::io::Write`) so embedders
//! can redirect trace output to, say, a rotating file or an in-memory
//! buffer for tests, the same role the teacher's `ProfileReceiver` trait
//! plays for gas-profiling callbacks.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::telemetry::format::format_entry;
use crate::telemetry::record::Entry;

/// Consumes formatted telemetry lines.
pub trait Sink: Send + Sync {
    /// Write one already-formatted line (no trailing newline).
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Format and write `entry`, whose cycle counts (if any) are rendered
    /// relative to `epoch_cycles` — the baseline sampled by the session's
    /// `Epoch` record, threaded in by the drain loop that observed it. The
    /// default implementation delegates to [`write_line`](Sink::write_line);
    /// override only if a sink wants the structured [`Entry`] instead of
    /// text.
    fn write_entry(&self, entry: &Entry, epoch_cycles: u64) -> io::Result<()> {
        self.write_line(&format_entry(entry, epoch_cycles))
    }
}

/// A [`Sink`] that writes newline-terminated lines to any `io::Write`.
pub struct TextSink<W: Write + Send> {
    inner: Mutex<W>,
}

impl<W: Write + Send> TextSink<W> {
    /// Wrap `writer` as a telemetry sink.
    pub fn new(writer: W) -> Self {
        TextSink { inner: Mutex::new(writer) }
    }
}

impl<W: Write + Send> Sink for TextSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        writeln!(guard, "{line}")?;
        guard.flush()
    }
}
