//! The background thread that periodically drains the ring buffer to its
//! [`Sink`], mirroring the original profiler's `backgroundSerialization`
//! pthread.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::telemetry::record::Kind;
use crate::telemetry::ring::Ring;
use crate::telemetry::sink::Sink;

/// A shutdown flag the drain thread can wait on without pinning its wake-up
/// latency to the drain interval: `Condvar::wait_timeout` returns the
/// instant `shutdown()` sets the flag, rather than only at the next
/// `interval` tick.
struct ShutdownSignal {
    requested: Mutex<bool>,
    changed: Condvar,
}

impl ShutdownSignal {
    fn new() -> Self {
        ShutdownSignal { requested: Mutex::new(false), changed: Condvar::new() }
    }

    /// Wait up to `timeout` for shutdown to be requested. Returns `true` if
    /// shutdown was requested, `false` if `timeout` elapsed first.
    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.requested.lock().unwrap_or_else(|p| p.into_inner());
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |requested| !*requested)
            .unwrap_or_else(|p| p.into_inner());
        *guard
    }

    fn request(&self) {
        *self.requested.lock().unwrap_or_else(|p| p.into_inner()) = true;
        self.changed.notify_all();
    }
}

/// Owns the background drain thread; dropping it signals shutdown and
/// blocks until the thread has flushed one last time and exited.
pub struct Drain {
    shutdown: Arc<ShutdownSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Drain {
    /// Spawn a thread that wakes every `interval` (or immediately on
    /// shutdown, whichever comes first) and writes every currently
    /// occupied slot of `ring` to `sink`.
    pub fn spawn(ring: Arc<Ring>, sink: Arc<dyn Sink>, interval: Duration) -> Self {
        let shutdown = Arc::new(ShutdownSignal::new());
        let shutdown_bg = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("telemetry-drain".to_string())
            .spawn(move || {
                // The epoch baseline observed so far this session: set the
                // first time an `Epoch` record is drained, and reused for
                // every record formatted after that (§6: all cycle counts
                // are rendered relative to it). Persists across loop
                // iterations rather than resetting on every flush.
                let mut epoch_cycles = 0u64;
                while !shutdown_bg.wait(interval) {
                    flush(&ring, sink.as_ref(), &mut epoch_cycles);
                }
                flush(&ring, sink.as_ref(), &mut epoch_cycles);
            })
            .expect("failed to spawn telemetry drain thread");

        Drain { shutdown, handle: Some(handle) }
    }

    /// Signal shutdown and block until the drain thread has exited. Plain
    /// `drop` does the same thing; this exists so callers can make the
    /// wait explicit.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Drain {
    fn drop(&mut self) {
        self.shutdown.request();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn flush(ring: &Ring, sink: &dyn Sink, epoch_cycles: &mut u64) {
    for entry in ring.drain() {
        if let Kind::Epoch { cycles } = entry.kind {
            *epoch_cycles = cycles;
        }
        if let Err(err) = sink.write_entry(&entry, *epoch_cycles) {
            tracing::warn!(error = %err, "telemetry sink write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::record::Entry;
    use std::sync::Mutex;

    #[test]
    fn shutdown_flushes_whatever_is_left_in_the_ring() {
        let ring = Arc::new(Ring::new(8));
        ring.push(Entry { tid: 1, kind: Kind::Epoch { cycles: 42 } });

        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        struct VecSink(Arc<Mutex<Vec<u8>>>);
        impl Sink for VecSink {
            fn write_line(&self, line: &str) -> std::io::Result<()> {
                let mut guard = self.0.lock().unwrap();
                guard.extend_from_slice(line.as_bytes());
                guard.push(b'\n');
                Ok(())
            }
        }
        let sink: Arc<dyn Sink> = Arc::new(VecSink(Arc::clone(&buf)));

        let drain = Drain::spawn(ring, sink, Duration::from_secs(3600));
        drain.shutdown();

        let contents = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(contents, "         1 Epoch counter: 42\n");
    }

    #[test]
    fn the_epoch_baseline_offsets_records_drained_after_it() {
        let ring = Arc::new(Ring::new(8));
        ring.push(Entry { tid: 1, kind: Kind::Epoch { cycles: 1_000 } });
        ring.push(Entry {
            tid: 1,
            kind: Kind::Timestamp { cycles: 1_100, description: "gc" },
        });

        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        struct VecSink(Arc<Mutex<Vec<u8>>>);
        impl Sink for VecSink {
            fn write_line(&self, line: &str) -> std::io::Result<()> {
                let mut guard = self.0.lock().unwrap();
                guard.extend_from_slice(line.as_bytes());
                guard.push(b'\n');
                Ok(())
            }
        }
        let sink: Arc<dyn Sink> = Arc::new(VecSink(Arc::clone(&buf)));

        let drain = Drain::spawn(ring, sink, Duration::from_secs(3600));
        drain.shutdown();

        let contents = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "         1 Epoch counter: 1000");
        assert_eq!(lines.next().unwrap(), "         1 100 -|- \"gc\"");
    }
}
