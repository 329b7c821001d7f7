//! A fixed-capacity circular buffer of telemetry entries.
//!
//! Mirrors the original profiler's `telemetry_buffer`: producers claim a
//! slot via a single atomic cursor (`fetch_add`, wrapping modulo capacity)
//! so concurrent writers never contend on the same index, then write
//! directly into that slot. The original C implementation writes the raw
//! struct in place with no further synchronization, accepting that a slow
//! producer can be overwritten mid-write once the cursor has wrapped
//! capacity times; this is a deliberate trade of correctness-under-overflow
//! for zero blocking on the hot path. This port keeps that trade but
//! replaces the unsynchronized struct write with a per-slot
//! [`std::sync::Mutex`], which is safe Rust and uncontended in the common
//! case (each producer all but always lands on a distinct slot).
//!
//! The consumer — the background drain thread — never races the index
//! assignment itself; it replays everything pushed since its last visit in
//! producer order, wrapping through the slot array exactly once if the
//! ring overflowed in between, the same "serialize what's there, in order"
//! semantics the original drain pass has.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::telemetry::record::Entry;

/// A lock-striped, fixed-size MPSC ring buffer of [`Entry`] records.
pub struct Ring {
    capacity: usize,
    slots: Vec<Mutex<Option<Entry>>>,
    cursor: AtomicUsize,
    last_drained: AtomicUsize,
}

impl Ring {
    /// Allocate a ring with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity.max(1)).map(|_| Mutex::new(None)).collect();
        Ring {
            capacity: capacity.max(1),
            slots,
            cursor: AtomicUsize::new(0),
            last_drained: AtomicUsize::new(0),
        }
    }

    /// Number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claim the next slot and write `entry` into it, overwriting whatever
    /// was there.
    pub fn push(&self, entry: Entry) {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.capacity;
        let mut guard = self.slots[slot].lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(entry);
    }

    /// Take every slot written since the previous call to `drain`, leaving
    /// those slots empty, and return them in producer (chronological)
    /// order.
    ///
    /// The producer cursor only ever advances, so the unwrapped distance
    /// between the last-drained cursor and the current one tells us how
    /// many pushes happened since the last drain. When that distance is at
    /// most `capacity`, every slot in between still holds what its
    /// producer wrote and we emit it in that order. When the producer has
    /// wrapped past the consumer (distance exceeds `capacity`), the oldest
    /// pushes were already overwritten; we emit from the current cursor's
    /// slot (the oldest surviving entry) forward, wrapping once, matching
    /// the drop-oldest semantics `push` already implies.
    pub fn drain(&self) -> Vec<Entry> {
        let current = self.cursor.load(Ordering::Relaxed);
        let last = self.last_drained.swap(current, Ordering::Relaxed);

        let unwrapped_len = current.saturating_sub(last);
        let start = if unwrapped_len > self.capacity { current - self.capacity } else { last };

        (start..current)
            .filter_map(|i| {
                let slot = i % self.capacity;
                self.slots[slot].lock().unwrap_or_else(|p| p.into_inner()).take()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::record::Kind;

    fn entry(tid: u64) -> Entry {
        Entry { tid, kind: Kind::Epoch { cycles: 0 } }
    }

    #[test]
    fn drain_returns_every_pushed_entry_within_capacity() {
        let ring = Ring::new(4);
        for tid in 0..4 {
            ring.push(entry(tid));
        }
        let mut drained: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![0, 1, 2, 3]);
    }

    #[test]
    fn wrapping_overwrites_the_oldest_slot() {
        let ring = Ring::new(2);
        ring.push(entry(0));
        ring.push(entry(1));
        ring.push(entry(2));
        let drained: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        assert_eq!(drained.len(), 2);
        assert!(drained.contains(&2));
    }

    #[test]
    fn drain_emits_in_producer_order_even_when_slot_index_runs_backwards() {
        // Slot index is `cursor % capacity`, so pushing into a 4-slot ring
        // starting from a cursor of 2 lands on slots 2, 3, 0, 1 in that
        // order: ascending slot order would scramble this back to
        // 0, 1, 2, 3. `drain` must preserve push order regardless.
        let ring = Ring::new(4);
        ring.push(entry(100));
        ring.push(entry(101));
        assert_eq!(ring.drain().len(), 2); // advances last_drained to cursor 2

        ring.push(entry(0));
        ring.push(entry(1));
        ring.push(entry(2));
        ring.push(entry(3));
        let drained: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
    }

    #[test]
    fn a_wrapped_ring_drains_the_surviving_entries_in_chronological_order() {
        // Reproduces the review scenario: capacity 4, cursor resumes at
        // slot 2 after a prior drain, then five pushes land on slots
        // 2, 3, 0, 1, 2. The first of those five (tid 10) is overwritten
        // by the fifth before the drain runs, so only the last four
        // survive, and they must come out in push order (11, 12, 13, 14),
        // not ascending slot order (which would read 12, 13, 14, 11).
        let ring = Ring::new(4);
        ring.push(entry(900));
        ring.push(entry(901));
        assert_eq!(ring.drain().len(), 2);

        ring.push(entry(10));
        ring.push(entry(11));
        ring.push(entry(12));
        ring.push(entry(13));
        ring.push(entry(14));
        let drained: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        assert_eq!(drained, vec![11, 12, 13, 14]);
    }

    #[test]
    fn two_drains_back_to_back_only_emit_what_was_pushed_in_between() {
        let ring = Ring::new(4);
        ring.push(entry(0));
        ring.push(entry(1));
        let first: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        assert_eq!(first, vec![0, 1]);

        ring.push(entry(2));
        let second: Vec<u64> = ring.drain().iter().map(|e| e.tid).collect();
        assert_eq!(second, vec![2]);

        assert_eq!(ring.drain().len(), 0);
    }

    #[test]
    fn drain_empties_the_ring() {
        let ring = Ring::new(4);
        ring.push(entry(0));
        assert_eq!(ring.drain().len(), 1);
        assert_eq!(ring.drain().len(), 0);
    }
}
