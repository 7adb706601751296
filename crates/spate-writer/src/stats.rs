//! Backend counters.
//!
//! Producers and the writer task bump these with relaxed atomics; callers read
//! a consistent-enough [`Stats`] snapshot via `Backend::stats`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Point-in-time copy of the backend counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Messages accepted by `log`.
    pub submitted: u64,
    /// Messages that reached a successful sink write.
    pub written: u64,
    /// Single-message writes on the cool path.
    pub immediate_writes: u64,
    /// Batched writes on the hot path.
    pub coalesced_writes: u64,
    /// Messages discarded by the drop-oldest queue policy.
    pub dropped: u64,
    /// Sink writes that returned an error.
    pub failed_writes: u64,
    /// Messages accepted after the writer halted; never written.
    pub lost: u64,
}

impl Stats {
    /// Total write operations issued to the sink, failed or not.
    pub fn writes(&self) -> u64 {
        self.immediate_writes + self.coalesced_writes
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub submitted: AtomicU64,
    pub written: AtomicU64,
    pub immediate_writes: AtomicU64,
    pub coalesced_writes: AtomicU64,
    pub dropped: AtomicU64,
    pub failed_writes: AtomicU64,
    pub lost: AtomicU64,
    pub halted: AtomicBool,
}

impl Counters {
    pub fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Stats {
        Stats {
            submitted: self.submitted.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            immediate_writes: self.immediate_writes.load(Ordering::Relaxed),
            coalesced_writes: self.coalesced_writes.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed_writes: self.failed_writes.load(Ordering::Relaxed),
            lost: self.lost.load(Ordering::Relaxed),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub fn mark_halted(&self) {
        self.halted.store(true, Ordering::Release);
    }
}
