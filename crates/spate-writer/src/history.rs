//! Write history: the last N flush timestamps, newest first.
//!
//! Owned exclusively by the writer task. The slot buffer is allocated once;
//! recording a flush shifts every entry back by one and discards the oldest.

use std::time::Duration;

use tokio::time::Instant;

/// Fixed-size ring of recent write timestamps used for hot/cool
/// classification.
///
/// Slots start out empty ("never written"), which classifies as cool, so the
/// first `len` writes always go straight through.
#[derive(Debug, Clone)]
pub struct WriteHistory {
    slots: Box<[Option<Instant>]>,
}

impl WriteHistory {
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "write history needs at least one slot");
        Self {
            slots: vec![None; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// The Nth most recent write, or `None` if fewer than N writes happened.
    pub fn oldest(&self) -> Option<Instant> {
        self.slots[self.slots.len() - 1]
    }

    /// `true` when N writes have been recorded within `gap` of `now`.
    pub fn is_hot(&self, now: Instant, gap: Duration) -> bool {
        match self.oldest() {
            Some(oldest) => now.saturating_duration_since(oldest) < gap,
            None => false,
        }
    }

    /// Push `at` onto the front, shifting older entries back.
    pub fn record(&mut self, at: Instant) {
        self.slots.rotate_right(1);
        self.slots[0] = Some(at);
    }

    /// Timestamps newest first; empty slots are skipped.
    pub fn iter(&self) -> impl Iterator<Item = Instant> + '_ {
        self.slots.iter().flatten().copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
