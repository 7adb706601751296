//! The throttling writer loop.
//!
//! A single task owns the [`Sink`], the [`WriteHistory`] and the coalescing
//! buffer. For each dequeued message it asks the history whether the last N
//! writes all happened within `gap`:
//!
//! - **cool**: write the message on its own, right away;
//! - **hot**: start a batch with it and keep appending whatever arrives until
//!   `gap` passes with nothing new, then write the batch once.
//!
//! Either way the time the *first* message was dequeued goes into the history,
//! so a long coalescing wait still counts as a prompt write and buys N more
//! immediate writes before the next batch.
//!
//! # Shutdown
//!
//! When the cancellation token fires the writer closes the queue, appends
//! everything still queued to the current batch (or starts one), writes it
//! and returns. When every producer is dropped it flushes what it holds and
//! returns the same way.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::BackendError;
use crate::history::WriteHistory;
use crate::policy::{FailureAction, FailurePolicy};
use crate::queue::{Consumer, Message};
use crate::sink::Sink;
use crate::stats::Counters;

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchEnd {
    /// `gap` elapsed with no new message.
    Quiet,
    /// The queue is closed or shutdown was requested; nothing more will come.
    Closed,
}

pub(crate) struct Writer {
    inbox: Consumer,
    sink: Box<dyn Sink>,
    history: WriteHistory,
    gap: Duration,
    policy: FailurePolicy,
    counters: Arc<Counters>,
    cancel: CancellationToken,
    hot: bool,
}

impl Writer {
    pub(crate) fn new(
        inbox: Consumer,
        sink: Box<dyn Sink>,
        history_len: usize,
        gap: Duration,
        policy: FailurePolicy,
        counters: Arc<Counters>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inbox,
            sink,
            history: WriteHistory::new(history_len),
            gap,
            policy,
            counters,
            cancel,
            hot: false,
        }
    }

    /// Run until shutdown, queue closure, or a halting write failure.
    pub(crate) async fn run(mut self) -> Result<(), BackendError> {
        let result = self.run_inner().await;
        if result.is_err() {
            self.counters.mark_halted();
        }
        tracing::debug!(stats = ?self.counters.snapshot(), "writer stopped");
        result
    }

    async fn run_inner(&mut self) -> Result<(), BackendError> {
        loop {
            let first = tokio::select! {
                biased;
                next = self.inbox.recv() => match next {
                    Some(message) => message,
                    None => return Ok(()),
                },
                _ = self.cancel.cancelled() => {
                    let rest = self.inbox.drain();
                    if rest.is_empty() {
                        return Ok(());
                    }
                    let now = Instant::now();
                    let count = rest.len() as u64;
                    self.flush(&rest.join("\n"), count, now, true)?;
                    return Ok(());
                }
            };
            let now = Instant::now();

            if !self.history.is_hot(now, self.gap) {
                if self.hot {
                    tracing::debug!("write rate cooled; writing through");
                    self.hot = false;
                }
                tracing::trace!(bytes = first.len(), "immediate write");
                self.flush(&first, 1, now, false)?;
                continue;
            }

            if !self.hot {
                tracing::debug!(
                    gap_ms = self.gap.as_millis() as u64,
                    writes = self.history.len(),
                    "write rate hot; coalescing"
                );
                self.hot = true;
            }
            let (batch, count, end) = self.coalesce(first).await;
            tracing::debug!(messages = count, bytes = batch.len(), "coalesced write");
            self.flush(&batch, count, now, true)?;
            if end == BatchEnd::Closed {
                return Ok(());
            }
        }
    }

    /// Accumulate messages after `first` until a quiet `gap` is observed.
    async fn coalesce(&mut self, first: Message) -> (String, u64, BatchEnd) {
        let mut batch = first;
        let mut count = 1u64;
        loop {
            tokio::select! {
                biased;
                next = self.inbox.recv() => match next {
                    Some(message) => {
                        batch.push('\n');
                        batch.push_str(&message);
                        count += 1;
                    }
                    None => return (batch, count, BatchEnd::Closed),
                },
                _ = self.cancel.cancelled() => {
                    for message in self.inbox.drain() {
                        batch.push('\n');
                        batch.push_str(&message);
                        count += 1;
                    }
                    return (batch, count, BatchEnd::Closed);
                }
                _ = sleep(self.gap) => return (batch, count, BatchEnd::Quiet),
            }
        }
    }

    /// Issue one sink write for `count` messages and record `started` in the
    /// history.
    fn flush(
        &mut self,
        batch: &str,
        count: u64,
        started: Instant,
        coalesced: bool,
    ) -> Result<(), BackendError> {
        let kind = if coalesced {
            &self.counters.coalesced_writes
        } else {
            &self.counters.immediate_writes
        };
        Counters::bump(kind, 1);

        match self.sink.write(batch) {
            Ok(()) => Counters::bump(&self.counters.written, count),
            Err(err) => {
                Counters::bump(&self.counters.failed_writes, 1);
                match self.policy.decide(&err) {
                    FailureAction::Continue => {
                        tracing::error!(error = %err, messages = count, "sink write failed; continuing");
                    }
                    FailureAction::Halt => {
                        tracing::error!(error = %err, messages = count, "sink write failed; writer halted");
                        return Err(BackendError::Write(err));
                    }
                }
            }
        }
        self.history.record(started);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
