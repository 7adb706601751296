//! Message queue between producers and the writer task.
//!
//! Many [`Producer`]s, exactly one [`Consumer`]. Enqueue never blocks. The
//! default [`QueuePolicy::Unbounded`] never drops either: it grows to absorb
//! whatever burst arrives. [`QueuePolicy::DropOldest`] caps memory by
//! discarding the oldest undelivered messages instead.
//!
//! Both policies preserve FIFO order for every message that is delivered.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::stats::Counters;

/// A formatted, ready-to-write log line.
pub type Message = String;

/// Admission policy for the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// No capacity bound, no drops.
    #[default]
    Unbounded,
    /// Hold at most `capacity` undelivered messages (rounded up to a power of
    /// two); on overflow the oldest ones are discarded.
    ///
    /// Every delivered message is cloned out of the ring, and the ring keeps
    /// up to `capacity` already-delivered messages alive until they are
    /// overwritten.
    DropOldest { capacity: usize },
}

/// The single consumer went away; the message was not enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected(pub Message);

/// Create a linked producer/consumer pair.
///
/// # Panics
///
/// Panics if the policy is `DropOldest { capacity: 0 }`.
pub(crate) fn channel(policy: QueuePolicy, counters: Arc<Counters>) -> (Producer, Consumer) {
    match policy {
        QueuePolicy::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Producer { tx: Tx::Unbounded(tx) },
                Consumer {
                    rx: Rx::Unbounded(rx),
                    counters,
                },
            )
        }
        QueuePolicy::DropOldest { capacity } => {
            let (tx, rx) = broadcast::channel(capacity);
            (
                Producer { tx: Tx::DropOldest(tx) },
                Consumer {
                    rx: Rx::DropOldest(rx),
                    counters,
                },
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Tx {
    Unbounded(mpsc::UnboundedSender<Message>),
    DropOldest(broadcast::Sender<Message>),
}

/// Cloneable enqueue handle.
#[derive(Debug, Clone)]
pub struct Producer {
    tx: Tx,
}

impl Producer {
    /// Append `message` to the tail. Never blocks.
    pub fn enqueue(&self, message: Message) -> Result<(), Disconnected> {
        match &self.tx {
            Tx::Unbounded(tx) => tx.send(message).map_err(|e| Disconnected(e.0)),
            Tx::DropOldest(tx) => tx.send(message).map(drop).map_err(|e| Disconnected(e.0)),
        }
    }
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Rx {
    Unbounded(mpsc::UnboundedReceiver<Message>),
    DropOldest(broadcast::Receiver<Message>),
}

/// The writer task's end of the queue.
#[derive(Debug)]
pub struct Consumer {
    rx: Rx,
    counters: Arc<Counters>,
}

impl Consumer {
    /// Wait for the head message. Returns `None` once every producer is gone
    /// and the queue is empty.
    pub async fn recv(&mut self) -> Option<Message> {
        match &mut self.rx {
            Rx::Unbounded(rx) => rx.recv().await,
            Rx::DropOldest(rx) => loop {
                match rx.recv().await {
                    Ok(message) => return Some(message),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        note_dropped(&self.counters, n)
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            },
        }
    }

    /// Take the head message if one is ready.
    pub fn try_recv(&mut self) -> Option<Message> {
        match &mut self.rx {
            Rx::Unbounded(rx) => rx.try_recv().ok(),
            Rx::DropOldest(rx) => loop {
                match rx.try_recv() {
                    Ok(message) => return Some(message),
                    Err(broadcast::error::TryRecvError::Lagged(n)) => {
                        note_dropped(&self.counters, n)
                    }
                    Err(_) => return None,
                }
            },
        }
    }

    /// Stop admitting new messages and return everything still queued, in
    /// order.
    pub fn drain(&mut self) -> Vec<Message> {
        if let Rx::Unbounded(rx) = &mut self.rx {
            rx.close();
        }
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

fn note_dropped(counters: &Counters, n: u64) {
    Counters::bump(&counters.dropped, n);
    tracing::warn!(dropped = n, "queue full: discarded oldest messages");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
