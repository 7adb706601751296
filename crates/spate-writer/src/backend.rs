//! The backend facade, which is what producers actually call.
//!
//! [`Backend::log`] renders the record, optionally wraps it in the level's
//! colour, and enqueues it. It never throttles, never blocks and never reports
//! a sink failure: writing happens later, on the writer task spawned by
//! [`Backend::new`].

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spate_core::config::{Config, OutputConfig, QueueMode};
use spate_core::{ColorTable, ConfigError, Formatted, Level};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::BackendError;
use crate::policy::FailurePolicy;
use crate::queue::{self, Disconnected, Producer, QueuePolicy};
use crate::sink::{LineWriter, Sink};
use crate::stats::{Counters, Stats};
use crate::throttle::Writer;

/// Anything that accepts leveled records.
pub trait LogBackend: Send + Sync {
    /// Submit a record. Returns as soon as the record is queued.
    fn log(&self, level: Level, call_depth: usize, record: &dyn Formatted)
        -> Result<(), BackendError>;
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Writer tuning. [`Options::default`] matches the built-in config defaults.
#[derive(Debug, Clone)]
pub struct Options {
    /// Quiet period that closes a coalescing batch.
    pub gap: Duration,
    /// Number of recent writes (N) that must fall within `gap` to turn hot.
    pub history_len: usize,
    pub queue: QueuePolicy,
    pub failure: FailurePolicy,
    /// `Some` enables colour wrapping.
    pub colors: Option<ColorTable>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gap: Duration::from_millis(10),
            history_len: 4,
            queue: QueuePolicy::Unbounded,
            failure: FailurePolicy::Halt,
            colors: None,
        }
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gap: config.throttle.gap(),
            history_len: config.throttle.history_len,
            queue: match config.queue.policy {
                QueueMode::Unbounded => QueuePolicy::Unbounded,
                QueueMode::DropOldest => QueuePolicy::DropOldest {
                    capacity: config.queue.capacity,
                },
            },
            failure: config.failure.policy.into(),
            colors: config.color.table()?,
        })
    }

    pub fn gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    pub fn history_len(mut self, n: usize) -> Self {
        self.history_len = n;
        self
    }

    pub fn queue(mut self, policy: QueuePolicy) -> Self {
        self.queue = policy;
        self
    }

    pub fn failure(mut self, policy: FailurePolicy) -> Self {
        self.failure = policy;
        self
    }

    pub fn colors(mut self, table: ColorTable) -> Self {
        self.colors = Some(table);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gap.is_zero() {
            return Err(ConfigError::Invalid {
                key: "gap",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.history_len == 0 {
            return Err(ConfigError::Invalid {
                key: "history_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.queue == (QueuePolicy::DropOldest { capacity: 0 }) {
            return Err(ConfigError::Invalid {
                key: "queue.capacity",
                reason: "drop_oldest needs a capacity of at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

struct Inner {
    producer: Producer,
    colors: Option<ColorTable>,
    counters: Arc<Counters>,
    cancel: CancellationToken,
    writer: Mutex<Option<JoinHandle<Result<(), BackendError>>>>,
}

/// Rate-adaptive log backend. Cheap to clone; clones share one queue and one
/// writer task.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("color", &self.inner.colors.is_some())
            .field("stats", &self.inner.counters.snapshot())
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Spawn the writer task over `sink`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(sink: impl Sink, options: Options) -> Result<Self, BackendError> {
        options.validate()?;
        let counters = Arc::new(Counters::default());
        let cancel = CancellationToken::new();
        let (producer, consumer) = queue::channel(options.queue, counters.clone());
        let writer = Writer::new(
            consumer,
            Box::new(sink),
            options.history_len,
            options.gap,
            options.failure,
            counters.clone(),
            cancel.clone(),
        );
        let handle = tokio::spawn(writer.run());
        tracing::debug!(
            gap_ms = options.gap.as_millis() as u64,
            history_len = options.history_len,
            queue = ?options.queue,
            color = options.colors.is_some(),
            "backend started"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                producer,
                colors: options.colors,
                counters,
                cancel,
                writer: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Backend over a [`LineWriter`] that decorates each write with `prefix`
    /// and the header flags in `decoration`.
    pub fn with_writer<W>(
        out: W,
        prefix: impl Into<String>,
        decoration: OutputConfig,
        options: Options,
    ) -> Result<Self, BackendError>
    where
        W: io::Write + Send + 'static,
    {
        let decoration = OutputConfig {
            prefix: prefix.into(),
            ..decoration
        };
        Self::new(LineWriter::new(out, decoration), options)
    }

    /// Backend fully described by `config`, writing to `out`.
    pub fn from_config<W>(out: W, config: &Config) -> Result<Self, BackendError>
    where
        W: io::Write + Send + 'static,
    {
        let options = Options::from_config(config)?;
        Self::new(LineWriter::new(out, config.output.clone()), options)
    }

    /// Render, colour and enqueue `record`. Never blocks.
    ///
    /// `Ok` only means the line was queued. After [`shutdown`](Self::shutdown)
    /// this returns [`BackendError::Closed`].
    pub fn log<R>(&self, level: Level, call_depth: usize, record: &R) -> Result<(), BackendError>
    where
        R: Formatted + ?Sized,
    {
        if self.inner.cancel.is_cancelled() {
            return Err(BackendError::Closed);
        }
        let text = record.formatted(call_depth + 1);
        let line = match &self.inner.colors {
            Some(table) => table.wrap(level, &text),
            None => text,
        };
        self.enqueue(line)
    }

    /// Hand a rendered line to the queue. Only accepted lines count as
    /// submitted.
    fn enqueue(&self, line: String) -> Result<(), BackendError> {
        match self.inner.producer.enqueue(line) {
            Ok(()) => {
                Counters::bump(&self.inner.counters.submitted, 1);
                Ok(())
            }
            Err(Disconnected(_)) if self.inner.cancel.is_cancelled() => {
                Err(BackendError::Closed)
            }
            Err(Disconnected(_)) => {
                // The writer halted on a sink failure; producers are not told.
                Counters::bump(&self.inner.counters.submitted, 1);
                Counters::bump(&self.inner.counters.lost, 1);
                Ok(())
            }
        }
    }

    pub fn stats(&self) -> Stats {
        self.inner.counters.snapshot()
    }

    /// `true` once a write failure has stopped the writer task.
    pub fn is_halted(&self) -> bool {
        self.inner.counters.is_halted()
    }

    /// Stop accepting messages, write everything still queued and wait for
    /// the writer to exit.
    ///
    /// Returns the final counters, or the write error that halted the writer.
    /// Other clones observe [`BackendError::Closed`] from then on; calling
    /// `shutdown` on a second clone just returns the counters.
    pub async fn shutdown(self) -> Result<Stats, BackendError> {
        self.inner.cancel.cancel();
        let handle = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            match handle.await {
                Ok(result) => result?,
                Err(join) if join.is_panic() => return Err(BackendError::WriterPanicked),
                Err(_) => return Err(BackendError::Closed),
            }
        }
        let stats = self.stats();
        tracing::debug!(?stats, "backend shut down");
        Ok(stats)
    }
}

impl LogBackend for Backend {
    fn log(
        &self,
        level: Level,
        call_depth: usize,
        record: &dyn Formatted,
    ) -> Result<(), BackendError> {
        Backend::log(self, level, call_depth, record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
