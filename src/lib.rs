//! spate: a rate-adaptive log sink.
//!
//! Many producers submit formatted lines; one writer task decides per line
//! whether to write it through or coalesce it with the rest of a burst. This
//! crate re-exports the two layers so integration tests and embedders can
//! depend on a single name.
//!
//! # Architecture
//!
//! ```text
//! spate-core  ── Level, Record, ColorTable, Config
//!     │
//! spate-writer ── queue ──► throttling writer ──► Sink
//! ```
//!
//! # Example
//!
//! ```no_run
//! use spate::{Backend, Level, LineWriter, Options};
//!
//! # async fn demo() -> Result<(), spate::BackendError> {
//! let backend = Backend::new(LineWriter::plain(std::io::stdout()), Options::default())?;
//! backend.log(Level::Info, 0, "service started")?;
//! let stats = backend.shutdown().await?;
//! assert_eq!(stats.written, 1);
//! # Ok(())
//! # }
//! ```

pub use spate_core::{color, config, types, ColorTable, ConfigError, Formatted, Level, Record};
pub use spate_writer::{
    Backend, BackendError, FailureAction, FailurePolicy, LineWriter, LogBackend, Options,
    QueuePolicy, Sink, Stats, WriteHistory,
};
