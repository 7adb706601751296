//! spate-writer: the throttling half of spate.
//!
//! Producers call [`Backend::log`]; the line lands in a non-blocking queue and
//! a single writer task decides, per message, whether to write it straight to
//! the [`Sink`] or to fold it into a batch that is written once the burst goes
//! quiet.
//!
//! ```text
//! Backend::log ──► queue (unbounded | drop-oldest) ──► Writer ──► Sink
//!                                                        │
//!                                                  WriteHistory
//! ```
//!
//! The writer runs on the tokio runtime that was current when the backend was
//! built. All timing goes through `tokio::time`, so tests can drive it with a
//! paused clock.

pub mod backend;
pub mod error;
pub mod history;
pub mod policy;
pub mod queue;
pub mod sink;
pub mod stats;
mod throttle;

pub use backend::{Backend, LogBackend, Options};
pub use error::BackendError;
pub use history::WriteHistory;
pub use policy::{FailureAction, FailurePolicy};
pub use queue::QueuePolicy;
pub use sink::{LineWriter, Sink};
pub use stats::Stats;
