//! spate-core: shared types for the spate log sink.
//!
//! This crate holds everything the writer and the CLI agree on: severity
//! [`Level`]s, the [`Record`] type and its [`Formatted`] capability, the
//! terminal [`ColorTable`], configuration and error types.
//!
//! # Architecture
//!
//! ```text
//! producers ──► Backend::log ──► queue ──► writer loop ──► Sink
//!                   │                          │
//!                   └── ColorTable             └── WriteHistory (hot/cool)
//! ```
//!
//! The queue, writer loop and sinks live in `spate-writer`.

pub mod color;
pub mod config;
pub mod error;
pub mod types;

pub use color::ColorTable;
pub use error::{ConfigError, ParseLevelError};
pub use types::{Formatted, Level, Record};
