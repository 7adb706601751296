use spate_core::ConfigError;

/// Errors surfaced by a [`Backend`](crate::Backend).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend was shut down; the message was not accepted.
    #[error("backend is shut down")]
    Closed,

    /// The sink rejected a write and the failure policy halted the writer.
    #[error("sink write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The writer task panicked (usually inside a [`Sink`](crate::Sink)).
    #[error("writer task panicked")]
    WriterPanicked,
}
