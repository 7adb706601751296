//! What the writer does when the sink rejects a write.
//!
//! Writes are asynchronous, so there is no caller to hand the error back to.
//! The policy decides between stopping the writer, carrying on, or taking the
//! whole process down.

use std::fmt;
use std::io;
use std::sync::Arc;

use spate_core::config::FailureMode;

/// Outcome chosen by a [`FailurePolicy::Custom`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Halt,
    Continue,
}

type FailureHook = Arc<dyn Fn(&io::Error) -> FailureAction + Send + Sync>;

/// Reaction to a failed sink write.
#[derive(Clone, Default)]
pub enum FailurePolicy {
    /// End the writer task. Queued and later messages are never written; the
    /// error surfaces from `Backend::shutdown`.
    #[default]
    Halt,
    /// Count the failure and keep writing subsequent messages.
    Continue,
    /// `std::process::abort()`.
    Abort,
    /// Let the embedder decide per error.
    Custom(FailureHook),
}

impl FailurePolicy {
    pub fn custom<F>(hook: F) -> Self
    where
        F: Fn(&io::Error) -> FailureAction + Send + Sync + 'static,
    {
        FailurePolicy::Custom(Arc::new(hook))
    }

    pub(crate) fn decide(&self, err: &io::Error) -> FailureAction {
        match self {
            FailurePolicy::Halt => FailureAction::Halt,
            FailurePolicy::Continue => FailureAction::Continue,
            FailurePolicy::Abort => {
                tracing::error!(error = %err, "sink write failed; aborting process");
                std::process::abort()
            }
            FailurePolicy::Custom(hook) => hook(err),
        }
    }
}

impl From<FailureMode> for FailurePolicy {
    fn from(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Halt => FailurePolicy::Halt,
            FailureMode::Continue => FailurePolicy::Continue,
            FailureMode::Abort => FailurePolicy::Abort,
        }
    }
}

impl fmt::Debug for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Halt => write!(f, "Halt"),
            FailurePolicy::Continue => write!(f, "Continue"),
            FailurePolicy::Abort => write!(f, "Abort"),
            FailurePolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_pipe() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")
    }

    #[test]
    fn builtin_policies_decide_statically() {
        assert_eq!(FailurePolicy::Halt.decide(&broken_pipe()), FailureAction::Halt);
        assert_eq!(
            FailurePolicy::Continue.decide(&broken_pipe()),
            FailureAction::Continue
        );
    }

    #[test]
    fn custom_hook_sees_the_error() {
        let policy = FailurePolicy::custom(|e| {
            if e.kind() == io::ErrorKind::Interrupted {
                FailureAction::Continue
            } else {
                FailureAction::Halt
            }
        });
        assert_eq!(policy.decide(&broken_pipe()), FailureAction::Halt);
        let interrupted = io::Error::new(io::ErrorKind::Interrupted, "eintr");
        assert_eq!(policy.decide(&interrupted), FailureAction::Continue);
    }

    #[test]
    fn config_modes_map_to_policies() {
        assert!(matches!(FailurePolicy::from(FailureMode::Halt), FailurePolicy::Halt));
        assert!(matches!(
            FailurePolicy::from(FailureMode::Continue),
            FailurePolicy::Continue
        ));
        assert!(matches!(FailurePolicy::from(FailureMode::Abort), FailurePolicy::Abort));
        assert_eq!(format!("{:?}", FailurePolicy::custom(|_| FailureAction::Halt)), "Custom(..)");
    }
}
