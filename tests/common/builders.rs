//! Test builders: ergonomic constructors for backends and message runs.
//!
//! These panic on invalid input rather than returning `Result`.

use std::time::Duration;

use spate::{Backend, Level, Options};
use tokio::time::sleep;

use super::Recorder;

/// Options with the built-in defaults: 10ms gap, 4-write history.
pub fn default_options() -> Options {
    Options::default()
}

/// Options with a custom gap and history length.
pub fn options(gap_ms: u64, history_len: usize) -> Options {
    Options::default()
        .gap(Duration::from_millis(gap_ms))
        .history_len(history_len)
}

/// A backend writing into a fresh recorder.
pub fn recorded(options: Options) -> (Backend, Recorder) {
    let rec = Recorder::new();
    let backend = Backend::new(rec.sink(), options).expect("valid options");
    (backend, rec)
}

/// `count` messages named `{tag}-0`, `{tag}-1`, ...
pub fn numbered(tag: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{tag}-{i}")).collect()
}

/// Submit `messages` at Info, sleeping `spacing` between consecutive ones.
pub async fn send_spaced(backend: &Backend, messages: &[String], spacing: Duration) {
    for (i, message) in messages.iter().enumerate() {
        if i > 0 && !spacing.is_zero() {
            sleep(spacing).await;
        }
        backend.log(Level::Info, 0, message.as_str()).expect("backend open");
    }
}

/// Let the writer run to a quiescent state on the paused clock.
pub async fn settle(by: Duration) {
    sleep(by).await;
}
