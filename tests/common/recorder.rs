//! In-memory sinks that remember what was written and when.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spate::Sink;
use tokio::time::Instant;

/// One call into the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    /// Offset from the recorder's creation.
    pub at: Duration,
    pub batch: String,
}

impl Write {
    /// The messages in this write, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.batch.split('\n').collect()
    }
}

/// Captures every write with a timestamp taken from the tokio clock.
///
/// ```rust
/// let rec = Recorder::new();
/// let backend = Backend::new(rec.sink(), Options::default())?;
/// ```
#[derive(Clone)]
pub struct Recorder {
    start: Instant,
    writes: Arc<Mutex<Vec<Write>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            writes: Arc::default(),
        }
    }

    /// A sink feeding this recorder.
    pub fn sink(&self) -> impl Sink {
        let rec = self.clone();
        move |batch: &str| -> io::Result<()> {
            rec.push(batch);
            Ok(())
        }
    }

    /// A sink that fails its `n`th write (1-based) and succeeds otherwise.
    pub fn sink_failing_on(&self, n: usize) -> impl Sink {
        let rec = self.clone();
        let mut calls = 0usize;
        move |batch: &str| -> io::Result<()> {
            calls += 1;
            if calls == n {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink gone"));
            }
            rec.push(batch);
            Ok(())
        }
    }

    fn push(&self, batch: &str) {
        let at = Instant::now().duration_since(self.start);
        self.writes.lock().unwrap().push(Write {
            at,
            batch: batch.to_string(),
        });
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<String> {
        self.writes().into_iter().map(|w| w.batch).collect()
    }

    /// Write offsets in whole milliseconds.
    pub fn times_ms(&self) -> Vec<u128> {
        self.writes().iter().map(|w| w.at.as_millis()).collect()
    }

    /// Every message ever written, flattened across batches.
    pub fn messages(&self) -> Vec<String> {
        self.writes()
            .iter()
            .flat_map(|w| w.messages().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// An `io::Write` that appends into shared memory, for [`spate::LineWriter`].
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
