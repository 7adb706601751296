//! Sinks: where the writer task puts its bytes.
//!
//! A [`Sink`] receives one call per write operation. On the cool path that is
//! a single message; on the hot path it is a whole coalesced batch with `\n`
//! between messages. The writer never calls a sink from more than one task.
//!
//! [`LineWriter`] is the standard sink: it decorates each write with an
//! optional prefix and a date/time header (see [`OutputConfig`]) and hands the
//! result to any [`std::io::Write`].

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use spate_core::config::OutputConfig;

/// Destination for throttled writes.
pub trait Sink: Send + 'static {
    /// Perform one write operation. `batch` carries no trailing newline.
    fn write(&mut self, batch: &str) -> io::Result<()>;
}

impl<F> Sink for F
where
    F: FnMut(&str) -> io::Result<()> + Send + 'static,
{
    fn write(&mut self, batch: &str) -> io::Result<()> {
        self(batch)
    }
}

// ---------------------------------------------------------------------------
// LineWriter
// ---------------------------------------------------------------------------

/// Prefix/header decorating sink over an [`io::Write`].
///
/// Each write becomes exactly one `write_all` followed by `flush`:
///
/// ```text
/// [prefix][YYYY/MM/DD ][HH:MM:SS[.ffffff] ][prefix if msg_prefix]text\n
/// ```
#[derive(Debug)]
pub struct LineWriter<W> {
    out: W,
    decoration: OutputConfig,
    buf: String,
}

impl<W: Write + Send + 'static> LineWriter<W> {
    pub fn new(out: W, decoration: OutputConfig) -> Self {
        Self {
            out,
            decoration,
            buf: String::new(),
        }
    }

    /// Undecorated writer: text plus newline.
    pub fn plain(out: W) -> Self {
        Self::new(out, OutputConfig::default())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, text: &str) {
        self.buf.clear();
        let d = &self.decoration;
        if !d.msg_prefix {
            self.buf.push_str(&d.prefix);
        }
        if d.date || d.time || d.microseconds {
            if d.utc {
                push_header(&mut self.buf, d, Utc::now());
            } else {
                push_header(&mut self.buf, d, Local::now());
            }
        }
        if d.msg_prefix {
            self.buf.push_str(&d.prefix);
        }
        self.buf.push_str(text);
        if !text.ends_with('\n') {
            self.buf.push('\n');
        }
    }
}

impl LineWriter<io::Stdout> {
    pub fn stdout(decoration: OutputConfig) -> Self {
        Self::new(io::stdout(), decoration)
    }
}

impl<W: Write + Send + 'static> Sink for LineWriter<W> {
    fn write(&mut self, batch: &str) -> io::Result<()> {
        self.render(batch);
        self.out.write_all(self.buf.as_bytes())?;
        self.out.flush()
    }
}

fn push_header<Tz>(buf: &mut String, d: &OutputConfig, now: DateTime<Tz>)
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    use std::fmt::Write as _;
    if d.date {
        let _ = write!(buf, "{} ", now.format("%Y/%m/%d"));
    }
    if d.time || d.microseconds {
        let _ = write!(buf, "{}", now.format("%H:%M:%S"));
        if d.microseconds {
            let _ = write!(buf, "{}", now.format("%.6f"));
        }
        buf.push(' ');
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
