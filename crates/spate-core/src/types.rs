//! Core types for spate-core.
//!
//! This module defines the severity [`Level`], the [`Formatted`] capability
//! every submitted record must expose, and the default [`Record`]
//! implementation.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};

use crate::error::ParseLevelError;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Log severity level, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Level {
    /// All levels in severity order, most severe first.
    pub const ALL: [Level; 6] = [
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Position of this level in [`Level::ALL`]; used to index colour tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower-case name, as used for configuration keys.
    pub fn as_key(self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Critical => write!(f, "CRITICAL"),
            Level::Error => write!(f, "ERROR"),
            Level::Warning => write!(f, "WARNING"),
            Level::Notice => write!(f, "NOTICE"),
            Level::Info => write!(f, "INFO"),
            Level::Debug => write!(f, "DEBUG"),
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" => Ok(Level::Critical),
            "error" => Ok(Level::Error),
            "warning" | "warn" => Ok(Level::Warning),
            "notice" => Ok(Level::Notice),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatted
// ---------------------------------------------------------------------------

/// Anything that can render itself into a single log line.
///
/// `call_depth` is a caller-location hint. Implementations that do not report
/// caller locations may ignore it.
pub trait Formatted {
    fn formatted(&self, call_depth: usize) -> String;
}

impl Formatted for str {
    fn formatted(&self, _call_depth: usize) -> String {
        self.to_string()
    }
}

impl Formatted for String {
    fn formatted(&self, _call_depth: usize) -> String {
        self.clone()
    }
}

impl<T: Formatted + ?Sized> Formatted for &T {
    fn formatted(&self, call_depth: usize) -> String {
        (**self).formatted(call_depth)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// A leveled log record.
///
/// Renders as its bare message unless a template is attached with
/// [`Record::with_template`]. Templates expand `%{id}`, `%{time}`,
/// `%{module}`, `%{level}` and `%{message}`; anything else is copied through.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Process-wide, strictly increasing identifier.
    pub id: u64,
    /// Creation time.
    pub time: DateTime<Local>,
    /// Name of the emitting module or component.
    pub module: String,
    pub level: Level,
    pub message: String,
    template: Option<String>,
}

impl Record {
    pub fn new(module: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            time: Local::now(),
            module: module.into(),
            level,
            message: message.into(),
            template: None,
        }
    }

    /// Attach a rendering template, e.g. `"%{time} %{module} %{level} %{message}"`.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + self.message.len());
        let mut rest = template;
        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            match &after[..end] {
                "id" => out.push_str(&self.id.to_string()),
                "time" => out.push_str(&self.time.format("%H:%M:%S%.3f").to_string()),
                "module" => out.push_str(&self.module),
                "level" => out.push_str(&self.level.to_string()),
                "message" => out.push_str(&self.message),
                _ => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl Formatted for Record {
    fn formatted(&self, _call_depth: usize) -> String {
        match &self.template {
            Some(t) => self.render(t),
            None => self.message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("CRITICAL", Level::Critical)]
    #[case("crit", Level::Critical)]
    #[case("Error", Level::Error)]
    #[case("warn", Level::Warning)]
    #[case("WARNING", Level::Warning)]
    #[case(" notice ", Level::Notice)]
    #[case("info", Level::Info)]
    #[case("debug", Level::Debug)]
    fn parses_level_names(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>().unwrap(), expected);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.to_string(), "unknown log level: \"verbose\"");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for level in Level::ALL {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn index_matches_severity_order() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
        assert!(Level::Critical < Level::Debug);
    }

    #[test]
    fn record_ids_increase() {
        let a = Record::new("app", Level::Info, "a");
        let b = Record::new("app", Level::Info, "b");
        assert!(b.id > a.id);
    }

    #[test]
    fn record_renders_bare_message_by_default() {
        let rec = Record::new("db", Level::Error, "connection refused");
        assert_eq!(rec.formatted(0), "connection refused");
    }

    #[test]
    fn record_template_expands_known_verbs() {
        let rec = Record::new("db", Level::Warning, "slow query")
            .with_template("[%{module}] %{level}: %{message} %{bogus}");
        assert_eq!(rec.formatted(2), "[db] WARNING: slow query %{bogus}");
    }

    #[test]
    fn unterminated_template_verb_is_copied() {
        let rec = Record::new("db", Level::Info, "x").with_template("%{message} %{lev");
        assert_eq!(rec.formatted(0), "x %{lev");
    }

    #[test]
    fn strings_format_as_themselves() {
        assert_eq!("plain".formatted(3), "plain");
        assert_eq!(String::from("owned").formatted(0), "owned");
    }
}
