//! Configuration types for spate.
//!
//! [`Config::load`] reads `$SPATE_CONFIG`, or `~/.config/spate/config.toml`
//! when that is unset, layered on top of the embedded defaults. A missing
//! file is not an error. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::color::ColorTable;
use crate::error::ConfigError;
use crate::types::Level;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[throttle]
gap_ms      = 10
history_len = 4

[queue]
policy   = "unbounded"
capacity = 4096

[output]
prefix       = ""
date         = false
time         = false
microseconds = false
utc          = false
msg_prefix   = false

[color]
enabled = false

[failure]
policy = "halt"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub color: ColorConfig,
    #[serde(default)]
    pub failure: FailureConfig,
}

/// `[throttle]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Quiet period, in milliseconds, that closes a coalescing batch.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
    /// Number of recent write timestamps kept for hot/cool classification.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

fn default_gap_ms() -> u64 { 10 }
fn default_history_len() -> usize { 4 }

impl ThrottleConfig {
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            gap_ms: default_gap_ms(),
            history_len: default_history_len(),
        }
    }
}

/// Queue admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    Unbounded,
    DropOldest,
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_queue_mode")]
    pub policy: QueueMode,
    /// Only consulted by [`QueueMode::DropOldest`].
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_queue_mode() -> QueueMode { QueueMode::Unbounded }
fn default_capacity() -> usize { 4096 }

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            policy: default_queue_mode(),
            capacity: default_capacity(),
        }
    }
}

/// `[output]` section: decoration applied by the line writer to each write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub prefix: String,
    /// `YYYY/MM/DD`
    #[serde(default)]
    pub date: bool,
    /// `HH:MM:SS`
    #[serde(default)]
    pub time: bool,
    /// `.ffffff` after the time; implies `time`.
    #[serde(default)]
    pub microseconds: bool,
    /// Render the header in UTC instead of local time.
    #[serde(default)]
    pub utc: bool,
    /// Put the prefix after the header instead of at the start of the line.
    #[serde(default)]
    pub msg_prefix: bool,
}

/// `[color]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub critical: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub debug: Option<String>,
}

impl ColorConfig {
    fn override_for(&self, level: Level) -> Option<&str> {
        match level {
            Level::Critical => self.critical.as_deref(),
            Level::Error => self.error.as_deref(),
            Level::Warning => self.warning.as_deref(),
            Level::Notice => self.notice.as_deref(),
            Level::Info => self.info.as_deref(),
            Level::Debug => self.debug.as_deref(),
        }
    }

    /// Resolve the colour table, or `None` when colour is disabled.
    pub fn table(&self) -> Result<Option<ColorTable>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        let overrides = Level::ALL
            .iter()
            .filter_map(|&level| self.override_for(level).map(|name| (level, name)));
        ColorTable::with_overrides(overrides).map(Some)
    }
}

/// What the writer does when the sink rejects a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Stop the writer task; later messages are never written.
    Halt,
    /// Log the error and keep going.
    Continue,
    /// Abort the whole process.
    Abort,
}

/// `[failure]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FailureConfig {
    #[serde(default = "default_failure_mode")]
    pub policy: FailureMode,
}

fn default_failure_mode() -> FailureMode { FailureMode::Halt }

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            policy: default_failure_mode(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `$SPATE_CONFIG` or `~/.config/spate/config.toml`, layered on
    /// top of the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load a specific file over the built-in defaults. A missing file yields
    /// the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document over the built-in defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(src, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject values the writer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle.gap_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "throttle.gap_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.throttle.history_len == 0 {
            return Err(ConfigError::Invalid {
                key: "throttle.history_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.queue.policy == QueueMode::DropOldest && self.queue.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "queue.capacity",
                reason: "drop_oldest needs a capacity of at least 1".to_string(),
            });
        }
        self.color.table()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var("SPATE_CONFIG") {
        return PathBuf::from(explicit);
    }
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("spate")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
