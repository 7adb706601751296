//! Terminal colour decoration for submitted lines.
//!
//! A [`ColorTable`] maps each [`Level`] to an ANSI escape sequence. When colour
//! is enabled the backend wraps every formatted line as
//! `escape + text + RESET` before enqueueing it. The decoration is purely
//! cosmetic and is applied before throttling, so it never affects write
//! ordering or batching.
//!
//! # Colour names
//!
//! Overrides in the `[color]` config section accept:
//! - Named terminal colours (case-insensitive): `red`, `cyan`, …
//! - The same names prefixed `bold_` or `bright_`
//! - Hex RGB: `#rrggbb`
//! - 256-colour indexed: `indexed:N`
//! - A raw escape sequence starting with `\x1b[`
//! - `none` for no colour

use crate::error::ConfigError;
use crate::types::Level;

/// Escape that resets all attributes.
pub const RESET: &str = "\x1b[0m";

pub const BLACK: u8 = 30;
pub const RED: u8 = 31;
pub const GREEN: u8 = 32;
pub const YELLOW: u8 = 33;
pub const BLUE: u8 = 34;
pub const MAGENTA: u8 = 35;
pub const CYAN: u8 = 36;
pub const WHITE: u8 = 37;

/// `ESC[<code>m`
pub fn color_seq(code: u8) -> String {
    format!("\x1b[{code}m")
}

/// `ESC[<code>;1m`
pub fn color_seq_bold(code: u8) -> String {
    format!("\x1b[{code};1m")
}

/// Per-level escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    escapes: [String; 6],
}

impl Default for ColorTable {
    /// Critical magenta, Error red, Warning yellow, Notice green, Info plain,
    /// Debug cyan.
    fn default() -> Self {
        Self {
            escapes: [
                color_seq(MAGENTA),
                color_seq(RED),
                color_seq(YELLOW),
                color_seq(GREEN),
                String::new(),
                color_seq(CYAN),
            ],
        }
    }
}

impl ColorTable {
    /// Build a table from raw colour codes in [`Level::ALL`] order.
    ///
    /// Missing trailing entries, and entries equal to `0`, keep the default
    /// colour for that level.
    pub fn convert(codes: &[u8], bold: bool) -> Self {
        let mut table = Self::default();
        for (level, &code) in Level::ALL.iter().zip(codes) {
            if code == 0 {
                continue;
            }
            table.escapes[level.index()] = if bold {
                color_seq_bold(code)
            } else {
                color_seq(code)
            };
        }
        table
    }

    /// Replace the escape for one level. An empty string keeps the default.
    pub fn set(&mut self, level: Level, escape: impl Into<String>) {
        let escape = escape.into();
        if !escape.is_empty() {
            self.escapes[level.index()] = escape;
        }
    }

    /// Build a table from `(level, colour name)` overrides.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (Level, &'a str)>,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for (level, name) in overrides {
            match parse_color(name) {
                Some(escape) if escape.is_empty() => table.escapes[level.index()].clear(),
                Some(escape) => table.set(level, escape),
                None => {
                    return Err(ConfigError::UnknownColor {
                        level: level.as_key(),
                        name: name.to_string(),
                    })
                }
            }
        }
        Ok(table)
    }

    /// Escape sequence used for `level` (possibly empty).
    pub fn escape(&self, level: Level) -> &str {
        &self.escapes[level.index()]
    }

    /// `escape(level) + text + RESET`.
    pub fn wrap(&self, level: Level, text: &str) -> String {
        let escape = self.escape(level);
        let mut out = String::with_capacity(escape.len() + text.len() + RESET.len());
        out.push_str(escape);
        out.push_str(text);
        out.push_str(RESET);
        out
    }

    /// Inverse of [`wrap`](Self::wrap). Returns `None` when `line` was not
    /// wrapped with this table's escape for `level`.
    pub fn strip<'a>(&self, level: Level, line: &'a str) -> Option<&'a str> {
        line.strip_prefix(self.escape(level))?.strip_suffix(RESET)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn named_code(name: &str) -> Option<u8> {
    match name {
        "black" => Some(BLACK),
        "red" => Some(RED),
        "green" => Some(GREEN),
        "yellow" => Some(YELLOW),
        "blue" => Some(BLUE),
        "magenta" => Some(MAGENTA),
        "cyan" => Some(CYAN),
        "white" | "gray" | "grey" => Some(WHITE),
        _ => None,
    }
}

/// Parse a colour name into an escape sequence. `none` maps to `""`.
pub fn parse_color(s: &str) -> Option<String> {
    if s.starts_with("\x1b[") && s.ends_with('m') {
        return Some(s.to_string());
    }
    match s.trim().to_ascii_lowercase().as_str() {
        "none" => Some(String::new()),
        s if s.starts_with("bold_") => named_code(&s["bold_".len()..]).map(color_seq_bold),
        s if s.starts_with("bright_") => {
            named_code(&s["bright_".len()..]).map(|c| color_seq(c + 60))
        }
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(s.get(1..3)?, 16).ok()?;
            let g = u8::from_str_radix(s.get(3..5)?, 16).ok()?;
            let b = u8::from_str_radix(s.get(5..7)?, 16).ok()?;
            Some(format!("\x1b[38;2;{r};{g};{b}m"))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(format!("\x1b[38;5;{n}m"))
        }
        s => named_code(s).map(color_seq),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
