use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use spate::{config::Config, Backend, Level, LineWriter, Options};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "spate", about = "Pipe log lines through a burst-coalescing writer")]
struct Cli {
    /// Config file (defaults to $SPATE_CONFIG or ~/.config/spate/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append to this file instead of writing to stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Level for lines without a leading `LEVEL:` tag.
    #[arg(long, default_value = "info")]
    level: Level,

    /// Wrap each line in its level's colour.
    #[arg(long)]
    color: bool,

    /// Prefix for every written line.
    #[arg(long)]
    prefix: Option<String>,

    /// Prepend a date and time header to every write.
    #[arg(long)]
    timestamps: bool,

    /// Override the quiet period, in milliseconds.
    #[arg(long)]
    gap_ms: Option<u64>,

    /// Write debug logs to /tmp/spate-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

/// Split an optional `LEVEL:` tag off the front of `line`.
fn split_level(line: &str, default: Level) -> (Level, &str) {
    if let Some((tag, rest)) = line.split_once(':') {
        if let Ok(level) = tag.parse::<Level>() {
            return (level, rest.trim_start());
        }
    }
    (default, line)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/spate-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("spate debug log started");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    if cli.color {
        config.color.enabled = true;
    }
    if let Some(prefix) = cli.prefix {
        config.output.prefix = prefix;
    }
    if cli.timestamps {
        config.output.date = true;
        config.output.time = true;
    }
    if let Some(gap_ms) = cli.gap_ms {
        config.throttle.gap_ms = gap_ms;
    }
    let options = Options::from_config(&config).context("invalid configuration")?;

    let backend = match &cli.output {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            Backend::new(LineWriter::new(file, config.output.clone()), options)?
        }
        None => Backend::new(LineWriter::stdout(config.output.clone()), options)?,
    };

    let pumped = pump(&backend, cli.level).await;
    let stats = backend.shutdown().await.context("writer failed")?;
    tracing::info!(?stats, "stdin closed");
    pumped
}

/// Feed stdin to `backend` line by line until EOF. Invalid UTF-8 is replaced
/// rather than ending the stream.
async fn pump(backend: &Backend, default: Level) -> anyhow::Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if stdin.read_until(b'\n', &mut buf).await.context("reading stdin")? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        let (level, text) = split_level(line, default);
        backend.log(level, 0, text)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_level_tag_is_split_off() {
        assert_eq!(split_level("ERROR: disk full", Level::Info), (Level::Error, "disk full"));
        assert_eq!(split_level("warn:x", Level::Info), (Level::Warning, "x"));
    }

    #[test]
    fn untagged_lines_use_the_default() {
        assert_eq!(split_level("plain line", Level::Notice), (Level::Notice, "plain line"));
        assert_eq!(
            split_level("http://example.com", Level::Debug),
            (Level::Debug, "http://example.com")
        );
    }
}
