//! `spate` binary harness.
//!
//! # What this covers
//!
//! - **Pipe through**: lines on stdin come out on stdout in order, with any
//!   leading `LEVEL:` tag removed, and the process exits 0 on EOF.
//! - **Flags**: `--prefix`, `--color` and `--output` shape the output.
//! - **Bad input**: non-UTF-8 bytes are replaced, not fatal.
//! - **Bad config**: an invalid config file is a non-zero exit.
//!
//! # Running
//!
//! ```sh
//! cargo test --test cli_harness
//! ```

use std::fs;
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn run(args: &[&str], input: &str, home: &TempDir) -> Output {
    run_bytes(args, input.as_bytes(), home)
}

fn run_bytes(args: &[&str], input: &[u8], home: &TempDir) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_spate"))
        .args(args)
        .env("SPATE_CONFIG", home.path().join("absent.toml"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn stdin_lines_are_written_in_order() {
    let home = TempDir::new().unwrap();
    let input: String = (0..200).map(|i| format!("line {i}\n")).collect();
    let out = run(&[], &input, &home);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), input);
}

/// A line that is not UTF-8 is written with replacement characters and
/// does not cost the lines queued before it.
#[test]
fn invalid_utf8_keeps_earlier_lines() {
    let home = TempDir::new().unwrap();
    let valid: String = (0..20).map(|i| format!("ok {i}\n")).collect();
    let mut input = valid.clone().into_bytes();
    input.extend_from_slice(b"\xff\xfe bad\nafter\n");
    let out = run_bytes(&[], &input, &home);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, format!("{valid}\u{FFFD}\u{FFFD} bad\nafter\n"));
}

#[test]
fn level_tags_are_stripped() {
    let home = TempDir::new().unwrap();
    let out = run(&[], "ERROR: disk full\nplain\nwarn: slow\n", &home);
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "disk full\nplain\nslow\n");
}

#[test]
fn prefix_and_colour_flags() {
    let home = TempDir::new().unwrap();
    let out = run(&["--prefix", "> ", "--color", "--gap-ms", "1000"], "ERROR: bad\n", &home);
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "> \x1b[31mbad\x1b[0m\n");
}

#[test]
fn output_flag_appends_to_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("out.log");
    fs::write(&path, "before\n").unwrap();
    let out = run(&["--output", path.to_str().unwrap()], "after\n", &home);

    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "before\nafter\n");
}

#[test]
fn invalid_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    fs::write(&config, "[queue]\npolicy = \"drop_oldest\"\ncapacity = 0\n").unwrap();
    let out = run(&["--config", config.to_str().unwrap()], "x\n", &home);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("configuration"));
}
