use std::process::{Command, Output};

use serde_json::Value;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logkit-cli"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn logkit-cli")
}

fn stdout_entries(out: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_stdout_receives_entry() {
    let out = run(&["--format", "json", "emit", "-f", "port=8080", "server up"]);
    assert!(out.status.success());

    let entries = stdout_entries(&out);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["level"], "INFO");
    assert_eq!(entries[0]["msg"], "server up");
    assert_eq!(entries[0]["port"], 8080);
}

#[test]
fn test_default_console_output() {
    let out = run(&["emit", "-n", "http", "hello"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let cols: Vec<&str> = stdout.trim_end().split('\t').collect();
    assert_eq!(cols[1], "INFO");
    assert_eq!(cols[2], "http");
    assert_eq!(cols[4], "hello");
}

#[test]
fn test_below_threshold_is_silent() {
    let out = run(&["--level", "warn", "emit", "-s", "info", "quiet"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_file_output_leaves_stdout_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cli.log");
    let out = run(&[
        "--output",
        path.to_str().unwrap(),
        "--format",
        "json",
        "emit",
        "-s",
        "warn",
        "disk nearly full",
    ]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let written = std::fs::read_to_string(&path).unwrap();
    let entry: Value = serde_json::from_str(written.trim_end()).unwrap();
    assert_eq!(entry["level"], "WARN");
    assert_eq!(entry["msg"], "disk nearly full");
}

#[test]
fn test_invalid_level_fails() {
    let out = run(&["--level", "chatty", "emit", "x"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid log level"), "{}", stderr);
}

#[test]
fn test_fatal_with_error_logs_and_exits() {
    let out = run(&["--format", "json", "fatal", "-e", "db unreachable", "startup failed"]);
    assert_eq!(out.status.code(), Some(1));

    let entries = stdout_entries(&out);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["level"], "FATAL");
    assert_eq!(entries[0]["msg"], "startup failed");
    assert_eq!(entries[0]["error"], "db unreachable");
    assert!(entries[0]["stacktrace"].is_string());
}

// The no-error path also writes its entry before exiting, only without `error`.
#[test]
fn test_fatal_without_error_still_logs() {
    let out = run(&["--format", "json", "fatal", "startup failed"]);
    assert_eq!(out.status.code(), Some(1));

    let entries = stdout_entries(&out);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["level"], "FATAL");
    assert!(entries[0].get("error").is_none());
}
