//! CLI end-to-end tests, driving the `abct` binary directly.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn abct_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_abct"))
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_output_lists_usage() {
    let mut cmd = Command::new(abct_bin());
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_output_contains_binary_name() {
    let mut cmd = Command::new(abct_bin());
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("abct"));
}

#[test]
fn run_prints_output_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "hello.abc", "Print \"hello\".");

    let mut cmd = Command::new(abct_bin());
    cmd.arg("run").arg(&source);
    cmd.assert().success().stdout(predicate::eq("hello\n"));
}

#[test]
fn run_reports_runtime_error_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "boom.abc", "Print 1 / 0.");

    let mut cmd = Command::new(abct_bin());
    cmd.arg("run").arg(&source);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Runtime Error"));
}

#[test]
fn run_reports_parse_error_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.abc", "Declare to be 1.");

    let mut cmd = Command::new(abct_bin());
    cmd.arg("run").arg(&source);
    cmd.assert().failure();
}

#[test]
fn second_run_uses_the_cache() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "cached.abc", "Print \"cached\".");

    let mut first = Command::new(abct_bin());
    first.arg("run").arg(&source);
    first.assert().success().stdout(predicate::eq("cached\n"));

    let cache_dir = dir.path().join("__engcache__");
    assert!(cache_dir.exists(), "first run should have populated the cache");

    let mut second = Command::new(abct_bin());
    second.arg("run").arg(&source).arg("--verbose");
    second
        .assert()
        .success()
        .stdout(predicate::eq("cached\n"))
        .stderr(predicate::str::contains("loaded from cache"));
}

#[test]
fn no_cache_flag_skips_cache_directory_creation() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "nocache.abc", "Print 1.");

    let mut cmd = Command::new(abct_bin());
    cmd.arg("run").arg(&source).arg("--no-cache");
    cmd.assert().success();

    assert!(!dir.path().join("__engcache__").exists());
}

#[test]
fn cache_clear_removes_populated_cache_directory() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "tocached.abc", "Print 1.");

    let mut run_cmd = Command::new(abct_bin());
    run_cmd.arg("run").arg(&source);
    run_cmd.assert().success();
    assert!(dir.path().join("__engcache__").exists());

    let mut clear_cmd = Command::new(abct_bin());
    clear_cmd.arg("cache").arg("clear").arg("--dir").arg(dir.path());
    clear_cmd.assert().success();
    assert!(!dir.path().join("__engcache__").exists());
}

#[test]
fn cache_clear_on_empty_directory_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::new(abct_bin());
    cmd.arg("cache").arg("clear").arg("--dir").arg(dir.path());
    cmd.assert().success();
}
