//! Integration tests for global CLI flags.
//!
//! These tests verify that:
//! - `--version` reports the package version, commit and build time
//! - `--log-format json` turns stderr logs into JSON lines
//! - the default log format is plain text

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_long_version_includes_build_info() {
    let env = TestEnv::new();

    env.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "autosave-plus {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("\ncommit: "))
        .stdout(predicate::str::contains("\nbuilt: "));
}

#[test]
fn test_json_log_format_on_stderr() {
    let env = TestEnv::new();

    let output = env
        .cmd()
        .args(["-v", "--log-format", "json", "prefs", "set", "--interval", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("every log line is JSON"))
        .collect();
    assert!(
        events
            .iter()
            .any(|e| e["level"] == "INFO" && e["fields"]["message"] == "preferences saved")
    );
}

#[test]
fn test_compact_log_format_is_plain_text() {
    let env = TestEnv::new();

    env.cmd()
        .args(["-v", "prefs", "set", "--interval", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("preferences saved"))
        .stderr(predicate::str::contains("\"fields\"").not());
}

#[test]
fn test_unknown_log_format_rejected() {
    let env = TestEnv::new();

    env.cmd()
        .args(["--log-format", "xml", "prefs", "show"])
        .assert()
        .failure();
}
