//! Bakes build provenance into `autosave-plus --version`.
//!
//! - `AUTOSAVE_PLUS_GIT_COMMIT`: taken from the environment when set (source
//!   tarballs, packaging), otherwise `git describe`, otherwise "unknown".
//! - `AUTOSAVE_PLUS_BUILD_TIMESTAMP`: `SOURCE_DATE_EPOCH` when set, so
//!   reproducible builds stay reproducible, otherwise the current time.

use std::env;
use std::process::Command;

use chrono::{DateTime, Utc};

const COMMIT_VAR: &str = "AUTOSAVE_PLUS_GIT_COMMIT";
const TIMESTAMP_VAR: &str = "AUTOSAVE_PLUS_BUILD_TIMESTAMP";

fn main() {
    println!("cargo:rerun-if-env-changed={COMMIT_VAR}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let commit = env::var(COMMIT_VAR)
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(describe_head)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env={COMMIT_VAR}={commit}");

    let built = source_date_epoch().unwrap_or_else(Utc::now);
    println!(
        "cargo:rustc-env={TIMESTAMP_VAR}={}",
        built.format("%Y-%m-%dT%H:%M:%SZ")
    );
}

/// Short commit of HEAD, suffixed with `-dirty` for uncommitted changes.
fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=10"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.to_string())
}

fn source_date_epoch() -> Option<DateTime<Utc>> {
    let secs = env::var("SOURCE_DATE_EPOCH").ok()?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}
