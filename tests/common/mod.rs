//! Common test utilities for autosave-plus integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch the
//! user's real preferences file.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated document and preference directories.
///
/// The `cmd()` method returns a `Command` that sets `AUTOSAVE_PLUS_CONFIG_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the autosave-plus binary with isolated preferences.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_autosave-plus"));
        cmd.current_dir(self.project_dir.path());
        cmd.env("AUTOSAVE_PLUS_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Get the path to the project directory.
    pub fn path(&self) -> &Path {
        self.project_dir.path()
    }

    /// Get the path to the preferences file (may not exist yet).
    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.path().join("preferences.kdl")
    }

    /// Write a document into the project directory and return its path.
    pub fn document(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Parse a command's stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
