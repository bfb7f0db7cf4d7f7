//! Autosave+ - background incremental autosaves for long-running editors.
//!
//! This library provides the scheduling and save engine behind the
//! `autosave-plus` CLI: the tick-driven scheduler, the incremental naming
//! policy, the identity-preserving saver and the persisted preferences.
//! Host applications plug in through the traits in [`host`].

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod file_host;
pub mod host;
pub mod logging;
pub mod manager;
pub mod naming;
pub mod saver;
pub mod scheduler;

use std::path::PathBuf;


/// Library-level error type for Autosave+ operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("No document is currently open")]
    NoOpenDocument,

    #[error("Document has no usable file name: {}", .0.display())]
    InvalidDocumentName(PathBuf),

    #[error("Save location does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Failed to write preferences to {}: {source}", path.display())]
    PreferenceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Autosave+ operations.
pub type Result<T> = std::result::Result<T, Error>;
