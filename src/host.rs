//! Collaborator interfaces between the autosave engine and its host application.
//!
//! The engine never talks to an editor directly. A host implements
//! [`DocumentHost`] for the open document, [`NotificationSink`] for transient
//! status text, and [`ConfirmationUi`] for the optional modal prompt.

use std::path::{Path, PathBuf};

use crate::Result;

/// Access to the live document of the host application.
pub trait DocumentHost {
    /// Path of the open document, or `None` when nothing has been saved/opened yet.
    fn current_document_path(&self) -> Option<PathBuf>;

    /// Re-point the document's save target. Does not write anything.
    fn set_document_path(&mut self, path: &Path);

    /// On-disk format of the open document, if the host knows it.
    fn document_format(&self) -> Option<String>;

    /// Write the document to its current save target.
    fn save_current_document(&mut self, format: Option<&str>) -> Result<()>;

    /// Whether the host is in a playback/preview mode.
    fn is_in_playback(&self) -> bool;

    /// Fallback directory for documents without a parent directory.
    fn default_work_directory(&self) -> PathBuf;
}

/// Visual treatment of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStyle {
    /// Plain status text
    Info,
    /// Countdown before the next autosave (highlighted)
    Countdown,
    /// Recoverable problem the user should notice
    Warning,
    /// A save attempt failed
    Error,
}

impl NotificationStyle {
    /// Get the highlight color hosts are expected to use for this style.
    pub fn color(&self) -> &'static str {
        match self {
            NotificationStyle::Info => "#FFFFFF",
            NotificationStyle::Countdown => "#00FF00",
            NotificationStyle::Warning => "#FFFF00",
            NotificationStyle::Error => "#FF0000",
        }
    }

    /// Lowercase name used in machine-readable output.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationStyle::Info => "info",
            NotificationStyle::Countdown => "countdown",
            NotificationStyle::Warning => "warning",
            NotificationStyle::Error => "error",
        }
    }
}

/// Fire-and-forget status display.
pub trait NotificationSink {
    fn show_transient(&mut self, text: &str, style: NotificationStyle);

    /// Enable or disable the host's "start" control, if it has one.
    fn set_start_enabled(&mut self, _enabled: bool) {}
}

/// Answer to a yes/no confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    pub fn is_yes(self) -> bool {
        self == Confirmation::Yes
    }
}

/// Modal yes/no dialog.
pub trait ConfirmationUi {
    fn ask_yes_no(&mut self, title: &str, message: &str) -> Confirmation;
}

/// Sink that discards everything. Useful for one-shot saves without a UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn show_transient(&mut self, _text: &str, _style: NotificationStyle) {}
}
