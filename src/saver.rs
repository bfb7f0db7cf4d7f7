//! Incremental, identity-preserving saves.
//!
//! A save re-points the live document at the autosave path, writes it, and
//! re-points it back at the original path. The swap is held by an
//! [`IdentityGuard`] so the original identity is restored on every exit path,
//! including a failed write or a panic inside the host.

use std::path::{Path, PathBuf};

use crate::config::Preferences;
use crate::host::{DocumentHost, NotificationSink, NotificationStyle};
use crate::naming::{self, Unavailable};
use crate::Error;

/// Why a save was not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No document is open (or it has never been saved)
    NoOpenDocument,
    /// The autosave directory does not exist
    DirectoryMissing(PathBuf),
    /// The document path has no file name to derive autosave names from
    InvalidDocumentName(PathBuf),
}

/// Result of one incremental save.
#[derive(Debug)]
pub enum SaveOutcome {
    /// A new autosave file was written
    Saved(PathBuf),
    /// Nothing was written
    Skipped(SkipReason),
    /// The write was attempted and failed; the document identity was restored
    Failed(Error),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    /// Path of the new autosave, if one was written.
    pub fn saved_path(&self) -> Option<&Path> {
        match self {
            SaveOutcome::Saved(path) => Some(path),
            _ => None,
        }
    }

    /// User-facing text and style for this outcome.
    pub fn message(&self) -> (String, NotificationStyle) {
        match self {
            SaveOutcome::Saved(path) => (
                format!("Autosave created: {}", path.display()),
                NotificationStyle::Info,
            ),
            SaveOutcome::Skipped(SkipReason::NoOpenDocument) => (
                "No scene file is currently open. Skipping save.".to_string(),
                NotificationStyle::Info,
            ),
            SaveOutcome::Skipped(SkipReason::DirectoryMissing(dir)) => (
                format!("Save location does not exist: {}", dir.display()),
                NotificationStyle::Warning,
            ),
            SaveOutcome::Skipped(SkipReason::InvalidDocumentName(path)) => (
                format!("Scene file name is not usable: {}. Skipping save.", path.display()),
                NotificationStyle::Warning,
            ),
            SaveOutcome::Failed(err) => (format!("Autosave failed: {}", err), NotificationStyle::Error),
        }
    }

    /// Show this outcome on `sink`.
    pub fn notify(&self, sink: &mut dyn NotificationSink) {
        let (text, style) = self.message();
        sink.show_transient(&text, style);
    }
}

/// Temporarily re-points a document's identity; restores it on drop.
pub struct IdentityGuard<'a, H: DocumentHost + ?Sized> {
    host: &'a mut H,
    original: PathBuf,
}

impl<'a, H: DocumentHost + ?Sized> IdentityGuard<'a, H> {
    /// Point `host`'s document at `target` until the guard is dropped.
    pub fn swap(host: &'a mut H, original: PathBuf, target: &Path) -> Self {
        host.set_document_path(target);
        Self { host, original }
    }

    /// The host, with the swapped identity in effect.
    pub fn host(&mut self) -> &mut H {
        self.host
    }
}

impl<H: DocumentHost + ?Sized> Drop for IdentityGuard<'_, H> {
    fn drop(&mut self) {
        self.host.set_document_path(&self.original);
    }
}

/// Writes numbered autosave copies of the open document.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncrementalSaver;

impl IncrementalSaver {
    pub fn new() -> Self {
        Self
    }

    /// Save the open document to its next autosave path.
    ///
    /// The document's current path is the same before and after this call
    /// regardless of the outcome.
    pub fn save<H: DocumentHost + ?Sized>(&self, host: &mut H, prefs: &Preferences) -> SaveOutcome {
        let Some(original) = host
            .current_document_path()
            .filter(|p| !p.as_os_str().is_empty())
        else {
            tracing::debug!("no open document, skipping autosave");
            return SaveOutcome::Skipped(SkipReason::NoOpenDocument);
        };

        let target = match naming::next_autosave_path(&original, prefs, &host.default_work_directory()) {
            Ok(path) => path,
            Err(Unavailable::MissingDirectory(dir)) => {
                tracing::warn!(dir = %dir.display(), "autosave directory missing");
                return SaveOutcome::Skipped(SkipReason::DirectoryMissing(dir));
            }
            Err(Unavailable::InvalidDocumentName(path)) => {
                tracing::warn!(path = %path.display(), "document has no usable file name");
                return SaveOutcome::Skipped(SkipReason::InvalidDocumentName(path));
            }
            Err(other) => return SaveOutcome::Failed(Error::Other(other.to_string())),
        };

        let format = host.document_format();
        let result = {
            let mut guard = IdentityGuard::swap(host, original, &target);
            guard.host().save_current_document(format.as_deref())
        };

        match result {
            Ok(()) => {
                tracing::info!(path = %target.display(), "autosave written");
                SaveOutcome::Saved(target)
            }
            Err(err) => {
                tracing::warn!(path = %target.display(), error = %err, "autosave write failed");
                SaveOutcome::Failed(err)
            }
        }
    }
}
