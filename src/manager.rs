//! Housekeeping for existing autosaves: inventory and cleanup.
//!
//! Only files matching a document's autosave pattern are ever touched; the
//! document itself and unrelated files in the same directory are left alone.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::naming::{self, DocumentName};
use crate::{Error, Result};

/// Count and total size of a document's autosaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutosaveInventory {
    /// Directory that was scanned
    pub directory: PathBuf,
    /// Autosave file names, in plain string order
    pub files: Vec<String>,
    /// Sum of file sizes in bytes
    pub total_bytes: u64,
}

impl AutosaveInventory {
    /// Scan `dir` for autosaves of `name`.
    ///
    /// A missing directory is an error; an empty one yields an empty inventory.
    pub fn scan(dir: &Path, name: &DocumentName) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::DirectoryMissing(dir.to_path_buf()));
        }

        let files = naming::list_autosaves(dir, name)?;
        let mut total_bytes = 0u64;
        for file in &files {
            let metadata = fs::metadata(dir.join(file))?;
            if metadata.is_file() {
                total_bytes += metadata.len();
            }
        }

        Ok(Self {
            directory: dir.to_path_buf(),
            files,
            total_bytes,
        })
    }

    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Total size in megabytes (MiB).
    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }

    /// One-line summary in the form shown to users.
    pub fn summary(&self) -> String {
        format!(
            "Autosave Files: {} | Total Size: {:.2} MB",
            self.count(),
            self.total_megabytes()
        )
    }
}

/// What a cleanup removed and what it could not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Files that were deleted
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete every autosave of `name` in `dir`.
///
/// Keeps going after individual failures; they are collected in the report.
pub fn clean_autosaves(dir: &Path, name: &DocumentName) -> Result<CleanReport> {
    let inventory = AutosaveInventory::scan(dir, name)?;
    let mut report = CleanReport::default();

    for file in inventory.files {
        let path = dir.join(&file);
        if !path.is_file() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => report.removed.push(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove autosave");
                report.failed.push((path, e.to_string()));
            }
        }
    }

    tracing::info!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        dir = %dir.display(),
        "autosave cleanup finished"
    );
    Ok(report)
}
