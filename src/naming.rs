//! Autosave file naming.
//!
//! Autosaves are named `{base}_autosave_{NNN}{ext}` where `NNN` is a 1-based,
//! zero-padded (minimum three digits) sequence index. The next index is the
//! number of existing autosaves for the same document plus one; when that name
//! is already taken (an older autosave was deleted, leaving a gap) the index is
//! advanced until a free name is found. Past 999 the index simply grows to
//! four digits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Preferences;

/// Separator between the document base name and the sequence index.
pub const AUTOSAVE_MARKER: &str = "_autosave_";

/// Minimum width of the zero-padded sequence index.
pub const INDEX_WIDTH: usize = 3;

/// Why no autosave path could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The resolved autosave directory does not exist
    MissingDirectory(PathBuf),
    /// The document path has no usable file name
    InvalidDocumentName(PathBuf),
    /// The directory exists but could not be listed
    Unreadable { dir: PathBuf, reason: String },
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::MissingDirectory(dir) => {
                write!(f, "Save location does not exist: {}", dir.display())
            }
            Unavailable::InvalidDocumentName(path) => {
                write!(f, "Document has no usable file name: {}", path.display())
            }
            Unavailable::Unreadable { dir, reason } => {
                write!(f, "Cannot list {}: {}", dir.display(), reason)
            }
        }
    }
}

/// Base name and extension of a document, split the way autosave names use them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    /// File name without the final extension
    pub base: String,
    /// Final extension including the leading dot, or empty
    pub extension: String,
}

impl DocumentName {
    /// Split a document path into base name and extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let base = path.file_stem()?.to_str()?.to_string();
        let extension = match path.extension() {
            Some(ext) => format!(".{}", ext.to_str()?),
            None => String::new(),
        };
        Some(Self { base, extension })
    }

    /// File name of the autosave with the given sequence index.
    pub fn autosave_file_name(&self, index: u32) -> String {
        format!(
            "{}{}{:0width$}{}",
            self.base,
            AUTOSAVE_MARKER,
            index,
            self.extension,
            width = INDEX_WIDTH
        )
    }

    /// Sequence index of `file_name` if it is one of this document's autosaves.
    pub fn autosave_index(&self, file_name: &str) -> Option<u32> {
        let rest = file_name.strip_prefix(&self.base)?;
        let rest = rest.strip_prefix(AUTOSAVE_MARKER)?;
        let digits = rest.strip_suffix(&self.extension)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Whether `file_name` is one of this document's autosaves.
    pub fn is_autosave(&self, file_name: &str) -> bool {
        self.autosave_index(file_name).is_some()
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Directory autosaves of `document` go to.
///
/// Beside the document when `save_next_to_scene` is set (falling back to
/// `fallback_dir` for a bare file name), otherwise the configured location.
pub fn autosave_directory(document: &Path, prefs: &Preferences, fallback_dir: &Path) -> PathBuf {
    if prefs.save_next_to_scene {
        match document.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => fallback_dir.to_path_buf(),
        }
    } else {
        expand_home(Path::new(&prefs.save_location))
    }
}

/// Existing autosave file names for `name` in `dir`, in plain string order.
pub fn list_autosaves(dir: &Path, name: &DocumentName) -> io::Result<Vec<String>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(file_name) = entry.file_name().to_str() {
            if name.is_autosave(file_name) {
                found.push(file_name.to_string());
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Compute the path the next autosave of `document` should be written to.
///
/// Deterministic for a given directory content. Concurrent external changes to
/// the directory between this call and the write are not guarded against.
pub fn next_autosave_path(
    document: &Path,
    prefs: &Preferences,
    fallback_dir: &Path,
) -> Result<PathBuf, Unavailable> {
    let name = DocumentName::from_path(document)
        .ok_or_else(|| Unavailable::InvalidDocumentName(document.to_path_buf()))?;

    let dir = autosave_directory(document, prefs, fallback_dir);
    if !dir.is_dir() {
        return Err(Unavailable::MissingDirectory(dir));
    }

    let existing = list_autosaves(&dir, &name).map_err(|e| Unavailable::Unreadable {
        dir: dir.clone(),
        reason: e.to_string(),
    })?;

    let mut index = u32::try_from(existing.len()).unwrap_or(u32::MAX).saturating_add(1);
    let mut candidate = dir.join(name.autosave_file_name(index));
    while candidate.exists() && index < u32::MAX {
        index += 1;
        candidate = dir.join(name.autosave_file_name(index));
    }

    tracing::debug!(existing = existing.len(), index, path = %candidate.display(), "next autosave path");
    Ok(candidate)
}
