//! A [`DocumentHost`] whose document is a plain file on disk.
//!
//! The "live" content is whatever the file at the source path holds when a
//! save happens; saving copies it to the current identity path. Used by the
//! CLI to autosave files edited by another program.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::host::DocumentHost;
use crate::{Error, Result};

/// Document backed by a file.
#[derive(Debug, Clone)]
pub struct FileDocumentHost {
    source: Option<PathBuf>,
    identity: Option<PathBuf>,
    playing: bool,
    work_dir: PathBuf,
}

impl FileDocumentHost {
    /// Open `path` as the document. The file does not need to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: Some(path.clone()),
            identity: Some(path),
            playing: false,
            work_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Host with no document open.
    pub fn empty() -> Self {
        Self {
            source: None,
            identity: None,
            playing: false,
            work_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Override the fallback directory for bare document names.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Toggle the simulated playback state.
    pub fn set_playback(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Path the document content is read from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl DocumentHost for FileDocumentHost {
    fn current_document_path(&self) -> Option<PathBuf> {
        self.identity.clone()
    }

    fn set_document_path(&mut self, path: &Path) {
        self.identity = Some(path.to_path_buf());
    }

    fn document_format(&self) -> Option<String> {
        self.source
            .as_deref()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
    }

    fn save_current_document(&mut self, _format: Option<&str>) -> Result<()> {
        let source = self.source.as_deref().ok_or(Error::NoOpenDocument)?;
        let target = self.identity.as_deref().ok_or(Error::NoOpenDocument)?;

        let content = fs::read(source)
            .map_err(|e| Error::WriteFailure(format!("cannot read {}: {}", source.display(), e)))?;

        if target == source {
            fs::write(target, &content)?;
            return Ok(());
        }

        // Snapshots never replace an existing file.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    Error::WriteFailure(format!("{} already exists", target.display()))
                }
                _ => Error::WriteFailure(format!("cannot create {}: {}", target.display(), e)),
            })?;
        file.write_all(&content)
            .and_then(|()| file.sync_all())
            .map_err(|e| Error::WriteFailure(format!("cannot write {}: {}", target.display(), e)))?;
        Ok(())
    }

    fn is_in_playback(&self) -> bool {
        self.playing
    }

    fn default_work_directory(&self) -> PathBuf {
        self.work_dir.clone()
    }
}
