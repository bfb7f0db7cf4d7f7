//! Persistence of [`Preferences`].
//!
//! Loading never fails: a missing or corrupt file degrades to defaults.
//! Saving is atomic (temp file + rename) and reports failures to the caller.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use kdl::KdlDocument;
use tempfile::NamedTempFile;

use crate::config::schema::Preferences;
use crate::{Error, Result};

/// Environment variable overriding the preferences directory.
pub const CONFIG_DIR_ENV: &str = "AUTOSAVE_PLUS_CONFIG_DIR";

/// File name of the preferences record.
pub const PREFERENCES_FILE_NAME: &str = "preferences.kdl";

/// Storage for the preferences record.
pub trait PreferenceStore {
    /// Current preferences, or defaults when nothing usable is stored.
    fn load(&self) -> Preferences;

    /// Replace the stored record.
    fn save(&mut self, prefs: &Preferences) -> Result<()>;
}

/// Resolve the preferences file location.
///
/// `$AUTOSAVE_PLUS_CONFIG_DIR/preferences.kdl` when the variable is set,
/// otherwise `<config dir>/autosave-plus/preferences.kdl`.
pub fn default_preferences_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir).join(PREFERENCES_FILE_NAME));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("autosave-plus").join(PREFERENCES_FILE_NAME))
}

/// Preferences kept in a KDL file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Create a store backed by `path`. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default per-user location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_preferences_path()?))
    }

    /// Get the path to the preferences file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = crate::config::schema::PREFERENCES_FILE_MODE;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(mode))?;
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Preferences {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no preferences file, using defaults");
                return Preferences::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read preferences, using defaults");
                return Preferences::default();
            }
        };

        match content.parse::<KdlDocument>() {
            Ok(doc) => Preferences::from_kdl(&doc),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt preferences file, using defaults");
                Preferences::default()
            }
        }
    }

    fn save(&mut self, prefs: &Preferences) -> Result<()> {
        prefs.validate().map_err(Error::InvalidPreferences)?;

        let contents = prefs.to_kdl().to_string();
        self.write_atomic(&contents)
            .map_err(|source| Error::PreferenceWrite {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

/// Preferences held in memory, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    prefs: Preferences,
}

impl MemoryPreferenceStore {
    pub fn new(prefs: Preferences) -> Self {
        Self { prefs }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Preferences {
        self.prefs.clone()
    }

    fn save(&mut self, prefs: &Preferences) -> Result<()> {
        prefs.validate().map_err(Error::InvalidPreferences)?;
        self.prefs = prefs.clone();
        Ok(())
    }
}
