//! Preference management for Autosave+.
//!
//! ## preferences.kdl - User preferences
//!
//! Located at:
//! - `$AUTOSAVE_PLUS_CONFIG_DIR/preferences.kdl` when the variable is set
//! - `~/.config/autosave-plus/preferences.kdl` otherwise
//!
//! Contains:
//! - `interval` - Minutes between autosaves (>= 1)
//! - `save-next-to-scene` - Save beside the document instead of `save-location`
//! - `save-location` - Explicit autosave directory
//! - `prompt-before-save` - Ask before each autosave
//! - `disable-in-playback` - Skip autosaves while the host is in playback
//!
//! Missing fields take their defaults; an unreadable file behaves like an
//! empty one.

pub mod schema;
pub mod store;

pub use schema::{DEFAULT_INTERVAL_MINUTES, Preferences};
#[cfg(unix)]
pub use schema::PREFERENCES_FILE_MODE;
pub use store::{
    CONFIG_DIR_ENV, FilePreferenceStore, MemoryPreferenceStore, PREFERENCES_FILE_NAME,
    PreferenceStore, default_preferences_path,
};
