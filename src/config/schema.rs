//! KDL schema for preferences.kdl.
//!
//! This module provides:
//! - The [`Preferences`] record and its defaults
//! - Serialization/deserialization to/from KDL format
//! - Validation

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Default minutes between autosaves.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Required permissions for preferences.kdl (Unix: 0644, readable by all).
#[cfg(unix)]
pub const PREFERENCES_FILE_MODE: u32 = 0o644;

/// User preferences stored in preferences.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// interval 15
/// save-next-to-scene #true
/// save-location ""
/// prompt-before-save #false
/// disable-in-playback #false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Minimum minutes between autosaves (always >= 1)
    pub interval: u32,

    /// Save autosaves in the document's own directory
    pub save_next_to_scene: bool,

    /// Explicit autosave directory, used when `save_next_to_scene` is false
    pub save_location: String,

    /// Ask for confirmation before every autosave
    pub prompt_before_save: bool,

    /// Skip autosaves while the host is in playback
    pub disable_in_playback: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL_MINUTES,
            save_next_to_scene: true,
            save_location: String::new(),
            prompt_before_save: false,
            disable_in_playback: false,
        }
    }
}

impl Preferences {
    /// Validate the preference values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval < 1 {
            return Err(format!("interval must be at least 1 minute, got {}", self.interval));
        }
        Ok(())
    }

    /// Interval in seconds.
    pub fn interval_seconds(&self) -> i64 {
        i64::from(self.interval) * 60
    }

    /// Parse preferences from a KDL document.
    ///
    /// Missing or ill-typed fields keep their defaults; an interval below one
    /// minute is ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut prefs = Self::default();

        if let Some(i) = first_value(doc, "interval").and_then(|v| v.as_integer()) {
            if i >= 1 && i <= i128::from(u32::MAX) {
                prefs.interval = i as u32;
            }
        }

        if let Some(b) = first_value(doc, "save-next-to-scene").and_then(|v| v.as_bool()) {
            prefs.save_next_to_scene = b;
        }

        if let Some(s) = first_value(doc, "save-location").and_then(|v| v.as_string()) {
            prefs.save_location = s.to_string();
        }

        if let Some(b) = first_value(doc, "prompt-before-save").and_then(|v| v.as_bool()) {
            prefs.prompt_before_save = b;
        }

        if let Some(b) = first_value(doc, "disable-in-playback").and_then(|v| v.as_bool()) {
            prefs.disable_in_playback = b;
        }

        prefs
    }

    /// Convert preferences to a KDL document. All five fields are always written.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        push_node(&mut doc, "interval", KdlValue::Integer(i128::from(self.interval)));
        push_node(&mut doc, "save-next-to-scene", KdlValue::Bool(self.save_next_to_scene));
        push_node(
            &mut doc,
            "save-location",
            KdlValue::String(self.save_location.clone()),
        );
        push_node(&mut doc, "prompt-before-save", KdlValue::Bool(self.prompt_before_save));
        push_node(&mut doc, "disable-in-playback", KdlValue::Bool(self.disable_in_playback));

        doc.autoformat();
        doc
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}
