//! Command implementations for the Autosave+ CLI.
//!
//! Each command returns a result type implementing [`CommandResult`] so the
//! binary can print it as JSON (default) or human-readable text.

pub mod terminal;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::clock::SystemClock;
use crate::config::{PreferenceStore, Preferences};
use crate::file_host::FileDocumentHost;
use crate::host::{Confirmation, ConfirmationUi, DocumentHost, NotificationSink};
use crate::manager::{self, AutosaveInventory, CleanReport};
use crate::naming::{self, DocumentName, Unavailable};
use crate::saver::{IncrementalSaver, SaveOutcome, SkipReason};
use crate::scheduler::{AutosaveScheduler, DeferredTick, TickOutcome};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Preferences together with where they live.
#[derive(Debug, Serialize)]
pub struct PrefsResult {
    pub path: PathBuf,
    pub preferences: Preferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult for PrefsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let p = &self.preferences;
        let mut lines = Vec::new();
        if let Some(message) = &self.message {
            lines.push(message.clone());
        }
        lines.push(format!("Preferences file: {}", self.path.display()));
        lines.push(format!("  interval: {} min", p.interval));
        lines.push(format!("  save-next-to-scene: {}", p.save_next_to_scene));
        lines.push(format!("  save-location: {}", p.save_location));
        lines.push(format!("  prompt-before-save: {}", p.prompt_before_save));
        lines.push(format!("  disable-in-playback: {}", p.disable_in_playback));
        lines.join("\n")
    }
}

/// Show the effective preferences.
pub fn prefs_show(store: &dyn PreferenceStore, path: &Path) -> PrefsResult {
    PrefsResult {
        path: path.to_path_buf(),
        preferences: store.load(),
        message: None,
    }
}

/// Field changes for [`prefs_set`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PrefsUpdate {
    pub interval: Option<u32>,
    pub save_next_to_scene: Option<bool>,
    pub save_location: Option<String>,
    pub prompt_before_save: Option<bool>,
    pub disable_in_playback: Option<bool>,
}

impl PrefsUpdate {
    fn apply(&self, prefs: &mut Preferences) {
        if let Some(interval) = self.interval {
            prefs.interval = interval;
        }
        if let Some(next_to_scene) = self.save_next_to_scene {
            prefs.save_next_to_scene = next_to_scene;
        }
        if let Some(ref location) = self.save_location {
            prefs.save_location = location.clone();
        }
        if let Some(prompt) = self.prompt_before_save {
            prefs.prompt_before_save = prompt;
        }
        if let Some(disable) = self.disable_in_playback {
            prefs.disable_in_playback = disable;
        }
    }
}

/// Change preferences and persist the full record.
pub fn prefs_set(
    store: &mut dyn PreferenceStore,
    path: &Path,
    update: &PrefsUpdate,
) -> Result<PrefsResult> {
    let mut prefs = store.load();
    update.apply(&mut prefs);
    store.save(&prefs)?;
    Ok(PrefsResult {
        path: path.to_path_buf(),
        preferences: prefs,
        message: Some("Preferences saved successfully.".to_string()),
    })
}

/// Write default preferences.
pub fn prefs_reset(store: &mut dyn PreferenceStore, path: &Path) -> Result<PrefsResult> {
    let prefs = Preferences::default();
    store.save(&prefs)?;
    Ok(PrefsResult {
        path: path.to_path_buf(),
        preferences: prefs,
        message: Some("Preferences saved successfully.".to_string()),
    })
}

/// Location of the preferences file.
#[derive(Debug, Serialize)]
pub struct PrefsPathResult {
    pub path: PathBuf,
    pub exists: bool,
}

impl CommandResult for PrefsPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.exists {
            self.path.display().to_string()
        } else {
            format!("{} (not created yet)", self.path.display())
        }
    }
}

pub fn prefs_path(path: &Path) -> PrefsPathResult {
    PrefsPathResult {
        path: path.to_path_buf(),
        exists: path.exists(),
    }
}

fn unavailable_to_error(unavailable: Unavailable) -> Error {
    match unavailable {
        Unavailable::MissingDirectory(dir) => Error::DirectoryMissing(dir),
        Unavailable::InvalidDocumentName(path) => Error::InvalidDocumentName(path),
        other => Error::Other(other.to_string()),
    }
}

/// The path the next autosave would use.
#[derive(Debug, Serialize)]
pub struct NextPathResult {
    pub document: PathBuf,
    pub path: PathBuf,
}

impl CommandResult for NextPathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn next_path(store: &dyn PreferenceStore, document: &Path) -> Result<NextPathResult> {
    let host = FileDocumentHost::open(document);
    let path = naming::next_autosave_path(
        document,
        &store.load(),
        &host.default_work_directory(),
    )
    .map_err(unavailable_to_error)?;
    Ok(NextPathResult {
        document: document.to_path_buf(),
        path,
    })
}

/// A single autosave written on demand.
#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub document: PathBuf,
    pub path: PathBuf,
}

impl CommandResult for SaveResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Autosave created: {}", self.path.display())
    }
}

/// Write one incremental autosave now.
pub fn save_now(store: &dyn PreferenceStore, document: &Path) -> Result<SaveResult> {
    let mut host = FileDocumentHost::open(document);
    match IncrementalSaver::new().save(&mut host, &store.load()) {
        SaveOutcome::Saved(path) => Ok(SaveResult {
            document: document.to_path_buf(),
            path,
        }),
        SaveOutcome::Skipped(SkipReason::NoOpenDocument) => Err(Error::NoOpenDocument),
        SaveOutcome::Skipped(SkipReason::DirectoryMissing(dir)) => Err(Error::DirectoryMissing(dir)),
        SaveOutcome::Skipped(SkipReason::InvalidDocumentName(path)) => {
            Err(Error::InvalidDocumentName(path))
        }
        SaveOutcome::Failed(err) => Err(err),
    }
}

fn document_name(document: &Path) -> Result<DocumentName> {
    DocumentName::from_path(document)
        .ok_or_else(|| Error::InvalidDocumentName(document.to_path_buf()))
}

fn autosave_dir(store: &dyn PreferenceStore, document: &Path) -> PathBuf {
    let host = FileDocumentHost::open(document);
    naming::autosave_directory(document, &store.load(), &host.default_work_directory())
}

impl CommandResult for AutosaveInventory {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("{}\nDirectory: {}", self.summary(), self.directory.display())
    }
}

/// Count and size the autosaves of `document`.
pub fn info(store: &dyn PreferenceStore, document: &Path) -> Result<AutosaveInventory> {
    let name = document_name(document)?;
    AutosaveInventory::scan(&autosave_dir(store, document), &name)
}

/// Outcome of a cleanup request.
#[derive(Debug, Serialize)]
pub struct CleanResult {
    pub confirmed: bool,
    #[serde(flatten)]
    pub report: CleanReport,
}

impl CommandResult for CleanResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if !self.confirmed {
            return "Cleanup cancelled.".to_string();
        }
        let mut lines = vec![format!(
            "Autosave files have been deleted: {}",
            self.report.removed.len()
        )];
        for (path, reason) in &self.report.failed {
            lines.push(format!("Error removing {}: {}", path.display(), reason));
        }
        lines.join("\n")
    }
}

/// Delete the autosaves of `document`, asking `ui` first unless `assume_yes`.
pub fn clean(
    store: &dyn PreferenceStore,
    document: &Path,
    assume_yes: bool,
    ui: &mut dyn ConfirmationUi,
) -> Result<CleanResult> {
    let name = document_name(document)?;
    let dir = autosave_dir(store, document);

    if !assume_yes {
        let inventory = AutosaveInventory::scan(&dir, &name)?;
        let message = format!(
            "Delete {} autosave file(s) of {} in {}?",
            inventory.count(),
            document.display(),
            dir.display()
        );
        if ui.ask_yes_no("Clean Autosaves", &message) == Confirmation::No {
            return Ok(CleanResult {
                confirmed: false,
                report: CleanReport::default(),
            });
        }
    }

    Ok(CleanResult {
        confirmed: true,
        report: manager::clean_autosaves(&dir, &name)?,
    })
}

/// Totals from a foreground scheduler run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub saved: Vec<PathBuf>,
    pub skipped: u64,
    pub failed: u64,
    pub declined: u64,
}

impl CommandResult for RunSummary {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Autosave+ ran {} ticks: {} saved, {} skipped, {} failed, {} declined",
            self.ticks,
            self.saved.len(),
            self.skipped,
            self.failed,
            self.declined
        )
    }
}

impl RunSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Saved(SaveOutcome::Saved(path)) => self.saved.push(path.clone()),
            TickOutcome::Saved(SaveOutcome::Skipped(_)) => self.skipped += 1,
            TickOutcome::Saved(SaveOutcome::Failed(_)) => self.failed += 1,
            TickOutcome::Declined => self.declined += 1,
            _ => {}
        }
    }
}

/// Run the scheduler against `document` until `stop` is set.
pub fn run(
    store: impl PreferenceStore + 'static,
    document: &Path,
    tick: Duration,
    stop: &AtomicBool,
    sink: &mut dyn NotificationSink,
    ui: &mut dyn ConfirmationUi,
) -> Result<RunSummary> {
    let mut host = FileDocumentHost::open(document);
    let mut scheduler =
        AutosaveScheduler::new(store, SystemClock, DeferredTick::new()).with_cadence(tick);
    let mut summary = RunSummary::default();

    scheduler.start(sink);
    while let Some(delay) = scheduler.timer_mut().take() {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        std::thread::sleep(delay);
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let outcome = scheduler.run_tick(&mut host, sink, ui);
        summary.record(&outcome);
    }
    if scheduler.is_running() {
        scheduler.stop(sink);
    }

    Ok(summary)
}
