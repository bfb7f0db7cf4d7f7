//! End-to-end scheduler scenarios against real files and a manual clock.
//!
//! Each test drives the scheduler the way a host would: take the posted tick,
//! advance the clock by its delay, and run the tick.

use std::fs;
use std::path::{Path, PathBuf};

use autosave_plus::clock::{Clock, ManualClock};
use autosave_plus::config::{FilePreferenceStore, MemoryPreferenceStore, Preferences};
use autosave_plus::file_host::FileDocumentHost;
use autosave_plus::host::{Confirmation, DocumentHost, NotificationSink, NotificationStyle};
use autosave_plus::saver::SaveOutcome;
use autosave_plus::scheduler::{AutosaveScheduler, ConfirmationResult, DeferredTick, TickOutcome};
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    messages: Vec<(String, NotificationStyle)>,
}

impl Recorder {
    fn countdowns(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(_, style)| *style == NotificationStyle::Countdown)
            .map(|(text, _)| text.as_str())
            .collect()
    }
}

impl NotificationSink for Recorder {
    fn show_transient(&mut self, text: &str, style: NotificationStyle) {
        self.messages.push((text.to_string(), style));
    }
}

struct Scenario {
    dir: TempDir,
    document: PathBuf,
    clock: ManualClock,
    host: FileDocumentHost,
    sink: Recorder,
    scheduler: AutosaveScheduler,
}

impl Scenario {
    fn new(prefs: Preferences) -> Self {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("scene.ma");
        fs::write(&document, "scene contents").unwrap();
        Self::with_store(dir, document, MemoryPreferenceStore::new(prefs))
    }

    fn with_store(
        dir: TempDir,
        document: PathBuf,
        store: impl autosave_plus::config::PreferenceStore + 'static,
    ) -> Self {
        let clock = ManualClock::default();
        let host = FileDocumentHost::open(&document).with_work_dir(dir.path());
        let scheduler = AutosaveScheduler::new(store, clock.clone(), DeferredTick::new());
        let mut scenario = Self {
            dir,
            document,
            clock,
            host,
            sink: Recorder::default(),
            scheduler,
        };
        assert!(scenario.scheduler.start(&mut scenario.sink));
        scenario
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Follow the tick chain for `secs` seconds of clock time.
    fn run_for(&mut self, secs: i64) -> Vec<TickOutcome> {
        let end = self.clock.now() + chrono::Duration::seconds(secs);
        let mut outcomes = Vec::new();
        while self.clock.now() < end {
            let Some(delay) = self.scheduler.timer_mut().take() else {
                break;
            };
            self.clock.advance(chrono::Duration::from_std(delay).unwrap());
            outcomes.push(self.scheduler.tick(&mut self.host, &mut self.sink));
        }
        outcomes
    }

    fn saved_paths(outcomes: &[TickOutcome]) -> Vec<PathBuf> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                TickOutcome::Saved(SaveOutcome::Saved(path)) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

fn every_minute() -> Preferences {
    Preferences {
        interval: 1,
        ..Default::default()
    }
}

#[test]
fn test_default_interval_saves_once_after_fifteen_minutes() {
    let mut s = Scenario::new(Preferences::default());

    let before = s.run_for(15 * 60 - 1);
    assert!(Scenario::saved_paths(&before).is_empty());

    let after = s.run_for(1);
    assert_eq!(
        Scenario::saved_paths(&after),
        vec![s.path().join("scene_autosave_001.ma")]
    );
    assert_eq!(
        fs::read_to_string(s.path().join("scene_autosave_001.ma")).unwrap(),
        "scene contents"
    );
    assert!(
        s.sink
            .messages
            .iter()
            .any(|(text, _)| text.starts_with("Autosave created: "))
    );
}

#[test]
fn test_consecutive_saves_are_numbered_and_keep_document_identity() {
    let mut s = Scenario::new(every_minute());

    let outcomes = s.run_for(5 * 60);

    let expected: Vec<PathBuf> = (1..=5)
        .map(|i| s.path().join(format!("scene_autosave_{:03}.ma", i)))
        .collect();
    assert_eq!(Scenario::saved_paths(&outcomes), expected);
    assert_eq!(s.host.current_document_path(), Some(s.document.clone()));
}

#[test]
fn test_no_second_save_before_interval_elapses() {
    let mut s = Scenario::new(every_minute());

    assert_eq!(Scenario::saved_paths(&s.run_for(60)).len(), 1);
    assert!(Scenario::saved_paths(&s.run_for(59)).is_empty());
    assert_eq!(Scenario::saved_paths(&s.run_for(1)).len(), 1);
}

#[test]
fn test_countdown_shown_once_per_second_in_final_window() {
    let mut s = Scenario::new(every_minute());

    s.run_for(54);
    assert!(s.sink.countdowns().is_empty());

    s.run_for(5);
    assert_eq!(
        s.sink.countdowns(),
        vec![
            "Next Autosave in: 5s",
            "Next Autosave in: 4s",
            "Next Autosave in: 3s",
            "Next Autosave in: 2s",
            "Next Autosave in: 1s",
        ]
    );
}

#[test]
fn test_playback_suppresses_saves_and_countdown() {
    let mut s = Scenario::new(Preferences {
        disable_in_playback: true,
        ..every_minute()
    });
    s.host.set_playback(true);

    let outcomes = s.run_for(120);

    assert!(
        outcomes
            .iter()
            .all(|o| matches!(o, TickOutcome::SuppressedByPlayback))
    );
    assert!(s.sink.countdowns().is_empty());

    // Overdue by now, so the first tick after playback ends saves.
    s.host.set_playback(false);
    assert_eq!(Scenario::saved_paths(&s.run_for(1)).len(), 1);
}

#[test]
fn test_missing_save_location_warns_and_keeps_running() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");
    let mut s = Scenario::new(Preferences {
        save_next_to_scene: false,
        save_location: missing.to_string_lossy().to_string(),
        ..every_minute()
    });

    let outcomes = s.run_for(60);

    assert!(Scenario::saved_paths(&outcomes).is_empty());
    assert!(s.sink.messages.iter().any(|(text, style)| {
        *style == NotificationStyle::Warning && text.starts_with("Save location does not exist")
    }));
    assert!(s.scheduler.is_running());
}

#[test]
fn test_failed_write_restores_document_identity() {
    let mut s = Scenario::new(every_minute());
    fs::remove_file(&s.document).unwrap();

    let outcomes = s.run_for(60);

    assert!(outcomes.iter().any(|o| matches!(o, TickOutcome::Saved(SaveOutcome::Failed(_)))));
    assert_eq!(s.host.current_document_path(), Some(s.document.clone()));
    assert_eq!(
        s.sink.messages.last().map(|(_, style)| *style),
        Some(NotificationStyle::Error)
    );
}

#[test]
fn test_only_one_confirmation_outstanding() {
    let mut s = Scenario::new(Preferences {
        prompt_before_save: true,
        ..every_minute()
    });

    let mut first = s.run_for(60);
    let pending = match first.pop() {
        Some(TickOutcome::ConfirmationRequested(pending)) => pending,
        other => panic!("expected a confirmation request, got {:?}", other),
    };

    // The next interval elapses while the dialog is still open.
    let second = s.run_for(60);
    assert!(second.iter().any(|o| matches!(o, TickOutcome::PromptBusy)));
    assert!(
        !second
            .iter()
            .any(|o| matches!(o, TickOutcome::ConfirmationRequested(_)))
    );

    match s.scheduler.resolve_confirmation(
        pending,
        Confirmation::Yes,
        &mut s.host,
        &mut s.sink,
    ) {
        ConfirmationResult::Saved(outcome) => assert!(outcome.is_saved()),
        other => panic!("expected a save, got {:?}", other),
    }
    assert!(s.path().join("scene_autosave_001.ma").exists());
    assert!(!s.path().join("scene_autosave_002.ma").exists());
}

#[test]
fn test_confirmation_after_stop_never_saves() {
    let mut s = Scenario::new(Preferences {
        prompt_before_save: true,
        ..every_minute()
    });

    let pending = match s.run_for(60).pop() {
        Some(TickOutcome::ConfirmationRequested(pending)) => pending,
        other => panic!("expected a confirmation request, got {:?}", other),
    };

    s.scheduler.stop(&mut s.sink);
    s.scheduler.start(&mut s.sink);

    let result =
        s.scheduler
            .resolve_confirmation(pending, Confirmation::Yes, &mut s.host, &mut s.sink);
    assert!(matches!(result, ConfirmationResult::Stale));
    assert!(!s.path().join("scene_autosave_001.ma").exists());
}

#[test]
fn test_declined_confirmation_waits_a_full_interval() {
    let mut s = Scenario::new(Preferences {
        prompt_before_save: true,
        ..every_minute()
    });

    let pending = match s.run_for(60).pop() {
        Some(TickOutcome::ConfirmationRequested(pending)) => pending,
        other => panic!("expected a confirmation request, got {:?}", other),
    };
    let result =
        s.scheduler
            .resolve_confirmation(pending, Confirmation::No, &mut s.host, &mut s.sink);
    assert!(matches!(result, ConfirmationResult::Declined));

    let outcomes = s.run_for(59);
    assert!(
        !outcomes
            .iter()
            .any(|o| matches!(o, TickOutcome::ConfirmationRequested(_)))
    );
}

#[test]
fn test_stop_ends_tick_chain() {
    let mut s = Scenario::new(every_minute());
    s.run_for(10);

    assert!(s.scheduler.stop(&mut s.sink));

    assert!(s.run_for(120).is_empty());
    assert!(!s.path().join("scene_autosave_001.ma").exists());
}

#[test]
fn test_preferences_file_without_playback_field_uses_default() {
    let dir = TempDir::new().unwrap();
    let document = dir.path().join("scene.ma");
    fs::write(&document, "scene contents").unwrap();
    let prefs_path = dir.path().join("preferences.kdl");
    fs::write(
        &prefs_path,
        "interval 1\nsave-next-to-scene #true\nsave-location \"\"\nprompt-before-save #false\n",
    )
    .unwrap();

    let mut s = Scenario::with_store(dir, document, FilePreferenceStore::new(&prefs_path));
    s.host.set_playback(true);

    // disable-in-playback defaults to false, so playback does not block the save.
    let outcomes = s.run_for(60);
    assert_eq!(Scenario::saved_paths(&outcomes).len(), 1);
}

#[test]
fn test_preference_changes_apply_on_next_tick() {
    let mut s = Scenario::new(Preferences::default());
    s.run_for(60);

    s.scheduler.update_preferences(&every_minute()).unwrap();

    // Already past the new one-minute interval.
    assert_eq!(Scenario::saved_paths(&s.run_for(1)).len(), 1);
}
