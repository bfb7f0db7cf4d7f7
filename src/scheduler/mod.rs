//! Autosave scheduling state machine.
//!
//! The scheduler is either stopped or running. While running, every tick:
//!
//! 1. reloads preferences,
//! 2. stays quiet while the host is in playback (if configured),
//! 3. waits until `interval` minutes have passed since the last save, emitting
//!    a once-per-second countdown during the final five seconds,
//! 4. debounces duplicate fires within one second,
//! 5. reserves the slot (`last_save_time = last_prompt_time = now`) and then
//!    either saves directly or asks for confirmation first,
//! 6. re-posts itself through the [`TickTimer`].
//!
//! Confirmation is a suspension point: a due tick returns
//! [`TickOutcome::ConfirmationRequested`] with a [`PendingConfirmation`] token,
//! and the host answers through [`AutosaveScheduler::resolve_confirmation`].
//! Only one confirmation can be outstanding, and a token issued before a
//! `stop()` can never trigger a save.

pub mod timer;

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::config::{PreferenceStore, Preferences};
use crate::host::{Confirmation, ConfirmationUi, DocumentHost, NotificationSink, NotificationStyle};
use crate::saver::{IncrementalSaver, SaveOutcome};

pub use timer::{DeferredTick, TickTimer};

/// Delay between ticks.
pub const DEFAULT_TICK_CADENCE: StdDuration = StdDuration::from_millis(250);

/// Seconds before a save during which the countdown is shown.
pub const COUNTDOWN_WINDOW_SECS: i64 = 5;

/// Minimum seconds between two countdown notifications.
pub const COUNTDOWN_MIN_GAP_SECS: i64 = 1;

/// Minimum seconds between two confirmation/save reservations.
pub const DEBOUNCE_SECS: i64 = 1;

/// Title of the confirmation dialog.
pub const CONFIRM_TITLE: &str = "Autosave Prompt";

/// Body of the confirmation dialog.
pub const CONFIRM_MESSAGE: &str = "Do you want to proceed with Autosave?";

/// Mutable scheduler bookkeeping, owned by one [`AutosaveScheduler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    running: bool,
    last_save_time: Option<DateTime<Utc>>,
    last_prompt_time: Option<DateTime<Utc>>,
    in_prompt: bool,
    last_countdown_emit_time: Option<DateTime<Utc>>,
    /// Bumped on every start and stop; ties confirmations to one run
    generation: u64,
}

impl SchedulerState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time of the last save reservation (or of the last start).
    pub fn last_save_time(&self) -> Option<DateTime<Utc>> {
        self.last_save_time
    }

    pub fn last_prompt_time(&self) -> Option<DateTime<Utc>> {
        self.last_prompt_time
    }

    /// Whether a confirmation is outstanding.
    pub fn in_prompt(&self) -> bool {
        self.in_prompt
    }

    /// Time of the last countdown notification; `None` until one is shown.
    pub fn last_countdown_emit_time(&self) -> Option<DateTime<Utc>> {
        self.last_countdown_emit_time
    }

    fn countdown_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_countdown_emit_time {
            Some(last) => now - last >= Duration::seconds(COUNTDOWN_MIN_GAP_SECS),
            None => true,
        }
    }
}

/// Token for an outstanding confirmation. Hand it back with the user's answer.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending confirmation blocks further prompts until resolved"]
pub struct PendingConfirmation {
    generation: u64,
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The scheduler is stopped; the tick chain ends here
    Stopped,
    /// The host is in playback and playback suppression is on
    SuppressedByPlayback,
    /// Not due yet
    Waiting { remaining: Duration },
    /// Not due yet; a countdown notification was shown
    Countdown { seconds: i64 },
    /// Due, but a reservation happened less than a second ago
    Debounced,
    /// Due, but a confirmation is already outstanding
    PromptBusy,
    /// Due; the host must ask the user and resolve the token
    ConfirmationRequested(PendingConfirmation),
    /// The user declined the confirmation
    Declined,
    /// A save was attempted
    Saved(SaveOutcome),
}

impl TickOutcome {
    /// The save attempt made by this tick, if any.
    pub fn save_outcome(&self) -> Option<&SaveOutcome> {
        match self {
            TickOutcome::Saved(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Result of answering a [`PendingConfirmation`].
#[derive(Debug)]
pub enum ConfirmationResult {
    /// The answer was yes and a save was attempted
    Saved(SaveOutcome),
    /// The answer was no
    Declined,
    /// The scheduler was stopped or restarted since the token was issued
    Stale,
}

/// Drives periodic incremental saves of the host's document.
pub struct AutosaveScheduler<T: TickTimer = DeferredTick> {
    state: SchedulerState,
    store: Box<dyn PreferenceStore>,
    clock: Box<dyn Clock>,
    timer: T,
    saver: IncrementalSaver,
    cadence: StdDuration,
}

impl<T: TickTimer> AutosaveScheduler<T> {
    /// Create a stopped scheduler.
    pub fn new(
        store: impl PreferenceStore + 'static,
        clock: impl Clock + 'static,
        timer: T,
    ) -> Self {
        Self {
            state: SchedulerState::default(),
            store: Box::new(store),
            clock: Box::new(clock),
            timer,
            saver: IncrementalSaver::new(),
            cadence: DEFAULT_TICK_CADENCE,
        }
    }

    /// Set the delay between ticks.
    pub fn with_cadence(mut self, cadence: StdDuration) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn cadence(&self) -> StdDuration {
        self.cadence
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Current preferences from the store.
    pub fn preferences(&self) -> Preferences {
        self.store.load()
    }

    /// Persist new preferences. They take effect on the next tick.
    pub fn update_preferences(&mut self, prefs: &Preferences) -> crate::Result<()> {
        self.store.save(prefs)
    }

    /// Start the tick chain. Returns false (with a notice) if already running.
    pub fn start(&mut self, sink: &mut dyn NotificationSink) -> bool {
        if self.state.running {
            sink.show_transient("Autosave+ is already running.", NotificationStyle::Info);
            return false;
        }

        let now = self.clock.now();
        self.state.running = true;
        self.state.last_save_time = Some(now);
        self.state.last_prompt_time = Some(now);
        self.state.last_countdown_emit_time = None;
        self.state.in_prompt = false;
        self.state.generation += 1;

        tracing::info!(generation = self.state.generation, "autosave scheduler started");
        sink.show_transient("Autosave+ started.", NotificationStyle::Info);
        sink.set_start_enabled(false);
        self.timer.post(self.cadence);
        true
    }

    /// Stop the tick chain. Returns false (with a notice) if not running.
    ///
    /// An outstanding confirmation loses its ability to save.
    pub fn stop(&mut self, sink: &mut dyn NotificationSink) -> bool {
        if !self.state.running {
            sink.show_transient("Autosave+ is not running.", NotificationStyle::Info);
            return false;
        }

        self.state.running = false;
        self.state.in_prompt = false;
        self.state.generation += 1;
        self.timer.cancel();

        tracing::info!("autosave scheduler stopped");
        sink.show_transient("Autosave+ stopped.", NotificationStyle::Info);
        sink.set_start_enabled(true);
        true
    }

    /// Run one evaluation cycle and re-post the next tick while running.
    pub fn tick(
        &mut self,
        host: &mut dyn DocumentHost,
        sink: &mut dyn NotificationSink,
    ) -> TickOutcome {
        if !self.state.running {
            return TickOutcome::Stopped;
        }

        let outcome = self.evaluate(host, sink);
        tracing::trace!(?outcome, "tick");

        if self.state.running {
            self.timer.post(self.cadence);
        }
        outcome
    }

    /// [`tick`](Self::tick), answering any confirmation synchronously through `ui`.
    pub fn run_tick(
        &mut self,
        host: &mut dyn DocumentHost,
        sink: &mut dyn NotificationSink,
        ui: &mut dyn ConfirmationUi,
    ) -> TickOutcome {
        match self.tick(host, sink) {
            TickOutcome::ConfirmationRequested(pending) => {
                let answer = ui.ask_yes_no(CONFIRM_TITLE, CONFIRM_MESSAGE);
                match self.resolve_confirmation(pending, answer, host, sink) {
                    ConfirmationResult::Saved(outcome) => TickOutcome::Saved(outcome),
                    ConfirmationResult::Declined => TickOutcome::Declined,
                    ConfirmationResult::Stale => TickOutcome::Stopped,
                }
            }
            other => other,
        }
    }

    /// Answer an outstanding confirmation.
    pub fn resolve_confirmation(
        &mut self,
        pending: PendingConfirmation,
        answer: Confirmation,
        host: &mut dyn DocumentHost,
        sink: &mut dyn NotificationSink,
    ) -> ConfirmationResult {
        if !self.state.running || pending.generation != self.state.generation {
            tracing::debug!(
                token = pending.generation,
                current = self.state.generation,
                "ignoring confirmation from a previous run"
            );
            return ConfirmationResult::Stale;
        }

        self.state.in_prompt = false;
        if !answer.is_yes() {
            tracing::debug!("autosave declined");
            return ConfirmationResult::Declined;
        }

        let prefs = self.store.load();
        ConfirmationResult::Saved(self.save(host, sink, &prefs))
    }

    fn evaluate(
        &mut self,
        host: &mut dyn DocumentHost,
        sink: &mut dyn NotificationSink,
    ) -> TickOutcome {
        let prefs = self.store.load();

        if prefs.disable_in_playback && host.is_in_playback() {
            return TickOutcome::SuppressedByPlayback;
        }

        let now = self.clock.now();
        let interval = Duration::seconds(prefs.interval_seconds().max(60));
        let last_save = self.state.last_save_time.unwrap_or(now);
        let elapsed = now - last_save;

        if elapsed < interval {
            let remaining = interval - elapsed;
            if remaining <= Duration::seconds(COUNTDOWN_WINDOW_SECS)
                && self.state.countdown_due(now)
            {
                let seconds = remaining.num_seconds();
                sink.show_transient(
                    &format!("Next Autosave in: {}s", seconds),
                    NotificationStyle::Countdown,
                );
                self.state.last_countdown_emit_time = Some(now);
                return TickOutcome::Countdown { seconds };
            }
            return TickOutcome::Waiting { remaining };
        }

        if let Some(last_prompt) = self.state.last_prompt_time {
            if now - last_prompt < Duration::seconds(DEBOUNCE_SECS) {
                return TickOutcome::Debounced;
            }
        }

        // Reserve the slot before saving or prompting.
        self.state.last_prompt_time = Some(now);
        self.state.last_save_time = Some(now);

        if !prefs.prompt_before_save {
            return TickOutcome::Saved(self.save(host, sink, &prefs));
        }

        if self.state.in_prompt {
            tracing::debug!("confirmation already outstanding");
            return TickOutcome::PromptBusy;
        }

        self.state.in_prompt = true;
        TickOutcome::ConfirmationRequested(PendingConfirmation {
            generation: self.state.generation,
        })
    }

    fn save(
        &mut self,
        host: &mut dyn DocumentHost,
        sink: &mut dyn NotificationSink,
        prefs: &Preferences,
    ) -> SaveOutcome {
        let outcome = self.saver.save(host, prefs);
        outcome.notify(sink);
        outcome
    }
}
