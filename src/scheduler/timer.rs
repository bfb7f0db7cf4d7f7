//! Re-posting tick timer.
//!
//! The scheduler never sleeps or spawns threads. It asks a [`TickTimer`] to
//! call it back later; the host decides how (an idle callback, an event-loop
//! timer, or the simple polling loop the CLI runs over [`DeferredTick`]).
//! No pending tick means the tick chain has ended.

use std::time::Duration;

/// A cancellable, single-shot callback request that the scheduler re-arms on every tick.
pub trait TickTimer {
    /// Request one more tick after `delay`. Replaces any pending request.
    fn post(&mut self, delay: Duration);

    /// Drop the pending request, if any.
    fn cancel(&mut self);

    /// Whether a tick is currently requested.
    fn is_pending(&self) -> bool;
}

/// Timer that just remembers the pending request for the host loop to pick up.
#[derive(Debug, Default, Clone)]
pub struct DeferredTick {
    pending: Option<Duration>,
    posted: u64,
}

impl DeferredTick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending request, returning its delay.
    pub fn take(&mut self) -> Option<Duration> {
        self.pending.take()
    }

    /// Total number of requests posted so far.
    pub fn posted(&self) -> u64 {
        self.posted
    }
}

impl TickTimer for DeferredTick {
    fn post(&mut self, delay: Duration) {
        self.pending = Some(delay);
        self.posted += 1;
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
