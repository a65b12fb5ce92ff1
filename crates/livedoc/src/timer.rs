//! Single-slot cancelable deadline.
//!
//! The engine never sleeps or spawns. Owners schedule a deadline and the host
//! event loop calls [`DeferredTimer::fire_if_due`] with the current time.
//! Scheduling always cancels whatever was pending.

use std::time::{Duration, Instant};

/// Identifies one scheduling of a [`DeferredTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Default)]
pub struct DeferredTimer {
    generation: u64,
    pending: Option<(TimerHandle, Instant)>,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `now + delay`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.cancel();
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        self.pending = Some((handle, now + delay));
        handle
    }

    /// Disarm. Returns the handle that was pending, if any.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|(handle, _)| handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Disarm and return the handle if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, at)) if now >= at => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}
