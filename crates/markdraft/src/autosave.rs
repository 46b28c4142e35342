//! Debounced draft persistence.
//!
//! The debouncer holds at most one pending value. Each new [`Debouncer::schedule`]
//! replaces it and restarts the delay, so a burst of edits produces a single
//! write once the user pauses. Time is passed in by the caller, which keeps
//! the debouncer free of timers and trivially testable.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value; the delay restarts at `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// The pending value, if its delay has fully elapsed at `now`. The value
    /// stays pending until [`Debouncer::cancel`], so a failed write can be
    /// retried.
    pub fn due(&self, now: Instant) -> Option<&T> {
        match &self.pending {
            Some((value, at)) if now.saturating_duration_since(*at) >= self.delay => Some(value),
            _ => None,
        }
    }

    /// Whatever is pending, due or not.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// The autosaved copy of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_id: Option<String>,
}
