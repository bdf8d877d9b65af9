//! Click dedup and keystroke coalescing.
//!
//! The debouncer sits between locator resolution and the action log. It is
//! a pure state machine over `tokio::time::Instant`: the recorder's event
//! loop feeds it resolved events and polls it when the idle deadline
//! elapses, so the logic tests deterministically without real timers.

use std::time::Duration;
use tokio::time::Instant;

use crate::models::{ActionRecord, Locator};

/// Idle window after the last keystroke before a type action is emitted.
pub const TYPE_IDLE_WINDOW: Duration = Duration::from_millis(600);

#[derive(Debug)]
struct PendingType {
    locator: Locator,
    value: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct ActionDebouncer {
    idle_window: Duration,
    /// Locator of the immediately preceding accepted click. Guards against
    /// propagation artifacts, not legitimate repeat clicks on re-rendered
    /// content: only a click on a different element resets it.
    last_click: Option<Locator>,
    /// At most one in-flight type action; a new keystroke on the same
    /// field replaces value and deadline (reset, not stacking).
    pending: Option<PendingType>,
}

impl ActionDebouncer {
    pub fn new() -> Self {
        Self::with_idle_window(TYPE_IDLE_WINDOW)
    }

    pub fn with_idle_window(idle_window: Duration) -> Self {
        Self {
            idle_window,
            last_click: None,
            pending: None,
        }
    }

    /// Accept a resolved click. Returns the records to append, in order:
    /// a flushed in-flight type action (if any) followed by the click
    /// itself, unless the click duplicates the preceding accepted one.
    pub fn on_click(&mut self, locator: Locator) -> Vec<ActionRecord> {
        let mut out = Vec::new();
        if let Some(flushed) = self.take_pending() {
            out.push(flushed);
        }

        if self.last_click.as_ref() == Some(&locator) {
            return out;
        }

        self.last_click = Some(locator.clone());
        out.push(ActionRecord::click(locator));
        out
    }

    /// Accept a resolved input event carrying the field's current value.
    /// Restarts the idle deadline for that field. Switching fields before
    /// the deadline fires flushes the previous field's type action, which
    /// is returned for appending.
    pub fn on_input(&mut self, locator: Locator, value: String, now: Instant) -> Option<ActionRecord> {
        let deadline = now + self.idle_window;

        if let Some(pending) = self.pending.as_mut() {
            if pending.locator == locator {
                pending.value = value;
                pending.deadline = deadline;
                return None;
            }
        }

        let flushed = self.take_pending();
        self.pending = Some(PendingType {
            locator,
            value,
            deadline,
        });
        flushed
    }

    /// Deadline the event loop should wake at, if a type action is in flight.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Emit the in-flight type action if its idle deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<ActionRecord> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.take_pending()
        } else {
            None
        }
    }

    /// Drain the in-flight type action unconditionally (session stop).
    pub fn flush(&mut self) -> Option<ActionRecord> {
        self.take_pending()
    }

    fn take_pending(&mut self) -> Option<ActionRecord> {
        self.pending
            .take()
            .map(|p| ActionRecord::type_into(p.locator, p.value))
    }
}

impl Default for ActionDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
