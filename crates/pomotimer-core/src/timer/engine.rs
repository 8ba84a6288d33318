//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads or count ticks - every query recomputes the remaining
//! time from the stored start instant, so a gap of any length between checks
//! (sleep, restart, scheduler delay) is handled exactly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle ──start──> Running ──pause──> Paused ──resume──> Running
//!                    │
//!                    └──check (remaining == 0)──> Complete ──start──> Running
//! ```
//!
//! Reset returns to `Idle` from anywhere.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerMode::Focus, 1500, now);
//! engine.start(TimerMode::Focus, 1500, now);
//! // In a loop:
//! engine.tick(clock.now()); // Returns Some(Completion) once
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::mode::{TimerMode, TimerState};
use crate::events::Event;

/// Seconds left in a run of `duration_secs` that began at `start`.
///
/// Elapsed time is floored to whole seconds. A start in the future counts
/// as no time elapsed.
pub fn remaining_secs(duration_secs: u64, start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let elapsed = (now - start).num_seconds().max(0) as u64;
    duration_secs.saturating_sub(elapsed)
}

/// Persisted record of a running or paused timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub state: TimerState,
    pub start_timestamp: DateTime<Utc>,
    pub active_duration_seconds: u64,
    /// Remaining seconds frozen at pause. Records written without it fall
    /// back to recomputing from `start_timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_remaining_seconds: Option<u64>,
}

impl TimerSnapshot {
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match (self.state, self.paused_remaining_seconds) {
            (TimerState::Paused, Some(frozen)) => frozen.min(self.active_duration_seconds),
            _ => remaining_secs(self.active_duration_seconds, self.start_timestamp, now),
        }
    }

    /// Whether this record describes a timer that can be restored at `now`.
    pub fn is_restorable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Paused)
            && self.active_duration_seconds > 0
            && self.start_timestamp <= now
    }
}

/// Emitted once when a run reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub mode: TimerMode,
    pub duration_secs: u64,
    pub at: DateTime<Utc>,
}

/// Result of reconciling a stored snapshot against the current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// Time remains; the engine continues from the stored start instant.
    Restored(TimerEngine),
    /// The run finished while nothing was watching it.
    Expired(TimerMode),
}

/// Core timer engine.
///
/// Operates on wall-clock instants passed in by the caller -- no internal
/// thread, no clock of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    mode: TimerMode,
    state: TimerState,
    start_timestamp: DateTime<Utc>,
    active_duration_secs: u64,
    /// Remaining seconds frozen at pause. Only set while `Paused`.
    paused_remaining_secs: Option<u64>,
}

impl TimerEngine {
    /// Create an idle engine showing `duration_secs` for `mode`.
    pub fn new(mode: TimerMode, duration_secs: u64, now: DateTime<Utc>) -> Self {
        Self {
            mode,
            state: TimerState::Idle,
            start_timestamp: now,
            active_duration_secs: duration_secs,
            paused_remaining_secs: None,
        }
    }

    /// Rebuild an engine from a stored snapshot.
    ///
    /// The start instant is kept as stored so the continuity rule still
    /// holds after restoration. A paused snapshot keeps its frozen remaining
    /// time when it carries one.
    pub fn reconcile(snapshot: &TimerSnapshot, now: DateTime<Utc>) -> Reconciled {
        let remaining = snapshot.remaining_at(now);
        if remaining == 0 {
            return Reconciled::Expired(snapshot.mode);
        }

        let paused_remaining_secs = match snapshot.state {
            TimerState::Paused => Some(remaining),
            _ => None,
        };

        Reconciled::Restored(Self {
            mode: snapshot.mode,
            state: snapshot.state,
            start_timestamp: snapshot.start_timestamp,
            active_duration_secs: snapshot.active_duration_seconds,
            paused_remaining_secs,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_timestamp
    }

    pub fn active_duration_secs(&self) -> u64 {
        self.active_duration_secs
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.state {
            TimerState::Idle => self.active_duration_secs,
            TimerState::Running => remaining_secs(self.active_duration_secs, self.start_timestamp, now),
            TimerState::Paused => self
                .paused_remaining_secs
                .unwrap_or_else(|| remaining_secs(self.active_duration_secs, self.start_timestamp, now)),
            TimerState::Complete => 0,
        }
    }

    /// The record to persist, if a run is in progress.
    pub fn snapshot(&self) -> Option<TimerSnapshot> {
        match self.state {
            TimerState::Running | TimerState::Paused => Some(TimerSnapshot {
                mode: self.mode,
                state: self.state,
                start_timestamp: self.start_timestamp,
                active_duration_seconds: self.active_duration_secs,
                paused_remaining_seconds: self.paused_remaining_secs,
            }),
            TimerState::Idle | TimerState::Complete => None,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run. Ignored while a run is already counting down.
    pub fn start(&mut self, mode: TimerMode, duration_secs: u64, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused | TimerState::Complete => {
                self.mode = mode;
                self.state = TimerState::Running;
                self.start_timestamp = now;
                self.active_duration_secs = duration_secs;
                self.paused_remaining_secs = None;
                Some(Event::TimerStarted {
                    mode,
                    duration_secs,
                    at: now,
                })
            }
            TimerState::Running => None,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                let remaining = self.remaining_secs(now);
                self.state = TimerState::Paused;
                self.paused_remaining_secs = Some(remaining);
                Some(Event::TimerPaused {
                    mode: self.mode,
                    remaining_secs: remaining,
                    at: now,
                })
            }
            _ => None,
        }
    }

    /// Continue a paused run from exactly where it stopped.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                let remaining = self.remaining_secs(now);
                let elapsed = self.active_duration_secs.saturating_sub(remaining);
                self.start_timestamp = now - Duration::seconds(elapsed as i64);
                self.state = TimerState::Running;
                self.paused_remaining_secs = None;
                Some(Event::TimerResumed {
                    mode: self.mode,
                    remaining_secs: remaining,
                    at: now,
                })
            }
            _ => None,
        }
    }

    pub fn reset(&mut self, duration_secs: u64, now: DateTime<Utc>) -> Option<Event> {
        self.state = TimerState::Idle;
        self.start_timestamp = now;
        self.active_duration_secs = duration_secs;
        self.paused_remaining_secs = None;
        Some(Event::TimerReset {
            mode: self.mode,
            duration_secs,
            at: now,
        })
    }

    /// Call periodically. Returns `Some(Completion)` on the check where the
    /// run first reaches zero and `None` on every other call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }
        if remaining_secs(self.active_duration_secs, self.start_timestamp, now) > 0 {
            return None;
        }
        self.state = TimerState::Complete;
        Some(Completion {
            mode: self.mode,
            duration_secs: self.active_duration_secs,
            at: now,
        })
    }
}
