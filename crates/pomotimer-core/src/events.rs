use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::BreakSuggestion;
use crate::timer::{TimerMode, TimerState};

/// Every state change in the system produces an Event.
/// The CLI prints them; a front end can use them for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A focus session ran to zero and was credited.
    SessionCompleted {
        duration_secs: u64,
        completed_count: u64,
        suggestion: BreakSuggestion,
        message: String,
        at: DateTime<Utc>,
    },
    /// A break ran to zero. No statistics change.
    BreakCompleted {
        mode: TimerMode,
        message: String,
        at: DateTime<Utc>,
    },
    /// A stored timer was picked up again at load.
    SessionRestored {
        mode: TimerMode,
        state: TimerState,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A stored timer had already run out by load time and was discarded.
    SessionExpired {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// A break will start on its own once `due` passes.
    AutoStartScheduled {
        mode: TimerMode,
        due: DateTime<Utc>,
    },
    /// The foreground check loop stops; the stored snapshot carries on.
    SentToBackground {
        mode: TimerMode,
        state: TimerState,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    BackgroundDisabled {
        at: DateTime<Utc>,
    },
}
