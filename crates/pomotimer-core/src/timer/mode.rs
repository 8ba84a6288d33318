use serde::{Deserialize, Serialize};

use crate::preferences::Preferences;

/// Which kind of interval the timer is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    /// Duration for this mode. `custom_focus_secs` only applies to Focus.
    pub fn duration_secs(&self, prefs: &Preferences, custom_focus_secs: Option<u64>) -> u64 {
        match self {
            TimerMode::Focus => custom_focus_secs.unwrap_or(prefs.focus_secs),
            TimerMode::ShortBreak => prefs.short_break_secs,
            TimerMode::LongBreak => prefs.long_break_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Complete,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Idle => "Ready",
            TimerState::Running => "Running",
            TimerState::Paused => "Paused",
            TimerState::Complete => "Complete",
        }
    }
}
