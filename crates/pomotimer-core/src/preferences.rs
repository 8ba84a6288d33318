//! Effective timer preferences.
//!
//! Configuration stores durations as free text so users can write `25m` or
//! `1h`. [`Preferences::resolve`] turns that into validated seconds, falling
//! back to fixed defaults for anything that does not parse.

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration_or;
use crate::storage::TimerConfig;

pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECS: u64 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECS: u64 = 15 * 60;
pub const DEFAULT_LONG_BREAK_INTERVAL: u32 = 4;

/// Read-only snapshot of the settings in force for one command or check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub auto_start_breaks: bool,
    pub long_break_interval: u32,
    pub background_mode_enabled: bool,
}

impl Preferences {
    pub fn resolve(config: &TimerConfig) -> Self {
        let long_break_interval = match config.long_break_interval {
            Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => DEFAULT_LONG_BREAK_INTERVAL,
        };

        Self {
            focus_secs: parse_duration_or(&config.focus_duration, DEFAULT_FOCUS_SECS),
            short_break_secs: parse_duration_or(&config.short_break_duration, DEFAULT_SHORT_BREAK_SECS),
            long_break_secs: parse_duration_or(&config.long_break_duration, DEFAULT_LONG_BREAK_SECS),
            auto_start_breaks: config.auto_start_breaks,
            long_break_interval,
            background_mode_enabled: config.background_mode,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            short_break_secs: DEFAULT_SHORT_BREAK_SECS,
            long_break_secs: DEFAULT_LONG_BREAK_SECS,
            auto_start_breaks: false,
            long_break_interval: DEFAULT_LONG_BREAK_INTERVAL,
            background_mode_enabled: true,
        }
    }
}
