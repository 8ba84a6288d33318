//! Display model derived from the current session.
//!
//! Nothing here mutates state; a front end builds a [`RenderModel`] after
//! each check or command and draws it however it likes.

use std::fmt;

use serde::Serialize;

use crate::clock::Clock;
use crate::duration::format_clock;
use crate::session::{TimerSession, BREAK_OVER_MESSAGE};
use crate::storage::KvStore;
use crate::timer::{TimerMode, TimerState};

/// Number of segments in the progress bar.
pub const PROGRESS_SEGMENTS: usize = 20;

const FILLED: char = '\u{2588}';
const EMPTY: char = '\u{2591}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    pub mode: TimerMode,
    pub mode_label: String,
    pub state: TimerState,
    pub status_label: String,
    pub remaining_secs: u64,
    /// Remaining time as `M:SS`.
    pub remaining: String,
    pub progress_bar: String,
    pub percent: u8,
    pub today_count: u64,
    pub total_count: u64,
    pub streak: u32,
    pub xp: u64,
    /// Advisory line, e.g. which break to take next.
    pub message: Option<String>,
}

impl RenderModel {
    pub fn from_session<S: KvStore, C: Clock>(session: &TimerSession<S, C>) -> Self {
        let now = session.now();
        let engine = session.engine();
        let stats = session.stats();

        let remaining_secs = engine.remaining_secs(now);
        let percent = percent_complete(engine.active_duration_secs(), remaining_secs);

        let message = match engine.state() {
            TimerState::Complete if engine.mode().is_break() => Some(BREAK_OVER_MESSAGE.to_string()),
            TimerState::Complete => session.last_suggestion().map(|s| s.message().to_string()),
            _ => None,
        };

        Self {
            mode: engine.mode(),
            mode_label: engine.mode().label().to_string(),
            state: engine.state(),
            status_label: engine.state().label().to_string(),
            remaining_secs,
            remaining: format_clock(remaining_secs),
            progress_bar: progress_bar(percent),
            percent,
            today_count: stats.today_count,
            total_count: stats.completed_count,
            streak: stats.current_streak,
            xp: stats.xp(),
            message,
        }
    }
}

impl fmt::Display for RenderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {}% {} | today {} · total {} · streak {} · {} XP",
            self.mode_label,
            self.remaining,
            self.progress_bar,
            self.percent,
            self.status_label,
            self.today_count,
            self.total_count,
            self.streak,
            self.xp,
        )?;
        if let Some(message) = &self.message {
            write!(f, "\n{message}")?;
        }
        Ok(())
    }
}

/// Whole percent of `duration_secs` already elapsed.
pub fn percent_complete(duration_secs: u64, remaining_secs: u64) -> u8 {
    if duration_secs == 0 {
        return 0;
    }
    let elapsed = duration_secs.saturating_sub(remaining_secs);
    ((elapsed * 100) / duration_secs).min(100) as u8
}

/// Bar of [`PROGRESS_SEGMENTS`] cells filled in proportion to `percent`.
pub fn progress_bar(percent: u8) -> String {
    let filled = (PROGRESS_SEGMENTS * usize::from(percent.min(100))) / 100;
    let mut bar = String::with_capacity(PROGRESS_SEGMENTS * 3);
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(PROGRESS_SEGMENTS - filled));
    bar
}
