//! Cumulative focus statistics.
//!
//! The record is only touched when a focus session completes, plus the
//! daily reset applied when it is loaded. Every rule takes the calendar day
//! as an argument so results depend on timestamps alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Lifetime completed focus sessions.
    #[serde(default)]
    pub completed_count: u64,
    #[serde(default)]
    pub total_focus_seconds: u64,
    #[serde(default)]
    pub current_streak: u32,
    /// Completions on `last_completed_date`.
    #[serde(default)]
    pub today_count: u64,
    #[serde(default)]
    pub last_completed_date: Option<NaiveDate>,
}

impl StatsRecord {
    /// Zero `today_count` if the last completion was not on `today`.
    ///
    /// Returns true when the record changed.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_completed_date == Some(today) || self.today_count == 0 {
            return false;
        }
        self.today_count = 0;
        true
    }

    /// Credit one completed focus session of `duration_secs` on `today`.
    pub fn record_completion(&mut self, duration_secs: u64, today: NaiveDate) {
        self.roll_over(today);

        self.completed_count += 1;
        self.total_focus_seconds = self.total_focus_seconds.saturating_add(duration_secs);
        self.today_count += 1;
        self.current_streak = if self.last_completed_date == Some(today) {
            self.current_streak.saturating_add(1)
        } else {
            1
        };
        self.last_completed_date = Some(today);
    }

    /// One point per completed focus minute.
    pub fn xp(&self) -> u64 {
        self.total_focus_seconds / 60
    }

    /// Which break follows the most recent completion.
    pub fn next_break(&self, long_break_interval: u32) -> BreakSuggestion {
        BreakSuggestion::after(self.completed_count, long_break_interval)
    }
}

/// Advisory break type after a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakSuggestion {
    Short,
    Long,
}

impl BreakSuggestion {
    /// Long every `interval` completions, short otherwise.
    pub fn after(completed_count: u64, interval: u32) -> Self {
        let interval = u64::from(interval.max(1));
        if completed_count > 0 && completed_count % interval == 0 {
            BreakSuggestion::Long
        } else {
            BreakSuggestion::Short
        }
    }

    pub fn mode(&self) -> TimerMode {
        match self {
            BreakSuggestion::Short => TimerMode::ShortBreak,
            BreakSuggestion::Long => TimerMode::LongBreak,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BreakSuggestion::Short => "Focus session complete! Time for a short break.",
            BreakSuggestion::Long => "Focus session complete! You've earned a long break.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn first_completion() {
        let mut stats = StatsRecord::default();
        stats.record_completion(1500, day(1));
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.today_count, 1);
        assert_eq!(stats.total_focus_seconds, 1500);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_completed_date, Some(day(1)));
    }

    #[test]
    fn same_day_increments_streak() {
        let mut stats = StatsRecord::default();
        stats.record_completion(1500, day(1));
        stats.record_completion(1500, day(1));
        stats.record_completion(600, day(1));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.today_count, 3);
        assert_eq!(stats.total_focus_seconds, 3600);
    }

    #[test]
    fn different_day_resets_streak_and_today() {
        let mut stats = StatsRecord::default();
        stats.record_completion(1500, day(1));
        stats.record_completion(1500, day(1));
        stats.record_completion(1500, day(3));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.today_count, 1);
        assert_eq!(stats.completed_count, 3);
    }

    #[test]
    fn roll_over_only_clears_today() {
        let mut stats = StatsRecord {
            completed_count: 12,
            total_focus_seconds: 18_000,
            current_streak: 5,
            today_count: 4,
            last_completed_date: Some(day(1)),
        };
        assert!(stats.roll_over(day(2)));
        assert_eq!(stats.today_count, 0);
        assert_eq!(stats.completed_count, 12);
        assert_eq!(stats.current_streak, 5);
        assert_eq!(stats.last_completed_date, Some(day(1)));

        assert!(!stats.roll_over(day(2)));
    }

    #[test]
    fn roll_over_same_day_is_noop() {
        let mut stats = StatsRecord {
            completed_count: 2,
            today_count: 2,
            last_completed_date: Some(day(9)),
            ..StatsRecord::default()
        };
        assert!(!stats.roll_over(day(9)));
        assert_eq!(stats.today_count, 2);
    }

    #[test]
    fn today_never_exceeds_total() {
        let mut stats = StatsRecord::default();
        for d in [1, 1, 2, 2, 2, 5] {
            stats.record_completion(60, day(d));
            assert!(stats.today_count <= stats.completed_count);
        }
    }

    #[test]
    fn long_break_every_interval() {
        let long: Vec<u64> = (1..=12)
            .filter(|n| BreakSuggestion::after(*n, 4) == BreakSuggestion::Long)
            .collect();
        assert_eq!(long, vec![4, 8, 12]);
        assert_eq!(BreakSuggestion::after(0, 4), BreakSuggestion::Short);
    }

    #[test]
    fn interval_of_one_always_long() {
        assert_eq!(BreakSuggestion::after(1, 1), BreakSuggestion::Long);
        assert_eq!(BreakSuggestion::after(7, 1), BreakSuggestion::Long);
    }

    #[test]
    fn xp_is_focus_minutes() {
        let stats = StatsRecord {
            total_focus_seconds: 3_659,
            ..StatsRecord::default()
        };
        assert_eq!(stats.xp(), 60);
    }

    #[test]
    fn missing_fields_default() {
        let stats: StatsRecord = serde_json::from_str(r#"{"completed_count": 3}"#).unwrap();
        assert_eq!(stats.completed_count, 3);
        assert_eq!(stats.current_streak, 0);
        assert!(stats.last_completed_date.is_none());
    }
}
