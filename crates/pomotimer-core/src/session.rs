//! The single timer session.
//!
//! [`TimerSession`] is the one state container for the running timer and
//! the stats record. It owns the store and the clock, and every load or
//! save of persisted state happens here:
//!
//! - [`TimerSession::load`] reads both records and reconciles the snapshot
//!   against the current time before anything is rendered.
//! - Start, pause and resume write the snapshot.
//! - Completion, reset and expiry remove it.
//! - Focus completion and the daily reset write the stats record.
//! - Every check compares the stored snapshot with the last one this
//!   session read or wrote. A difference means another process changed the
//!   timer, and the session reloads from the store.
//!
//! Store failures never reach the caller. Corrupt records are logged and
//! cleared; failed writes are logged and the in-memory state stays
//! authoritative for the rest of the process.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clock::Clock;
use crate::events::Event;
use crate::preferences::Preferences;
use crate::stats::{BreakSuggestion, StatsRecord};
use crate::storage::KvStore;
use crate::timer::{Completion, Reconciled, TimerEngine, TimerMode, TimerSnapshot, TimerState};

/// Store key of the in-progress timer.
pub const SNAPSHOT_KEY: &str = "timer_snapshot";
/// Store key of the cumulative stats.
pub const STATS_KEY: &str = "timer_stats";
/// Delay between a focus completion and an automatic break start.
pub const AUTO_START_DELAY_SECS: i64 = 2;
/// Recommended interval between periodic checks.
pub const CHECK_INTERVAL_MS: u64 = 100;
/// Advisory shown when a break runs out.
pub const BREAK_OVER_MESSAGE: &str = "Break is over. Ready to focus?";

/// A break waiting to start on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAutoStart {
    pub mode: TimerMode,
    pub due: DateTime<Utc>,
}

pub struct TimerSession<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    engine: TimerEngine,
    stats: StatsRecord,
    custom_focus_secs: Option<u64>,
    pending_auto_start: Option<PendingAutoStart>,
    last_suggestion: Option<BreakSuggestion>,
    backgrounded: bool,
    /// Snapshot record as this session last read or wrote it.
    stored_snapshot: Option<TimerSnapshot>,
    /// Stats record as this session last read or wrote it.
    stored_stats: Option<StatsRecord>,
}

impl<S: KvStore, C: Clock> TimerSession<S, C> {
    /// Load persisted state and reconcile it against the current time.
    ///
    /// `custom_focus_secs` is an already validated launch duration. When no
    /// snapshot can be restored it immediately starts a focus session of
    /// that length; it also replaces the focus default for later starts.
    pub fn load(
        store: S,
        clock: C,
        prefs: &Preferences,
        custom_focus_secs: Option<u64>,
    ) -> (Self, Vec<Event>) {
        let focus_secs = TimerMode::Focus.duration_secs(prefs, custom_focus_secs);
        let engine = TimerEngine::new(TimerMode::Focus, focus_secs, clock.now());
        let mut session = Self {
            store,
            clock,
            engine,
            stats: StatsRecord::default(),
            custom_focus_secs,
            pending_auto_start: None,
            last_suggestion: None,
            backgrounded: false,
            stored_snapshot: None,
            stored_stats: None,
        };

        let mut events = session.reload(prefs);
        if custom_focus_secs.is_some() && session.engine.state() == TimerState::Idle {
            events.extend(session.start_focus(prefs));
        }

        (session, events)
    }

    /// Replace all in-memory state with what the store holds now.
    fn reload(&mut self, prefs: &Preferences) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();

        self.load_stats();
        self.pending_auto_start = None;
        self.last_suggestion = None;
        self.backgrounded = false;
        self.stored_snapshot = None;

        let focus_secs = TimerMode::Focus.duration_secs(prefs, self.custom_focus_secs);
        self.engine = TimerEngine::new(TimerMode::Focus, focus_secs, now);

        match read_record::<TimerSnapshot>(&self.store, SNAPSHOT_KEY) {
            Some(snapshot) if snapshot.is_restorable(now) => {
                match TimerEngine::reconcile(&snapshot, now) {
                    Reconciled::Restored(restored) => {
                        tracing::debug!(
                            mode = ?snapshot.mode,
                            state = ?snapshot.state,
                            "restored timer snapshot"
                        );
                        events.push(Event::SessionRestored {
                            mode: restored.mode(),
                            state: restored.state(),
                            remaining_secs: restored.remaining_secs(now),
                            at: now,
                        });
                        self.engine = restored;
                        self.stored_snapshot = Some(snapshot);
                    }
                    Reconciled::Expired(mode) => {
                        // Finished while unobserved: discarded without credit.
                        tracing::debug!(?mode, "stored timer expired before load");
                        self.discard_snapshot(snapshot);
                        events.push(Event::SessionExpired { mode, at: now });
                    }
                }
            }
            Some(snapshot) => {
                tracing::warn!(?snapshot, "discarding unusable timer snapshot");
                self.discard_snapshot(snapshot);
            }
            None => {}
        }

        events
    }

    fn load_stats(&mut self) {
        self.stored_stats = read_record(&self.store, STATS_KEY);
        self.stats = self.stored_stats.clone().unwrap_or_default();
        if self.stats.roll_over(self.clock.today()) {
            tracing::debug!("new calendar day, today_count reset");
            self.save_stats();
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn mode(&self) -> TimerMode {
        self.engine.mode()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.engine.remaining_secs(self.clock.now())
    }

    pub fn pending_auto_start(&self) -> Option<PendingAutoStart> {
        self.pending_auto_start
    }

    /// Break suggested after the most recent focus completion.
    pub fn last_suggestion(&self) -> Option<BreakSuggestion> {
        self.last_suggestion
    }

    pub fn is_backgrounded(&self) -> bool {
        self.backgrounded
    }

    /// Whether the periodic check has anything to do.
    pub fn needs_checks(&self) -> bool {
        !self.backgrounded
            && (self.engine.state() == TimerState::Running || self.pending_auto_start.is_some())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_focus(&mut self, prefs: &Preferences) -> Option<Event> {
        self.start(TimerMode::Focus, prefs)
    }

    pub fn start_short_break(&mut self, prefs: &Preferences) -> Option<Event> {
        self.start(TimerMode::ShortBreak, prefs)
    }

    pub fn start_long_break(&mut self, prefs: &Preferences) -> Option<Event> {
        self.start(TimerMode::LongBreak, prefs)
    }

    pub fn start(&mut self, mode: TimerMode, prefs: &Preferences) -> Option<Event> {
        let duration = mode.duration_secs(prefs, self.custom_focus_secs);
        let event = self.engine.start(mode, duration, self.clock.now())?;
        self.pending_auto_start = None;
        self.backgrounded = false;
        tracing::debug!(?mode, duration, "timer started");
        self.persist_snapshot();
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.engine.pause(self.clock.now())?;
        self.persist_snapshot();
        Some(event)
    }

    /// Resume a paused timer, or start a focus session when there is
    /// nothing to resume.
    pub fn resume(&mut self, prefs: &Preferences) -> Option<Event> {
        match self.engine.state() {
            TimerState::Paused => {
                let event = self.engine.resume(self.clock.now())?;
                self.backgrounded = false;
                self.persist_snapshot();
                Some(event)
            }
            TimerState::Idle | TimerState::Complete => self.start_focus(prefs),
            TimerState::Running => None,
        }
    }

    pub fn reset(&mut self, prefs: &Preferences) -> Option<Event> {
        let duration = self.engine.mode().duration_secs(prefs, self.custom_focus_secs);
        let event = self.engine.reset(duration, self.clock.now());
        self.pending_auto_start = None;
        self.last_suggestion = None;
        self.persist_snapshot();
        event
    }

    /// Hand the timer over to the stored snapshot and stop foreground checks.
    pub fn send_to_background(&mut self, prefs: &Preferences) -> Option<Event> {
        let now = self.clock.now();
        if !prefs.background_mode_enabled {
            return Some(Event::BackgroundDisabled { at: now });
        }
        if !matches!(self.engine.state(), TimerState::Running | TimerState::Paused) {
            return None;
        }
        self.persist_snapshot();
        self.backgrounded = true;
        Some(Event::SentToBackground {
            mode: self.engine.mode(),
            state: self.engine.state(),
            remaining_secs: self.engine.remaining_secs(now),
            at: now,
        })
    }

    /// Start a focus session and send it straight to the background.
    pub fn start_in_background(&mut self, prefs: &Preferences) -> Vec<Event> {
        let mut events: Vec<Event> = self.start_focus(prefs).into_iter().collect();
        events.extend(self.send_to_background(prefs));
        events
    }

    /// The periodic check.
    ///
    /// Picks up a timer changed by another process, recomputes remaining
    /// time from the clock, fires completion side effects on the check where
    /// a run first reaches zero, and starts a pending break once its delay
    /// has passed.
    pub fn tick(&mut self, prefs: &Preferences) -> Vec<Event> {
        let mut events = self.sync_with_store(prefs);
        let now = self.clock.now();

        if let Some(completion) = self.engine.tick(now) {
            events.extend(self.complete(completion, prefs));
        }

        if let Some(pending) = self.pending_auto_start {
            if self.engine.state() == TimerState::Complete && now >= pending.due {
                events.extend(self.start(pending.mode, prefs));
            }
        }

        events
    }

    /// Reload when the stored snapshot is no longer the one this session
    /// last saw. An unreadable store leaves the in-memory state alone.
    fn sync_with_store(&mut self, prefs: &Preferences) -> Vec<Event> {
        let text = match self.store.get(SNAPSHOT_KEY) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to read timer snapshot: {e}");
                return Vec::new();
            }
        };
        let stored = text.and_then(|text| serde_json::from_str::<TimerSnapshot>(&text).ok());
        if stored == self.stored_snapshot {
            return Vec::new();
        }
        tracing::debug!("stored timer changed by another process, reloading");
        self.reload(prefs)
    }

    fn complete(&mut self, completion: Completion, prefs: &Preferences) -> Vec<Event> {
        self.persist_snapshot();

        if completion.mode.is_break() {
            tracing::debug!(mode = ?completion.mode, "break complete");
            return vec![Event::BreakCompleted {
                mode: completion.mode,
                message: BREAK_OVER_MESSAGE.to_string(),
                at: completion.at,
            }];
        }

        self.refresh_stats();
        self.stats
            .record_completion(completion.duration_secs, self.clock.today());
        self.save_stats();

        let suggestion = self.stats.next_break(prefs.long_break_interval);
        self.last_suggestion = Some(suggestion);
        tracing::debug!(
            completed = self.stats.completed_count,
            ?suggestion,
            "focus session complete"
        );

        let mut events = vec![Event::SessionCompleted {
            duration_secs: completion.duration_secs,
            completed_count: self.stats.completed_count,
            suggestion,
            message: suggestion.message().to_string(),
            at: completion.at,
        }];

        if prefs.auto_start_breaks {
            let pending = PendingAutoStart {
                mode: suggestion.mode(),
                due: completion.at + Duration::seconds(AUTO_START_DELAY_SECS),
            };
            self.pending_auto_start = Some(pending);
            events.push(Event::AutoStartScheduled {
                mode: pending.mode,
                due: pending.due,
            });
        }

        events
    }

    /// Adopt a stats record another process wrote since this session last
    /// read or wrote it.
    fn refresh_stats(&mut self) {
        let Some(stored) = read_record::<StatsRecord>(&self.store, STATS_KEY) else {
            return;
        };
        if self.stored_stats.as_ref() != Some(&stored) {
            tracing::debug!("stats changed by another process");
            self.stats = stored.clone();
            self.stored_stats = Some(stored);
        }
    }

    fn save_stats(&mut self) {
        if write_record(&self.store, STATS_KEY, &self.stats) {
            self.stored_stats = Some(self.stats.clone());
        }
    }

    /// Write the engine's snapshot, or remove the record when no run is in
    /// progress.
    fn persist_snapshot(&mut self) {
        let snapshot = self.engine.snapshot();
        let saved = match &snapshot {
            Some(snapshot) => write_record(&self.store, SNAPSHOT_KEY, snapshot),
            None => remove_record(&self.store, SNAPSHOT_KEY),
        };
        if saved {
            self.stored_snapshot = snapshot;
        }
    }

    fn discard_snapshot(&mut self, snapshot: TimerSnapshot) {
        if !remove_record(&self.store, SNAPSHOT_KEY) {
            self.stored_snapshot = Some(snapshot);
        }
    }
}

/// Read and decode a record. Unreadable or malformed values count as absent;
/// malformed ones are also removed from the store.
fn read_record<T: DeserializeOwned>(store: &impl KvStore, key: &str) -> Option<T> {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, "failed to read record: {e}");
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, "discarding corrupt record: {e}");
            remove_record(store, key);
            None
        }
    }
}

/// Returns whether the store accepted the write.
fn write_record<T: Serialize>(store: &impl KvStore, key: &str, value: &T) -> bool {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(key, "failed to encode record: {e}");
            return false;
        }
    };
    match store.set(key, &text) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, "failed to save record: {e}");
            false
        }
    }
}

fn remove_record(store: &impl KvStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, "failed to remove record: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
    }

    fn fresh<'a>(
        store: &'a MemoryStore,
        clock: &'a ManualClock,
    ) -> TimerSession<&'a MemoryStore, &'a ManualClock> {
        TimerSession::load(store, clock, &Preferences::default(), None).0
    }

    /// Accepts reads, refuses every write.
    #[derive(Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KvStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn fresh_load_is_idle_focus() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let (session, events) = TimerSession::load(&store, &clock, &Preferences::default(), None);
        assert!(events.is_empty());
        assert_eq!(session.state(), TimerState::Idle);
        assert_eq!(session.mode(), TimerMode::Focus);
        assert_eq!(session.remaining_secs(), 1500);
        assert_eq!(session.stats(), &StatsRecord::default());
    }

    #[test]
    fn start_writes_snapshot() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);
        session.start_short_break(&Preferences::default());

        let stored: TimerSnapshot =
            serde_json::from_str(&store.get(SNAPSHOT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.mode, TimerMode::ShortBreak);
        assert_eq!(stored.state, TimerState::Running);
        assert_eq!(stored.start_timestamp, t0());
        assert_eq!(stored.active_duration_seconds, 300);
    }

    #[test]
    fn pause_resume_keeps_remaining() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_focus(&prefs);
        clock.advance_secs(400);
        session.tick(&prefs);
        let before_pause = session.remaining_secs();
        session.pause();

        clock.advance_secs(5_000);
        assert_eq!(session.remaining_secs(), before_pause);
        session.resume(&prefs);
        assert_eq!(session.remaining_secs(), before_pause);
        assert_eq!(session.state(), TimerState::Running);
    }

    #[test]
    fn resume_without_snapshot_starts_focus() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        let event = session.resume(&prefs).unwrap();
        assert!(matches!(event, Event::TimerStarted { mode: TimerMode::Focus, .. }));
        assert!(store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn reset_clears_snapshot_and_is_idempotent() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_long_break(&prefs);
        clock.advance_secs(60);
        session.pause();

        session.reset(&prefs);
        let first = (session.state(), session.mode(), session.remaining_secs());
        session.reset(&prefs);
        let second = (session.state(), session.mode(), session.remaining_secs());

        assert_eq!(first, (TimerState::Idle, TimerMode::LongBreak, 900));
        assert_eq!(first, second);
        assert!(!store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn focus_completion_updates_stats_once() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_focus(&prefs);
        let mut completions = 0;
        for _ in 0..20_000 {
            clock.advance_ms(100);
            completions += session
                .tick(&prefs)
                .iter()
                .filter(|e| matches!(e, Event::SessionCompleted { .. }))
                .count();
        }

        assert_eq!(completions, 1);
        assert_eq!(session.stats().completed_count, 1);
        assert_eq!(session.state(), TimerState::Complete);
        assert!(!store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn break_completion_leaves_stats_alone() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_short_break(&prefs);
        clock.advance_secs(301);
        let events = session.tick(&prefs);

        assert!(matches!(events.as_slice(), [Event::BreakCompleted { mode: TimerMode::ShortBreak, .. }]));
        assert_eq!(session.stats(), &StatsRecord::default());
        assert!(!store.contains(STATS_KEY));
        assert!(!store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn auto_start_waits_for_delay() {
        let prefs = Preferences {
            auto_start_breaks: true,
            ..Preferences::default()
        };
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_focus(&prefs);
        clock.advance_secs(1500);
        let events = session.tick(&prefs);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AutoStartScheduled { mode: TimerMode::ShortBreak, .. })));
        assert_eq!(session.state(), TimerState::Complete);
        assert!(session.needs_checks());

        clock.advance_ms(1_900);
        assert!(session.tick(&prefs).is_empty());

        clock.advance_ms(100);
        let events = session.tick(&prefs);
        assert!(matches!(events.as_slice(), [Event::TimerStarted { mode: TimerMode::ShortBreak, duration_secs: 300, .. }]));
        assert_eq!(session.state(), TimerState::Running);
        assert!(session.pending_auto_start().is_none());
    }

    #[test]
    fn manual_start_cancels_auto_start() {
        let prefs = Preferences {
            auto_start_breaks: true,
            ..Preferences::default()
        };
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        session.start_focus(&prefs);
        clock.advance_secs(1500);
        session.tick(&prefs);
        session.start_focus(&prefs);
        clock.advance_secs(3);
        assert!(session.tick(&prefs).is_empty());
        assert_eq!(session.mode(), TimerMode::Focus);
    }

    #[test]
    fn load_restores_running_snapshot() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = fresh(&store, &clock);
            session.start_focus(&prefs);
        }

        clock.advance_secs(600);
        let (session, events) = TimerSession::load(&store, &clock, &prefs, None);
        assert!(matches!(events.as_slice(), [Event::SessionRestored { remaining_secs: 900, .. }]));
        assert_eq!(session.state(), TimerState::Running);
        assert_eq!(session.engine().start_timestamp(), t0());
    }

    #[test]
    fn paused_timer_survives_restart() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = fresh(&store, &clock);
            session.start_focus(&prefs);
            clock.advance_secs(300);
            session.pause();
        }

        clock.advance_secs(7_200);
        let (mut session, _) = TimerSession::load(&store, &clock, &prefs, None);
        assert_eq!(session.state(), TimerState::Paused);
        assert_eq!(session.remaining_secs(), 1200);

        session.resume(&prefs);
        clock.advance_secs(1200);
        let events = session.tick(&prefs);
        assert!(matches!(events.as_slice(), [Event::SessionCompleted { .. }]));
    }

    #[test]
    fn load_discards_expired_snapshot_without_credit() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = fresh(&store, &clock);
            session.start_focus(&prefs);
        }

        clock.advance_secs(1_600);
        let (session, events) = TimerSession::load(&store, &clock, &prefs, None);
        assert!(matches!(events.as_slice(), [Event::SessionExpired { mode: TimerMode::Focus, .. }]));
        assert_eq!(session.state(), TimerState::Idle);
        assert_eq!(session.stats().completed_count, 0);
        assert!(!store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn load_with_custom_duration_starts_focus() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let (session, events) = TimerSession::load(&store, &clock, &prefs, Some(600));
        assert!(matches!(events.as_slice(), [Event::TimerStarted { duration_secs: 600, .. }]));
        assert_eq!(session.state(), TimerState::Running);
        assert_eq!(session.remaining_secs(), 600);
    }

    #[test]
    fn restored_snapshot_wins_over_custom_duration() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = fresh(&store, &clock);
            session.start_long_break(&prefs);
        }
        let (session, _) = TimerSession::load(&store, &clock, &prefs, Some(600));
        assert_eq!(session.mode(), TimerMode::LongBreak);
        assert_eq!(session.remaining_secs(), 900);
    }

    #[test]
    fn corrupt_records_are_cleared() {
        let store = MemoryStore::new();
        store.set(SNAPSHOT_KEY, "{not json").unwrap();
        store.set(STATS_KEY, "garbage").unwrap();
        let clock = ManualClock::new(t0());

        let session = fresh(&store, &clock);
        assert_eq!(session.state(), TimerState::Idle);
        assert_eq!(session.stats(), &StatsRecord::default());
        assert!(!store.contains(SNAPSHOT_KEY));
        assert!(!store.contains(STATS_KEY));
    }

    #[test]
    fn idle_snapshot_is_discarded() {
        let store = MemoryStore::new();
        let snapshot = TimerSnapshot {
            mode: TimerMode::Focus,
            state: TimerState::Idle,
            start_timestamp: t0(),
            active_duration_seconds: 1500,
            paused_remaining_seconds: None,
        };
        store
            .set(SNAPSHOT_KEY, &serde_json::to_string(&snapshot).unwrap())
            .unwrap();
        let clock = ManualClock::new(t0());
        let session = fresh(&store, &clock);
        assert_eq!(session.state(), TimerState::Idle);
        assert!(!store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn load_resets_today_count_on_new_day() {
        let store = MemoryStore::new();
        let stats = StatsRecord {
            completed_count: 9,
            total_focus_seconds: 13_500,
            current_streak: 3,
            today_count: 3,
            last_completed_date: Some(t0().date_naive() - Duration::days(1)),
        };
        store.set(STATS_KEY, &serde_json::to_string(&stats).unwrap()).unwrap();
        let clock = ManualClock::new(t0());

        let session = fresh(&store, &clock);
        assert_eq!(session.stats().today_count, 0);
        assert_eq!(session.stats().completed_count, 9);
        assert_eq!(session.stats().current_streak, 3);

        let saved: StatsRecord =
            serde_json::from_str(&store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.today_count, 0);
    }

    #[test]
    fn write_failures_keep_memory_state() {
        let prefs = Preferences::default();
        let store = ReadOnlyStore::default();
        let clock = ManualClock::new(t0());
        let (mut session, _) = TimerSession::load(&store, &clock, &prefs, None);

        session.start_focus(&prefs);
        clock.advance_secs(1500);
        let events = session.tick(&prefs);

        assert!(matches!(events.first(), Some(Event::SessionCompleted { .. })));
        assert_eq!(session.stats().completed_count, 1);
        assert!(store.inner.get(STATS_KEY).unwrap().is_none());
    }

    #[test]
    fn background_requires_enabled_flag() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);
        let disabled = Preferences {
            background_mode_enabled: false,
            ..Preferences::default()
        };

        let events = session.start_in_background(&disabled);
        assert!(matches!(events.as_slice(), [Event::TimerStarted { .. }, Event::BackgroundDisabled { .. }]));
        assert!(!session.is_backgrounded());
        assert!(session.needs_checks());
    }

    #[test]
    fn send_to_background_stops_checks() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = fresh(&store, &clock);

        assert!(session.send_to_background(&prefs).is_none());

        session.start_focus(&prefs);
        clock.advance_secs(100);
        let event = session.send_to_background(&prefs).unwrap();
        assert!(matches!(event, Event::SentToBackground { remaining_secs: 1400, .. }));
        assert!(session.is_backgrounded());
        assert!(!session.needs_checks());
        assert!(store.contains(SNAPSHOT_KEY));
    }

    #[test]
    fn check_picks_up_reset_from_another_session() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut watcher = fresh(&store, &clock);
        watcher.start_focus(&prefs);

        clock.advance_secs(60);
        let (mut other, _) = TimerSession::load(&store, &clock, &prefs, None);
        other.reset(&prefs);

        clock.advance_secs(1500);
        let events = watcher.tick(&prefs);
        assert!(events.is_empty());
        assert_eq!(watcher.state(), TimerState::Idle);
        assert_eq!(watcher.stats().completed_count, 0);
        assert!(!watcher.needs_checks());
        assert!(!store.contains(STATS_KEY));
    }

    #[test]
    fn check_picks_up_restart_from_another_session() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut watcher = fresh(&store, &clock);
        watcher.start_focus(&prefs);

        clock.advance_secs(120);
        let (mut other, _) = TimerSession::load(&store, &clock, &prefs, None);
        other.reset(&prefs);
        other.start_short_break(&prefs);

        let events = watcher.tick(&prefs);
        assert!(matches!(
            events.as_slice(),
            [Event::SessionRestored { mode: TimerMode::ShortBreak, remaining_secs: 300, .. }]
        ));
        assert_eq!(watcher.engine().start_timestamp(), t0() + Duration::seconds(120));
        assert!(watcher.tick(&prefs).is_empty());
    }

    #[test]
    fn completion_counts_on_top_of_stats_saved_elsewhere() {
        let prefs = Preferences::default();
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut first = fresh(&store, &clock);
        let mut second = fresh(&store, &clock);

        first.start_focus(&prefs);
        clock.advance_secs(1500);
        first.tick(&prefs);

        second.start_focus(&prefs);
        clock.advance_secs(1500);
        second.tick(&prefs);

        assert_eq!(second.stats().completed_count, 2);
        assert_eq!(second.stats().current_streak, 2);
        let saved: StatsRecord =
            serde_json::from_str(&store.get(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.completed_count, 2);
    }
}
