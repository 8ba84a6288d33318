pub mod config;
pub mod stats;
pub mod timer;
pub mod watch;

use pomotimer_core::error::Result;
use pomotimer_core::{parse_duration, Event, Preferences, SqliteStore, SystemClock, TimerSession};

pub type Session = TimerSession<SqliteStore, SystemClock>;

/// Validated `--duration`, or `None` when absent or unparseable.
pub fn launch_focus_secs(launch: Option<&str>) -> Option<u64> {
    let text = launch?;
    match parse_duration(text) {
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::debug!("ignoring launch duration {text:?}: {e}");
            None
        }
    }
}

/// Open the on-disk store and reconcile the stored timer.
pub fn open_session(
    prefs: &Preferences,
    launch: Option<&str>,
) -> Result<(Session, Vec<Event>)> {
    let store = SqliteStore::open()?;
    Ok(TimerSession::load(store, SystemClock, prefs, launch_focus_secs(launch)))
}

/// One JSON object per line.
pub fn print_events(events: &[Event]) -> Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
