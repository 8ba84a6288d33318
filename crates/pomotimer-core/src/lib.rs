//! # Pomotimer Core Library
//!
//! This library provides the core logic for the pomotimer focus timer: a
//! single persisted countdown with focus, short-break and long-break modes,
//! and the productivity statistics derived from completed focus sessions.
//! The CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine. Remaining time is
//!   always recomputed from the stored start instant; the caller invokes
//!   `tick()` periodically to detect completion.
//! - **Session**: The single state container tying the engine, the stats
//!   record, a key-value store and a clock together, including load-time
//!   reconciliation of a stored timer.
//! - **Storage**: SQLite-backed key-value store and TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerSession`]: Persisted session with completion bookkeeping
//! - [`StatsRecord`]: Streaks, totals and daily counters
//! - [`Config`] / [`Preferences`]: Configuration and its resolved form
//! - [`parse_duration`]: Human duration strings to seconds

pub mod clock;
pub mod duration;
pub mod error;
pub mod events;
pub mod preferences;
pub mod render;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_clock, parse_duration};
pub use error::{ConfigError, CoreError, DurationError, StorageError};
pub use events::Event;
pub use preferences::Preferences;
pub use render::RenderModel;
pub use session::TimerSession;
pub use stats::{BreakSuggestion, StatsRecord};
pub use storage::{Config, KvStore, MemoryStore, SqliteStore, TimerConfig};
pub use timer::{TimerEngine, TimerMode, TimerSnapshot, TimerState};
