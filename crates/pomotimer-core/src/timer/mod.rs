mod engine;
mod mode;

pub use engine::{remaining_secs, Completion, Reconciled, TimerEngine, TimerSnapshot};
pub use mode::{TimerMode, TimerState};
