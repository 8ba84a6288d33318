use clap::Subcommand;
use pomotimer_core::{Config, RenderModel};

use super::{open_session, print_events};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session
    StartFocus,
    /// Start a short break
    StartShortBreak,
    /// Start a long break
    StartLongBreak,
    /// Pause the running timer
    Pause,
    /// Resume a paused timer, or start focusing when idle
    Resume,
    /// Stop the timer and show the full duration of the current mode
    Reset,
    /// Leave the timer running in the background
    Background,
    /// Start a focus session in the background
    StartBackground,
    /// Print the current timer
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TimerAction, launch: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = Config::load_or_default().preferences();
    let (mut session, mut events) = open_session(&prefs, launch)?;
    events.extend(session.tick(&prefs));

    let mut json = false;
    match action {
        TimerAction::StartFocus => events.extend(session.start_focus(&prefs)),
        TimerAction::StartShortBreak => events.extend(session.start_short_break(&prefs)),
        TimerAction::StartLongBreak => events.extend(session.start_long_break(&prefs)),
        TimerAction::Pause => events.extend(session.pause()),
        TimerAction::Resume => events.extend(session.resume(&prefs)),
        TimerAction::Reset => events.extend(session.reset(&prefs)),
        TimerAction::Background => events.extend(session.send_to_background(&prefs)),
        TimerAction::StartBackground => events.extend(session.start_in_background(&prefs)),
        TimerAction::Status { json: as_json } => json = as_json,
    }

    let model = RenderModel::from_session(&session);
    if json {
        let output = serde_json::json!({ "events": events, "timer": model });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_events(&events)?;
        println!("{model}");
    }
    Ok(())
}
