use pomotimer_core::{Config, RenderModel};

use super::open_session;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = Config::load_or_default().preferences();
    // Loading applies the daily reset before anything is shown.
    let (session, _) = open_session(&prefs, None)?;
    let stats = session.stats();

    if json {
        let output = serde_json::json!({
            "completed_count": stats.completed_count,
            "total_focus_seconds": stats.total_focus_seconds,
            "current_streak": stats.current_streak,
            "today_count": stats.today_count,
            "last_completed_date": stats.last_completed_date,
            "xp": stats.xp(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let model = RenderModel::from_session(&session);
    println!("Completed sessions: {}", model.total_count);
    println!("Today:              {}", model.today_count);
    println!("Current streak:     {}", model.streak);
    println!("Focus time:         {} min", stats.total_focus_seconds / 60);
    println!("XP:                 {}", model.xp);
    Ok(())
}
