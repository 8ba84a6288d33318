use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use pomotimer_core::error::Result;
use pomotimer_core::session::CHECK_INTERVAL_MS;
use pomotimer_core::{Config, Preferences, RenderModel};
use tokio::time::MissedTickBehavior;

use super::{open_session, print_events, Session};

pub fn run(launch: Option<&str>) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(launch))
}

async fn watch(launch: Option<&str>) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut config = PreferencesCache::new(Config::path()?);
    let (mut session, events) = open_session(config.refresh(), launch)?;
    print_events(&events)?;

    let mut interval = tokio::time::interval(Duration::from_millis(CHECK_INTERVAL_MS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = session.tick(config.refresh());
                if !events.is_empty() {
                    println!();
                    print_events(&events)?;
                }
                if !session.needs_checks() {
                    break;
                }
                redraw(&session)?;
            }
            result = &mut ctrl_c => {
                result?;
                tracing::debug!("interrupted, timer left in the store");
                break;
            }
        }
    }

    println!();
    println!("{}", RenderModel::from_session(&session));
    Ok(())
}

fn redraw(session: &Session) -> Result<()> {
    let model = RenderModel::from_session(session);
    let rendered = model.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\r{line}\x1b[K")?;
    stdout.flush()?;
    Ok(())
}

/// Preferences from `config.toml`, re-read only when the file changes.
struct PreferencesCache {
    path: PathBuf,
    modified: Option<SystemTime>,
    prefs: Preferences,
}

impl PreferencesCache {
    fn new(path: PathBuf) -> Self {
        let mut cache = Self {
            path,
            modified: None,
            prefs: Preferences::default(),
        };
        cache.reload();
        cache
    }

    fn refresh(&mut self) -> &Preferences {
        if modified_at(&self.path) != self.modified {
            self.reload();
        }
        &self.prefs
    }

    fn reload(&mut self) {
        self.prefs = match Config::load_from(&self.path) {
            Ok(config) => config.preferences(),
            Err(e) => {
                tracing::warn!("using default configuration: {e}");
                Preferences::default()
            }
        };
        self.modified = modified_at(&self.path);
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
