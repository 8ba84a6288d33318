mod config;
pub mod database;
pub mod kv;

pub use config::{Config, TimerConfig};
pub use database::SqliteStore;
pub use kv::{KvStore, MemoryStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding the database and `config.toml`.
///
/// `POMOTIMER_DATA_DIR` wins when set. Otherwise `~/.config/pomotimer[-dev]/`
/// based on `POMOTIMER_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOTIMER_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomotimer-dev")
            } else {
                base_dir.join("pomotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
