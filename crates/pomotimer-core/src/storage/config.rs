//! TOML-based application configuration.
//!
//! Stores the user's timer preferences:
//! - Default duration per mode, as free text (`25m`, `90s`, `1h`)
//! - Whether breaks start on their own after a focus session
//! - How many focus sessions come between long breaks
//! - Whether the timer may be sent to the background
//!
//! Configuration is stored at `<data dir>/config.toml`. Durations are kept
//! as text here and only turned into seconds by
//! [`Preferences::resolve`](crate::Preferences::resolve).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::preferences::{Preferences, DEFAULT_LONG_BREAK_INTERVAL};

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_duration")]
    pub focus_duration: String,
    #[serde(default = "default_short_break")]
    pub short_break_duration: String,
    #[serde(default = "default_long_break")]
    pub long_break_duration: String,
    #[serde(default)]
    pub auto_start_breaks: bool,
    /// Focus sessions per long break. Missing or non-positive means 4.
    #[serde(
        default = "default_long_break_interval",
        skip_serializing_if = "Option::is_none"
    )]
    pub long_break_interval: Option<i64>,
    #[serde(default = "default_true")]
    pub background_mode: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
}

// Default functions
fn default_focus_duration() -> String {
    "25m".into()
}
fn default_short_break() -> String {
    "5m".into()
}
fn default_long_break() -> String {
    "15m".into()
}
fn default_long_break_interval() -> Option<i64> {
    Some(i64::from(DEFAULT_LONG_BREAK_INTERVAL))
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            auto_start_breaks: false,
            long_break_interval: default_long_break_interval(),
            background_mode: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                            .into(),
                    ),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of `config.toml` in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Effective preferences for the next command or check.
    pub fn preferences(&self) -> Preferences {
        Preferences::resolve(&self.timer)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("using default configuration: {e}");
                Self::default()
            }
        }
    }
}
