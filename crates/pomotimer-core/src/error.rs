//! Core error types for pomotimer-core.
//!
//! Errors are only surfaced at the edges (opening the store, loading or
//! saving configuration). The timer session itself degrades to defaults
//! instead of failing, so most of these end up in a log line.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Store is locked")]
    Locked,

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Reasons a duration string is rejected.
///
/// Callers treat every variant the same way (fall back to a default); the
/// variants exist so log lines can say why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,

    #[error("unrecognised duration syntax: '{0}'")]
    Syntax(String),

    #[error("duration of {0}s is outside the allowed range")]
    OutOfRange(u64),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
