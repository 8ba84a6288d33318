//! SQLite-backed key-value store.
//!
//! Holds the timer snapshot and the stats record in a single `kv` table at
//! `<data dir>/pomotimer.db`.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use super::kv::KvStore;
use crate::error::StorageError;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("pomotimer.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
