use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unable to encode value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unable to create store directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Best-effort key/value persistence injected into the results view.
///
/// `load` folds every failure (missing key, unreadable row, bad JSON) into
/// `None`; callers treat that as "nothing saved yet".
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<Value>;
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// SQLite-backed store, one row per key
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at the default state path
    pub fn new() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("cipher_lab.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        log::debug!("[STORE] opened {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let raw = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(raw)
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Option<Value> {
        let raw = match self.load_raw(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("[STORE] load {key} failed: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("[STORE] value under {key} is not valid JSON: {e}");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)?;
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, encoded, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Throwaway store for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
