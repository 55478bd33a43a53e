//! SQLite key-value backend and its schema.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::storage::{check_quota, validate_key, Storage, StorageError, UpdateFn};

/// Schema version recorded in `schema_version` when the tables are created.
pub const CURRENT_VERSION: i32 = 1;

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One JSON document per storage key
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Create all tables if they don't exist. Idempotent.
pub fn create_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
fn get_schema_version(conn: &Connection) -> Result<i32, StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Storage backed by a single SQLite database file.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    quota: Option<u64>,
    label: String,
}

impl SqliteStorage {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::io(parent.display().to_string(), e))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(10))?;
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota: None,
            label: format!("SQLite database {}", path.display()),
        })
    }

    /// Open an in-memory database with the full schema. Useful for testing.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota: None,
            label: "in-memory SQLite".to_string(),
        })
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> Result<i32, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        get_schema_version(&conn)
    }
}

fn select_value(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn upsert_value(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        select_value(&conn, key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        check_quota(key, value, self.quota)?;
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        upsert_value(&conn, key, value)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, StorageError> {
        validate_key(key)?;
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        // IMMEDIATE takes the write lock up front so other processes wait
        // instead of reading the same snapshot.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let next = f(select_value(&tx, key)?)?;
        check_quota(key, &next, self.quota)?;
        upsert_value(&tx, key, &next)?;
        tx.commit()?;
        Ok(next)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
