//! The storage port and the in-memory backend.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Browser localStorage budget, used as the default quota.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage quota exceeded for '{key}': {size} bytes exceeds the {quota}-byte limit")]
    QuotaExceeded { key: String, size: u64, quota: u64 },
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("Timed out waiting for the lock on '{0}'")]
    LockTimeout(String),
    #[error("Storage lock poisoned")]
    Poisoned,
    #[error("Update of '{key}' aborted: {reason}")]
    Aborted { key: String, reason: String },
}

impl StorageError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn aborted(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Aborted {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Function applied by [`Storage::update`]: current value in, new value out.
pub type UpdateFn<'a> = dyn FnMut(Option<String>) -> Result<String, StorageError> + 'a;

/// A persisted key → document store.
///
/// `update` is the only safe way to read-modify-write a key: the backend
/// guarantees no other writer of the same backend interleaves between the
/// read and the write. If `f` fails, nothing is written.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, StorageError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, StorageError> {
        (**self).update(key, f)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Reject a value that would not fit in the configured quota.
pub(crate) fn check_quota(key: &str, value: &str, quota: Option<u64>) -> Result<(), StorageError> {
    let size = value.len() as u64;
    match quota {
        Some(quota) if size > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size,
            quota,
        }),
        _ => Ok(()),
    }
}

/// Keys become file names and table keys, so keep them boring.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ── Memory ──────────────────────────────────────────────────────────────────

/// Process-local storage. Used by tests and `--backend memory` dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota = Some(quota_bytes);
        self
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        check_quota(key, value, self.quota)?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, StorageError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        let next = f(entries.get(key).cloned())?;
        check_quota(key, &next, self.quota)?;
        entries.insert(key.to_string(), next.clone());
        Ok(next)
    }

    fn describe(&self) -> String {
        "in-memory storage".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_validated() {
        assert!(validate_key("figureItems").is_ok());
        assert!(validate_key("import-log_2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
    }

    #[test]
    fn quota_applies_to_value_length() {
        assert!(check_quota("k", "abcd", Some(4)).is_ok());
        let err = check_quota("k", "abcde", Some(4)).unwrap_err();
        assert!(err.is_quota());
        assert!(check_quota("k", "abcde", None).is_ok());
    }
}
