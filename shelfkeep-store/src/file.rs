//! Directory-of-JSON-documents backend: `<data_dir>/<key>.json`.
//!
//! Writes go to a temp file that is renamed over the document. `update`
//! serializes writers across processes with a `<key>.lock` file.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use crate::storage::{check_quota, validate_key, Storage, StorageError, UpdateFn};

/// Lock files older than this are assumed to belong to a crashed writer.
const STALE_LOCK_AGE: Duration = Duration::from_secs(30);
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

pub struct FileStorage {
    dir: PathBuf,
    quota: Option<u64>,
    /// Serializes writers inside this process; the lock file covers the rest.
    local: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
            local: Mutex::new(()),
        }
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the JSON document holding `key`.
    pub fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_document(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    fn write_document(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::io(self.dir.display().to_string(), e))?;

        let path = self.document_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StorageError::io(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(path.display().to_string(), e))?;
        Ok(())
    }

    fn acquire_lock(&self, key: &str) -> Result<LockFile, StorageError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::io(self.dir.display().to_string(), e))?;

        let path = self.dir.join(format!("{key}.lock"));
        let started = Instant::now();
        let mut backoff = Duration::from_millis(10);

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(LockFile { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path) {
                        log::warn!("Breaking stale lock {}", path.display());
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(StorageError::LockTimeout(key.to_string()));
                    }
                    std::thread::sleep(backoff);
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(StorageError::io(path.display().to_string(), e)),
            }
        }
    }
}

fn lock_is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > STALE_LOCK_AGE)
}

/// Removes the lock file when dropped.
struct LockFile {
    path: PathBuf,
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        self.read_document(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let _local = self.local.lock().map_err(|_| StorageError::Poisoned)?;
        let _lock = self.acquire_lock(key)?;
        self.write_document(key, value)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, StorageError> {
        validate_key(key)?;
        let _local = self.local.lock().map_err(|_| StorageError::Poisoned)?;
        let _lock = self.acquire_lock(key)?;
        let next = f(self.read_document(key)?)?;
        self.write_document(key, &next)?;
        Ok(next)
    }

    fn describe(&self) -> String {
        format!("JSON files in {}", self.dir.display())
    }
}
