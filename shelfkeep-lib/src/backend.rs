//! Build the configured storage backend.

use shelfkeep_store::{FileStorage, MemoryStorage, SqliteStorage, Storage, StorageError};

use crate::settings::{BackendKind, StorageSettings};

/// Database file name inside the data directory for the SQLite backend.
pub const SQLITE_FILE_NAME: &str = "shelfkeep.db";

/// Open the backend `settings` describe, creating the data directory if needed.
pub fn open_storage(settings: &StorageSettings) -> Result<Box<dyn Storage>, StorageError> {
    let dir = settings.data_dir();

    let storage: Box<dyn Storage> = match settings.backend {
        BackendKind::File => {
            let storage = FileStorage::new(&dir);
            Box::new(match settings.quota() {
                Some(quota) => storage.with_quota(quota),
                None => storage,
            })
        }
        BackendKind::Sqlite => {
            std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(dir.display().to_string(), e))?;
            let storage = SqliteStorage::open(&dir.join(SQLITE_FILE_NAME))?;
            Box::new(match settings.quota() {
                Some(quota) => storage.with_quota(quota),
                None => storage,
            })
        }
        BackendKind::Memory => {
            let storage = MemoryStorage::new();
            Box::new(match settings.quota() {
                Some(quota) => storage.with_quota(quota),
                None => storage,
            })
        }
    };

    log::debug!("Using {}", storage.describe());
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: BackendKind, dir: &std::path::Path) -> StorageSettings {
        StorageSettings {
            backend,
            data_dir: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn file_backend_writes_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_storage(&settings(BackendKind::File, dir.path())).unwrap();
        storage.write("figureItems", "[]").unwrap();
        assert!(dir.path().join("figureItems.json").exists());
    }

    #[test]
    fn sqlite_backend_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let storage = open_storage(&settings(BackendKind::Sqlite, &nested)).unwrap();
        storage.write("wishlistItems", "[]").unwrap();
        assert!(nested.join(SQLITE_FILE_NAME).exists());
        assert_eq!(storage.read("wishlistItems").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn quota_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = settings(BackendKind::Memory, dir.path());
        s.quota_bytes = 4;
        let storage = open_storage(&s).unwrap();
        assert!(storage.write("k", "12345").unwrap_err().is_quota());

        s.quota_bytes = 0;
        let storage = open_storage(&s).unwrap();
        assert!(storage.write("k", "12345").is_ok());
    }
}
