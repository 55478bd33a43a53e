//! History of completed imports, kept under its own storage key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfkeep_catalog::RecordKind;
use shelfkeep_store::{Storage, StorageError, StoreError};

use crate::source::SourceFormat;

pub const IMPORT_LOG_KEY: &str = "importLog";

/// Oldest entries are dropped past this many.
pub const MAX_LOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLogEntry {
    pub kind: RecordKind,
    /// File path, sheet URL or `"stdin"`.
    pub source: String,
    pub format: SourceFormat,
    pub added: usize,
    /// Collection length after the import.
    pub total: usize,
    pub imported_at: DateTime<Utc>,
}

impl ImportLogEntry {
    pub fn new(kind: RecordKind, source: impl Into<String>, format: SourceFormat, added: usize, total: usize) -> Self {
        Self {
            kind,
            source: source.into(),
            format,
            added,
            total,
            imported_at: Utc::now(),
        }
    }
}

/// Append one entry to the import log.
pub fn log_import<S: Storage + ?Sized>(storage: &S, entry: &ImportLogEntry) -> Result<(), StoreError> {
    let mut outcome: Result<(), StoreError> = Ok(());
    let result = storage.update(IMPORT_LOG_KEY, &mut |current: Option<String>| {
        let mut entries = match parse_log(current.as_deref()) {
            Ok(entries) => entries,
            Err(e) => {
                let reason = e.to_string();
                outcome = Err(e);
                return Err(StorageError::aborted(IMPORT_LOG_KEY, reason));
            }
        };
        entries.push(entry.clone());
        if entries.len() > MAX_LOG_ENTRIES {
            let excess = entries.len() - MAX_LOG_ENTRIES;
            entries.drain(..excess);
        }
        serde_json::to_string(&entries).map_err(|e| StorageError::aborted(IMPORT_LOG_KEY, e.to_string()))
    });

    match result {
        Ok(_) => Ok(()),
        Err(e) => outcome.and(Err(e.into())),
    }
}

/// All logged imports, oldest first.
pub fn load_import_log<S: Storage + ?Sized>(storage: &S) -> Result<Vec<ImportLogEntry>, StoreError> {
    parse_log(storage.read(IMPORT_LOG_KEY)?.as_deref())
}

fn parse_log(raw: Option<&str>) -> Result<Vec<ImportLogEntry>, StoreError> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(|e| StoreError::Corrupt {
            key: IMPORT_LOG_KEY.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_camel_case() {
        let entry = ImportLogEntry::new(RecordKind::Wishlist, "stdin", SourceFormat::Json, 3, 10);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "wishlist");
        assert_eq!(json["format"], "json");
        assert!(json["importedAt"].is_string());
    }
}
