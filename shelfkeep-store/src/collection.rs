//! Per-kind collection repository over a [`Storage`] backend.
//!
//! Every mutation is a single `Storage::update`, so concurrent writers of
//! the same backend cannot lose each other's records.

use shelfkeep_catalog::{Record, RecordKind};
use thiserror::Error;

use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Stored collection '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No {kind} record with id '{id}'")]
    NotFound { kind: RecordKind, id: String },
}

impl StoreError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_quota())
    }
}

/// Collection sizes around an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub existing: usize,
    pub added: usize,
    pub total: usize,
}

pub struct CollectionStore<S> {
    storage: S,
}

impl<S: Storage> CollectionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the collection. A key that was never written is empty.
    pub fn load(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        let key = kind.storage_key();
        parse_collection(key, self.storage.read(key)?.as_deref())
    }

    /// Append a batch after the existing records, in batch order.
    pub fn append(&self, kind: RecordKind, batch: &[Record]) -> Result<AppendOutcome, StoreError> {
        self.modify(kind, |records| {
            let existing = records.len();
            records.extend_from_slice(batch);
            Ok(AppendOutcome {
                existing,
                added: batch.len(),
                total: records.len(),
            })
        })
    }

    /// Add one record at the end. Returns the new collection length.
    pub fn add(&self, kind: RecordKind, record: Record) -> Result<usize, StoreError> {
        self.modify(kind, |records| {
            records.push(record);
            Ok(records.len())
        })
    }

    /// Remove the first record whose id matches.
    pub fn remove(&self, kind: RecordKind, id: &str) -> Result<Record, StoreError> {
        self.modify(kind, |records| {
            let idx = position_of(records, kind, id)?;
            Ok(records.remove(idx))
        })
    }

    /// Replace the first record whose id matches, keeping its position.
    pub fn replace(&self, kind: RecordKind, id: &str, record: Record) -> Result<(), StoreError> {
        self.modify(kind, |records| {
            let idx = position_of(records, kind, id)?;
            records[idx] = record;
            Ok(())
        })
    }

    /// Empty the collection. Returns how many records were dropped.
    pub fn clear(&self, kind: RecordKind) -> Result<usize, StoreError> {
        self.modify(kind, |records| {
            let dropped = records.len();
            records.clear();
            Ok(dropped)
        })
    }

    /// Atomic read-modify-write of one collection.
    ///
    /// If `apply` fails, or the stored value is corrupt, nothing is written
    /// and that error is returned as-is.
    pub fn modify<T>(
        &self,
        kind: RecordKind,
        apply: impl FnOnce(&mut Vec<Record>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let key = kind.storage_key();
        let mut apply = Some(apply);
        let mut outcome: Option<Result<T, StoreError>> = None;

        let result = self.storage.update(key, &mut |current: Option<String>| {
            let apply = apply
                .take()
                .ok_or_else(|| StorageError::aborted(key, "update callback ran twice"))?;
            let step = parse_collection(key, current.as_deref()).and_then(|mut records| {
                let value = apply(&mut records)?;
                let serialized = serde_json::to_string(&records)?;
                Ok((value, serialized))
            });
            match step {
                Ok((value, serialized)) => {
                    outcome = Some(Ok(value));
                    Ok(serialized)
                }
                Err(e) => {
                    let reason = e.to_string();
                    outcome = Some(Err(e));
                    Err(StorageError::aborted(key, reason))
                }
            }
        });

        match (result, outcome) {
            (Ok(_), Some(Ok(value))) => Ok(value),
            (Err(_), Some(Err(e))) => Err(e),
            (Err(e), _) => Err(e.into()),
            (Ok(_), _) => Err(StorageError::aborted(key, "update finished without a result").into()),
        }
    }
}

fn position_of(records: &[Record], kind: RecordKind, id: &str) -> Result<usize, StoreError> {
    records
        .iter()
        .position(|r| r.id().as_deref() == Some(id))
        .ok_or_else(|| StoreError::NotFound {
            kind,
            id: id.to_string(),
        })
}

/// Parse a stored collection. Missing or blank documents are empty.
pub fn parse_collection(key: &str, raw: Option<&str>) -> Result<Vec<Record>, StoreError> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}
