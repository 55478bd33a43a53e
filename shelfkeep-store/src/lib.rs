//! Persistence for collections.
//!
//! Collections are JSON arrays stored under fixed keys behind the
//! [`Storage`] port. Backends: in-memory, a directory of JSON documents,
//! and a SQLite key-value table. [`CollectionStore`] layers the
//! per-kind repository on top, and `queries` covers list/sort/filter.

pub mod collection;
pub mod file;
pub mod queries;
pub mod schema;
pub mod storage;

pub use collection::{AppendOutcome, CollectionStore, StoreError};
pub use file::FileStorage;
pub use queries::{
    collection_stats, filter_records, sort_records, CollectionStats, RecordFilter, SortOrder,
};
pub use schema::SqliteStorage;
pub use storage::{MemoryStorage, Storage, StorageError, DEFAULT_QUOTA_BYTES};
