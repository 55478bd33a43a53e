//! Bulk import of collection records from delimited text or JSON.
//!
//! The pipeline runs in three steps over one batch: the tokenizer splits
//! each line into fields, the materializer zips them with the header row
//! into records, and the normalizer fills defaults and ids before the
//! batch is appended to the stored collection in one atomic update.

pub mod error;
pub mod import_log;
pub mod materialize;
pub mod merge;
pub mod normalize;
pub mod progress;
pub mod source;
pub mod tokenizer;

pub use error::ImportError;
pub use import_log::{load_import_log, log_import, ImportLogEntry, IMPORT_LOG_KEY};
pub use materialize::{materialize_row, HeaderSet, Materialized};
pub use merge::{import_batch, import_text, ImportOptions, ImportReport};
pub use normalize::{IdPolicy, NormalizeStats, Normalizer};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use source::{CoercionFallback, ParseSource, ParsedBatch, SourceFormat};
pub use tokenizer::{split_lines, tokenize_line, DELIMITER};
