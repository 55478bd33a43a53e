//! Batch import: parse, normalize, and append to a stored collection.
//!
//! Normalization runs inside the storage update so `IdPolicy::ContinueCollection`
//! numbers against the same collection the batch is appended to.

use shelfkeep_catalog::{CoercionTable, Record, RecordKind};
use shelfkeep_store::{AppendOutcome, CollectionStore, Storage};

use crate::error::ImportError;
use crate::import_log::{log_import, ImportLogEntry};
use crate::normalize::{IdPolicy, NormalizeStats, Normalizer};
use crate::progress::ImportProgress;
use crate::source::{CoercionFallback, ParseSource, ParsedBatch, SourceFormat};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub id_policy: IdPolicy,
    pub table: CoercionTable,
    /// Forced input format; `None` detects it from the text.
    pub format: Option<SourceFormat>,
    /// Where the text came from, for the import log.
    pub source_label: String,
    /// Record the import under the import-log key.
    pub log_imports: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::default(),
            table: CoercionTable::default(),
            format: None,
            source_label: "input".to_string(),
            log_imports: true,
        }
    }
}

/// What one import did.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub kind: RecordKind,
    pub format: SourceFormat,
    /// Records appended by this import.
    pub added: usize,
    /// Collection length before the import.
    pub existing: usize,
    /// Collection length after the import.
    pub total: usize,
    pub blank_lines_skipped: usize,
    pub coercion_fallbacks: Vec<CoercionFallback>,
    pub defaults_applied: usize,
    pub ids_assigned: usize,
}

/// Import `text`, using `options.format` or detecting JSON vs delimited text.
pub fn import_text<S: Storage>(
    store: &CollectionStore<S>,
    kind: RecordKind,
    text: &str,
    options: &ImportOptions,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportReport, ImportError> {
    let source = match options.format {
        Some(format) => ParseSource::with_format(text, format),
        None => ParseSource::detect(text),
    };
    import_batch(store, kind, &source, options, progress)
}

/// Parse `source` and append the normalized batch to the `kind` collection.
///
/// Parse errors return before storage is touched. The append is a single
/// atomic update: existing records stay first and unchanged, the batch
/// follows in source order. When the result does not fit in storage the
/// normalized batch is returned inside [`ImportError::StorageFull`].
pub fn import_batch<S: Storage>(
    store: &CollectionStore<S>,
    kind: RecordKind,
    source: &ParseSource,
    options: &ImportOptions,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportReport, ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Parsing {} input", source.format()));
    }

    let ParsedBatch {
        records: parsed,
        format,
        blank_lines_skipped,
        coercion_fallbacks,
    } = source.records(&options.table)?;

    if !coercion_fallbacks.is_empty() {
        log::debug!(
            "{} numeric value(s) were not numbers and were set to 0",
            coercion_fallbacks.len()
        );
    }

    let normalizer = Normalizer::new(kind).with_policy(options.id_policy);
    let batch_len = parsed.len();
    let mut normalized: Vec<Record> = Vec::new();
    let mut stats = NormalizeStats::default();

    if let Some(p) = progress {
        p.on_phase(&format!("Adding {} record(s) to {}", batch_len, kind));
    }

    let appended = store.modify(kind, |records| {
        let normalizer = match normalizer.policy() {
            IdPolicy::ContinueCollection => normalizer.clone().continue_after(records),
            IdPolicy::BatchPosition => normalizer.clone(),
        };

        let mut batch = parsed;
        for (i, record) in batch.iter_mut().enumerate() {
            stats += normalizer.normalize_record(record, i + 1);
            if let Some(p) = progress {
                p.on_record(i + 1, batch_len);
            }
        }

        let existing = records.len();
        records.extend(batch.iter().cloned());
        normalized = batch;
        Ok(AppendOutcome {
            existing,
            added: batch_len,
            total: records.len(),
        })
    });

    let outcome = match appended {
        Ok(outcome) => outcome,
        Err(e) if e.is_quota() => {
            log::warn!("{} import did not fit in storage: {}", kind, e);
            return Err(ImportError::StorageFull {
                batch: normalized,
                source: e,
            });
        }
        Err(e) => return Err(e.into()),
    };

    if options.log_imports {
        let entry = ImportLogEntry::new(kind, &options.source_label, format, outcome.added, outcome.total);
        if let Err(e) = log_import(store.storage(), &entry) {
            log::warn!("Could not record import in the import log: {}", e);
        }
    }

    if let Some(p) = progress {
        p.on_complete(&format!(
            "Imported {} {} record(s) ({} total)",
            outcome.added, kind, outcome.total
        ));
    }

    Ok(ImportReport {
        kind,
        format,
        added: outcome.added,
        existing: outcome.existing,
        total: outcome.total,
        blank_lines_skipped,
        coercion_fallbacks,
        defaults_applied: stats.defaults_applied,
        ids_assigned: stats.ids_assigned,
    })
}
