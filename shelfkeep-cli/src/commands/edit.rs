use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::{CoercionTable, Record, RecordKind};
use shelfkeep_import::{IdPolicy, Normalizer};
use shelfkeep_store::StoreError;

use crate::{AppContext, CliError};

use super::{open_store, parse_assignment};

/// Build a record from `FIELD=VALUE` pairs with the import coercion rules.
pub(crate) fn build_record(fields: &[String], table: &CoercionTable) -> Result<Record, CliError> {
    let mut record = Record::new();
    for arg in fields {
        let (field, value) = parse_assignment(arg)?;
        let coerced = table.coerce(&field, &value);
        if coerced.fell_back {
            log::warn!(
                "  {} {} '{}' is not a number, stored as 0",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
                field,
                value,
            );
        }
        record.set(field, coerced.value);
    }
    Ok(record)
}

/// Add one record, filling defaults and an id the same way an import does.
pub(crate) fn run_add(ctx: &AppContext, kind: RecordKind, fields: Vec<String>) -> Result<(), CliError> {
    let mut record = build_record(&fields, &CoercionTable::default())?;
    let store = open_store(ctx)?;
    let policy = ctx.settings.import.id_policy;

    let (id, total) = store.modify(kind, |records| {
        normalize_added(kind, policy, records, &mut record);
        let id = record.id().unwrap_or_default();
        records.push(record);
        Ok((id, records.len()))
    })?;

    log::info!(
        "  {} Added {} record {} ({} total)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        kind,
        id.if_supports_color(Stdout, |t| t.bold()),
        total,
    );
    Ok(())
}

/// Normalize a record about to be appended to `existing`, as a one-record
/// batch placed after it.
pub(crate) fn normalize_added(kind: RecordKind, policy: IdPolicy, existing: &[Record], record: &mut Record) {
    let normalizer = Normalizer::new(kind).with_policy(policy);
    match policy {
        IdPolicy::BatchPosition => normalizer.normalize_record(record, existing.len() + 1),
        IdPolicy::ContinueCollection => normalizer.continue_after(existing).normalize_record(record, 1),
    };
}

/// Remove the first record with `id`.
pub(crate) fn run_remove(ctx: &AppContext, kind: RecordKind, id: &str) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    match store.remove(kind, id) {
        Ok(record) => {
            let name = record.text("name").unwrap_or("(unnamed)");
            log::info!(
                "  {} Removed {} record {} {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                kind,
                id.if_supports_color(Stdout, |t| t.bold()),
                name,
            );
            Ok(())
        }
        Err(StoreError::NotFound { kind, id }) => Err(CliError::usage(format!(
            "No {kind} record with id '{id}'. Run 'shelfkeep list {kind}' to see the ids."
        ))),
        Err(e) => Err(e.into()),
    }
}
