use std::io::Write;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::{Record, RecordKind};

use crate::cli_types::ExportFormat;
use crate::{AppContext, CliError};

use super::open_store;

/// Write a collection to a file or stdout.
pub(crate) fn run_export(
    ctx: &AppContext,
    kind: RecordKind,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let records = store.load(kind)?;

    let bytes = match format {
        ExportFormat::Csv => to_csv(&records)?,
        ExportFormat::Json => {
            let mut json = serde_json::to_vec_pretty(&records).map_err(std::io::Error::other)?;
            json.push(b'\n');
            json
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &bytes)?;
            log::info!(
                "  {} Exported {} {} record(s) to {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                records.len(),
                kind,
                path.display().if_supports_color(Stdout, |t| t.cyan()),
            );
        }
        None => {
            // Bypasses the logger so the output stays pipeable.
            let mut out = std::io::stdout().lock();
            out.write_all(&bytes)?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Columns are every field name in first-seen order across the records.
pub(crate) fn export_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.field_names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

pub(crate) fn to_csv(records: &[Record]) -> Result<Vec<u8>, CliError> {
    let columns = export_columns(records);
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|c| record.get(c).map(|v| v.as_text()).unwrap_or_default()),
        )?;
    }
    writer
        .into_inner()
        .map_err(|e| CliError::Io(std::io::Error::other(e.to_string())))
}
