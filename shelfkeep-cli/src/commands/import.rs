use std::io::Read;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::{Record, RecordKind};
use shelfkeep_import::{import_text, IdPolicy, ImportError, ImportOptions, ImportReport, LogProgress};

use crate::cli_types::FormatArg;
use crate::spinner::Spinner;
use crate::{AppContext, CliError};

use super::open_store;

/// Import a CSV or JSON file (or stdin) into a collection.
pub(crate) fn run_import(
    ctx: &AppContext,
    kind: RecordKind,
    file: Option<PathBuf>,
    format: FormatArg,
    id_policy: Option<IdPolicy>,
) -> Result<(), CliError> {
    let (text, label) = match file.as_deref() {
        None => read_stdin()?,
        Some(p) if p == Path::new("-") => read_stdin()?,
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|e| CliError::usage(format!("Cannot read {}: {}", p.display(), e)))?;
            (text, p.display().to_string())
        }
    };

    let options = ImportOptions {
        id_policy: id_policy.unwrap_or(ctx.settings.import.id_policy),
        format: format.source_format(),
        source_label: label,
        ..Default::default()
    };
    run_pipeline(ctx, kind, &text, &options)
}

fn read_stdin() -> Result<(String, String), CliError> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok((text, "stdin".to_string()))
}

/// Fetch a published sheet and import it.
pub(crate) fn run_sheet(
    ctx: &AppContext,
    kind: RecordKind,
    source: Option<String>,
    gid: Option<String>,
    id_policy: Option<IdPolicy>,
) -> Result<(), CliError> {
    let source = source.or_else(|| ctx.settings.sync.sheet_id.clone()).ok_or_else(|| {
        CliError::config("No sheet given. Pass a sheet id or URL, or run 'shelfkeep config set sync.sheet_id <ID>'")
    })?;
    let url = shelfkeep_sheets::resolve_source(&source, gid.as_deref())?;

    let spinner = Spinner::start(format!("Fetching {}", url), ctx.quiet);
    let fetched = shelfkeep_sheets::fetch_text(&url, ctx.settings.sync.timeout());
    spinner.finish();
    let text = fetched?;

    log::info!(
        "Fetched {} line(s) from {}",
        text.lines().count(),
        url.if_supports_color(Stdout, |t| t.cyan()),
    );

    let options = ImportOptions {
        id_policy: id_policy.unwrap_or(ctx.settings.import.id_policy),
        source_label: url,
        ..Default::default()
    };
    run_pipeline(ctx, kind, &text, &options)
}

fn run_pipeline(ctx: &AppContext, kind: RecordKind, text: &str, options: &ImportOptions) -> Result<(), CliError> {
    let store = open_store(ctx)?;

    match import_text(&store, kind, text, options, Some(&LogProgress)) {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(ImportError::StorageFull { batch, source }) => {
            log::error!(
                "  {} Storage is full: {} parsed record(s) were not saved",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                batch.len(),
            );
            match save_recovery(ctx, kind, &batch) {
                Ok(path) => log::warn!(
                    "  The batch was written to {}; free space (or raise storage.quota_bytes) and import that file",
                    path.display()
                ),
                Err(e) => log::warn!("  Could not write the batch to a recovery file: {}", e),
            }
            Err(source.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &ImportReport) {
    log::info!(
        "  {} {} {} record(s) added ({} before, {} now)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.added.if_supports_color(Stdout, |t| t.bold()),
        report.kind,
        report.existing,
        report.total,
    );
    if report.ids_assigned > 0 || report.defaults_applied > 0 {
        log::info!(
            "    ids assigned: {}, defaults filled: {}",
            report.ids_assigned,
            report.defaults_applied,
        );
    }
    if report.blank_lines_skipped > 0 {
        log::info!("    blank lines skipped: {}", report.blank_lines_skipped);
    }
    for fallback in &report.coercion_fallbacks {
        log::warn!(
            "  {} line {}: {} '{}' is not a number, stored as 0",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            fallback.line,
            fallback.field,
            fallback.token,
        );
    }
}

/// Write a batch that did not fit in storage next to the data directory.
fn save_recovery(ctx: &AppContext, kind: RecordKind, batch: &[Record]) -> Result<PathBuf, CliError> {
    let dir = ctx.settings.storage.data_dir().join("recovered");
    std::fs::create_dir_all(&dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{}-{}.json", kind, stamp));
    let json = serde_json::to_string_pretty(batch).map_err(std::io::Error::other)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
