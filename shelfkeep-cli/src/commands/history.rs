use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_import::load_import_log;

use crate::{AppContext, CliError};

use super::{open_store, truncate_str};

/// Show the most recent imports, newest last.
pub(crate) fn run_history(ctx: &AppContext, limit: usize) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let entries = load_import_log(store.storage())?;

    if entries.is_empty() {
        log::info!("No imports recorded yet.");
        return Ok(());
    }

    let skip = entries.len().saturating_sub(limit);
    log::info!(
        "{}",
        format!("Import history ({} of {})", entries.len() - skip, entries.len())
            .if_supports_color(Stdout, |t| t.bold()),
    );

    for entry in &entries[skip..] {
        let when = entry.imported_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");
        log::info!(
            "  {}  {:<9} {:>4} {:>5} added, {:>5} total  {}",
            when.if_supports_color(Stdout, |t| t.dimmed()),
            entry.kind.as_str(),
            entry.format.as_str(),
            entry.added.if_supports_color(Stdout, |t| t.green()),
            entry.total,
            truncate_str(&entry.source, 60),
        );
    }
    Ok(())
}
