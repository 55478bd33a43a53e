use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::RecordKind;
use shelfkeep_lib::display::format_price;
use shelfkeep_store::collection_stats;

use crate::{log_blank, AppContext, CliError};

use super::open_store;

/// Show counts and price totals for one collection, or all of them.
pub(crate) fn run_stats(ctx: &AppContext, kind: Option<RecordKind>) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let kinds: Vec<RecordKind> = match kind {
        Some(k) => vec![k],
        None => RecordKind::ALL.to_vec(),
    };

    for (i, kind) in kinds.into_iter().enumerate() {
        if i > 0 {
            log_blank();
        }
        let records = store.load(kind)?;
        let stats = collection_stats(&records);

        log::info!("{}", kind.storage_key().if_supports_color(Stdout, |t| t.bold()));
        log::info!("  Records:      {:>10}", stats.count);
        log::info!("  Priced:       {:>10}", stats.priced);
        log::info!("  Total value:  {:>10}", format_price(stats.total_price));
        if let Some(avg) = stats.average_price() {
            log::info!("  Average:      {:>10}", format_price(avg));
        }

        if !stats.by_shelf.is_empty() {
            log::info!("  By shelf:");
            for (shelf, count) in &stats.by_shelf {
                log::info!(
                    "    {:<20} {:>5}",
                    shelf.if_supports_color(Stdout, |t| t.cyan()),
                    count,
                );
            }
        }
    }

    Ok(())
}
