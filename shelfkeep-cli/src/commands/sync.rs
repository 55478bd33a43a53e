use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_catalog::RecordKind;

use crate::spinner::Spinner;
use crate::{AppContext, CliError};

use super::open_store;

/// Push one collection to the configured webhook.
pub(crate) fn run_sync(ctx: &AppContext, kind: RecordKind) -> Result<(), CliError> {
    let url = ctx.settings.sync.webhook_url.clone().ok_or_else(|| {
        CliError::config(
            "No webhook configured. Pass --webhook, set $SHELFKEEP_WEBHOOK_URL, \
             or run 'shelfkeep config set sync.webhook_url <URL>'",
        )
    })?;
    log::debug!("Webhook URL from {}", ctx.sources.webhook_url);

    let store = open_store(ctx)?;
    let records = store.load(kind)?;

    let spinner = Spinner::start(format!("Sending {} {} record(s)", records.len(), kind), ctx.quiet);
    let result = shelfkeep_sheets::push_collection(&url, kind, &records, ctx.settings.sync.timeout());
    spinner.finish();
    let status = result?;

    log::info!(
        "  {} Synced {} {} record(s) to {} (HTTP {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        records.len(),
        kind,
        url.if_supports_color(Stdout, |t| t.cyan()),
        status,
    );
    Ok(())
}
