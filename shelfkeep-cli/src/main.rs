//! shelfkeep CLI
//!
//! Command-line interface for tracking a figure collection, a wishlist and
//! custom pieces, with bulk import from CSV, JSON and published sheets.

mod cli_types;
mod commands;
mod error;
mod logging;
mod spinner;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use shelfkeep_lib::{AppSettings, CliOverrides, SettingSources};

pub(crate) use error::CliError;

/// Resolved settings plus the global flags every command may need.
pub(crate) struct AppContext {
    pub settings: AppSettings,
    pub sources: SettingSources,
    pub quiet: bool,
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to open log file: {}", e);
        std::process::exit(1);
    }

    let overrides = CliOverrides {
        data_dir: cli.data_dir.clone(),
        backend: cli.backend,
        webhook_url: match &cli.command {
            Commands::Sync { webhook, .. } => webhook.clone(),
            _ => None,
        },
    };
    let (settings, sources) = shelfkeep_lib::resolve_settings(&overrides);
    let ctx = AppContext {
        settings,
        sources,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Import {
            kind,
            file,
            format,
            id_policy,
        } => commands::import::run_import(&ctx, kind, file, format, id_policy),
        Commands::Sheet {
            kind,
            source,
            gid,
            id_policy,
        } => commands::import::run_sheet(&ctx, kind, source, gid, id_policy),
        Commands::List {
            kind,
            sort,
            desc,
            search,
            filters,
            full,
        } => commands::list::run_list(&ctx, kind, sort, desc, search, filters, full),
        Commands::Stats { kind } => commands::stats::run_stats(&ctx, kind),
        Commands::Add { kind, fields } => commands::edit::run_add(&ctx, kind, fields),
        Commands::Remove { kind, id } => commands::edit::run_remove(&ctx, kind, &id),
        Commands::Export {
            kind,
            output,
            format,
        } => commands::export::run_export(&ctx, kind, output, format),
        Commands::Sync { kind, .. } => commands::sync::run_sync(&ctx, kind),
        Commands::History { limit } => commands::history::run_history(&ctx, limit),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Set { key, value } => commands::config::run_config_set(&key, &value),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
