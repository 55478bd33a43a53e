use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelfkeep_lib::display::format_bytes;
use shelfkeep_lib::SettingSource;

use crate::{log_blank, AppContext, CliError};

fn show_field(name: &str, value: Option<String>, source: Option<&SettingSource>) {
    let label = format!("{}:", name);
    let source_str = source.map(|s| format!("({})", s)).unwrap_or_default();
    match value {
        Some(v) => log::info!(
            "  {} {} {}",
            label.if_supports_color(Stdout, |t| t.cyan()),
            v,
            source_str.if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => log::info!(
            "  {} {} {}",
            label.if_supports_color(Stdout, |t| t.cyan()),
            "not set".if_supports_color(Stdout, |t| t.yellow()),
            source_str.if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
}

/// Show resolved settings and where the overridable ones came from.
pub(crate) fn run_config_show(ctx: &AppContext) -> Result<(), CliError> {
    let path = shelfkeep_lib::settings_path();
    let settings = &ctx.settings;
    let sources = &ctx.sources;

    log::info!("{}", "shelfkeep Configuration".if_supports_color(Stdout, |t| t.bold()));
    log_blank();

    let status = if path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found)".if_supports_color(Stdout, |t| t.dimmed()).to_string()
    };
    log::info!(
        "  Config file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status,
    );
    log_blank();

    show_field(
        "storage.backend",
        Some(settings.storage.backend.to_string()),
        Some(&sources.backend),
    );
    show_field(
        "storage.data_dir",
        Some(settings.storage.data_dir().display().to_string()),
        Some(&sources.data_dir),
    );
    show_field(
        "storage.quota_bytes",
        Some(match settings.storage.quota() {
            Some(q) => format_bytes(q),
            None => "unlimited".to_string(),
        }),
        None,
    );
    show_field("import.id_policy", Some(settings.import.id_policy.to_string()), None);
    show_field(
        "sync.webhook_url",
        settings.sync.webhook_url.clone(),
        Some(&sources.webhook_url),
    );
    show_field("sync.sheet_id", settings.sync.sheet_id.clone(), None);
    show_field(
        "sync.timeout_secs",
        Some(settings.sync.timeout_secs.to_string()),
        None,
    );
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", shelfkeep_lib::settings_path().display());
    Ok(())
}

/// Set one key in the settings file. Environment and CLI overrides are not
/// written back.
pub(crate) fn run_config_set(key: &str, value: &str) -> Result<(), CliError> {
    let mut settings = shelfkeep_lib::load_settings();
    settings.set_value(key, value)?;
    let path = shelfkeep_lib::save_settings(&settings)?;

    let shown = if value.is_empty() { "(reset)" } else { value };
    log::info!(
        "{} {} = {} saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key.if_supports_color(Stdout, |t| t.cyan()),
        shown,
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
