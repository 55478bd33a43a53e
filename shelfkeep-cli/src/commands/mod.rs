pub(crate) mod config;
pub(crate) mod edit;
pub(crate) mod export;
pub(crate) mod history;
pub(crate) mod import;
pub(crate) mod list;
pub(crate) mod stats;
pub(crate) mod sync;

use shelfkeep_store::{CollectionStore, Storage};

use crate::{AppContext, CliError};

pub(crate) type Store = CollectionStore<Box<dyn Storage>>;

/// Open the configured backend as a collection store.
pub(crate) fn open_store(ctx: &AppContext) -> Result<Store, CliError> {
    let storage = shelfkeep_lib::open_storage(&ctx.settings.storage)?;
    Ok(CollectionStore::new(storage))
}

/// Split a `FIELD=VALUE` argument. The value may be empty or contain `=`.
pub(crate) fn parse_assignment(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim().to_string(), value.to_string())),
        _ => Err(CliError::usage(format!("Expected FIELD=VALUE, got '{arg}'"))),
    }
}

/// Truncate a string to a maximum width in characters, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max).collect()
    }
}
