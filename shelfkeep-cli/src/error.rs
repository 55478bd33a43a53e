use thiserror::Error;

use shelfkeep_import::ImportError;
use shelfkeep_lib::SettingsError;
use shelfkeep_sheets::{FetchError, WebhookError};
use shelfkeep_store::{StorageError, StoreError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening or writing the storage backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Sync failed: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Bad command-line input that clap cannot check
    #[error("{0}")]
    Usage(String),

    /// Missing configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
