//! Shared application plumbing: settings, backend selection, display helpers.

pub mod backend;
pub mod display;
pub mod error;
pub mod settings;

pub use backend::{open_storage, SQLITE_FILE_NAME};
pub use error::SettingsError;
pub use settings::{
    default_data_dir, load_settings, load_settings_from, resolve_settings, save_settings, save_settings_to,
    settings_path, AppSettings, BackendKind, CliOverrides, ImportSettings, SettingSource, SettingSources,
    StorageSettings, SyncSettings, SETTING_KEYS,
};
