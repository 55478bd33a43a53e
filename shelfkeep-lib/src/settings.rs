//! Application settings (`~/.config/shelfkeep/settings.toml`).
//!
//! Every value resolves through the same chain: CLI flag, then environment
//! variable, then the settings file, then the built-in default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelfkeep_import::IdPolicy;
use shelfkeep_store::DEFAULT_QUOTA_BYTES;

use crate::error::SettingsError;

pub const ENV_DATA_DIR: &str = "SHELFKEEP_DATA_DIR";
pub const ENV_BACKEND: &str = "SHELFKEEP_BACKEND";
pub const ENV_WEBHOOK_URL: &str = "SHELFKEEP_WEBHOOK_URL";

// ── Settings types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Which storage backend collections live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON document per collection.
    #[default]
    File,
    /// A single SQLite database.
    Sqlite,
    /// Nothing is persisted; useful for dry runs.
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "sqlite" | "db" => Ok(Self::Sqlite),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}' (expected file, sqlite or memory)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: BackendKind,
    /// Defaults to `dirs::data_dir()/shelfkeep`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Largest stored document in bytes; `0` disables the limit.
    #[serde(default = "default_quota")]
    pub quota_bytes: u64,
}

fn default_quota() -> u64 {
    DEFAULT_QUOTA_BYTES
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl StorageSettings {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn quota(&self) -> Option<u64> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(default)]
    pub id_policy: IdPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            sheet_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SyncSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Keys accepted by [`AppSettings::set_value`].
pub const SETTING_KEYS: &[&str] = &[
    "storage.backend",
    "storage.data_dir",
    "storage.quota_bytes",
    "import.id_policy",
    "sync.webhook_url",
    "sync.sheet_id",
    "sync.timeout_secs",
];

impl AppSettings {
    /// Set one dotted key from its string form. An empty value clears
    /// optional settings and resets the others to their default.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match key {
            "storage.backend" => {
                self.storage.backend = if value.is_empty() {
                    BackendKind::default()
                } else {
                    value
                        .parse()
                        .map_err(|e: String| SettingsError::invalid_value(key, value, e))?
                };
            }
            "storage.data_dir" => self.storage.data_dir = optional(value).map(PathBuf::from),
            "storage.quota_bytes" => {
                self.storage.quota_bytes = if value.is_empty() {
                    DEFAULT_QUOTA_BYTES
                } else {
                    value
                        .parse()
                        .map_err(|_| SettingsError::invalid_value(key, value, "expected a byte count"))?
                };
            }
            "import.id_policy" => {
                self.import.id_policy = if value.is_empty() {
                    IdPolicy::default()
                } else {
                    value
                        .parse()
                        .map_err(|e: String| SettingsError::invalid_value(key, value, e))?
                };
            }
            "sync.webhook_url" => {
                if !value.is_empty() && !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(SettingsError::invalid_value(key, value, "expected an http(s) URL"));
                }
                self.sync.webhook_url = optional(value);
            }
            "sync.sheet_id" => self.sync.sheet_id = optional(value),
            "sync.timeout_secs" => {
                self.sync.timeout_secs = if value.is_empty() {
                    default_timeout_secs()
                } else {
                    value
                        .parse()
                        .map_err(|_| SettingsError::invalid_value(key, value, "expected whole seconds"))?
                };
            }
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Paths ───────────────────────────────────────────────────────────────────

/// Returns `~/.config/shelfkeep/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("shelfkeep").join("settings.toml")
}

/// Returns `~/.local/share/shelfkeep` (or the platform equivalent).
pub fn default_data_dir() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("shelfkeep")
}

// ── Load / save ─────────────────────────────────────────────────────────────

/// Load settings from the default path, returning defaults if missing or corrupt.
pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents, path),
        Err(_) => AppSettings::default(),
    }
}

fn parse_settings(contents: &str, path: &Path) -> AppSettings {
    toml::from_str(contents).unwrap_or_else(|e| {
        log::warn!("Failed to parse settings at {}: {}", path.display(), e);
        AppSettings::default()
    })
}

/// Save settings to the default path. Returns the path written.
pub fn save_settings(settings: &AppSettings) -> Result<PathBuf, SettingsError> {
    let path = settings_path();
    save_settings_to(&path, settings)?;
    Ok(path)
}

/// Save settings atomically (write to temp, then rename).
pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = settings.to_toml_string()?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub webhook_url: Option<String>,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    Cli,
    EnvVar(&'static str),
    ConfigFile,
    Default,
    Missing,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "command line"),
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of the values that can be overridden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingSources {
    pub data_dir: SettingSource,
    pub backend: SettingSource,
    pub webhook_url: SettingSource,
}

/// Load the settings file and apply environment and CLI overrides.
pub fn resolve_settings(cli: &CliOverrides) -> (AppSettings, SettingSources) {
    let path = settings_path();
    let contents = std::fs::read_to_string(&path).ok();
    resolve_from(contents.as_deref(), &path, |var| std::env::var(var).ok(), cli)
}

/// [`resolve_settings`] with the file contents and environment supplied.
pub fn resolve_from(
    file: Option<&str>,
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
    cli: &CliOverrides,
) -> (AppSettings, SettingSources) {
    let mut settings = file.map(|c| parse_settings(c, path)).unwrap_or_default();
    let doc: Option<toml::Value> = file.and_then(|c| c.parse().ok());
    let in_file = |section: &str, key: &str| {
        doc.as_ref()
            .and_then(|d| d.get(section))
            .and_then(|s| s.get(key))
            .is_some()
    };
    let lookup = |var: &str| env(var).filter(|v| !v.trim().is_empty());

    let file_or_default = |present: bool| {
        if present {
            SettingSource::ConfigFile
        } else {
            SettingSource::Default
        }
    };

    // data_dir
    let mut data_dir_source = file_or_default(in_file("storage", "data_dir"));
    if let Some(dir) = lookup(ENV_DATA_DIR) {
        settings.storage.data_dir = Some(PathBuf::from(dir));
        data_dir_source = SettingSource::EnvVar(ENV_DATA_DIR);
    }
    if let Some(dir) = &cli.data_dir {
        settings.storage.data_dir = Some(dir.clone());
        data_dir_source = SettingSource::Cli;
    }

    // backend
    let mut backend_source = file_or_default(in_file("storage", "backend"));
    if let Some(raw) = lookup(ENV_BACKEND) {
        match raw.parse::<BackendKind>() {
            Ok(backend) => {
                settings.storage.backend = backend;
                backend_source = SettingSource::EnvVar(ENV_BACKEND);
            }
            Err(e) => log::warn!("Ignoring ${}: {}", ENV_BACKEND, e),
        }
    }
    if let Some(backend) = cli.backend {
        settings.storage.backend = backend;
        backend_source = SettingSource::Cli;
    }

    // webhook_url
    let mut webhook_source = if in_file("sync", "webhook_url") {
        SettingSource::ConfigFile
    } else {
        SettingSource::Missing
    };
    if let Some(url) = lookup(ENV_WEBHOOK_URL) {
        settings.sync.webhook_url = Some(url);
        webhook_source = SettingSource::EnvVar(ENV_WEBHOOK_URL);
    }
    if let Some(url) = &cli.webhook_url {
        settings.sync.webhook_url = Some(url.clone());
        webhook_source = SettingSource::Cli;
    }

    let sources = SettingSources {
        data_dir: data_dir_source,
        backend: backend_source,
        webhook_url: webhook_source,
    };
    (settings, sources)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
