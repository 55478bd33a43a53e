use super::*;

fn no_env(_: &str) -> Option<String> {
    None
}

fn path() -> PathBuf {
    PathBuf::from("settings.toml")
}

// -- Parsing --

#[test]
fn empty_file_is_all_defaults() {
    let (settings, sources) = resolve_from(Some(""), &path(), no_env, &CliOverrides::default());
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.storage.backend, BackendKind::File);
    assert_eq!(settings.storage.quota_bytes, DEFAULT_QUOTA_BYTES);
    assert_eq!(settings.sync.timeout_secs, 30);
    assert_eq!(sources.backend, SettingSource::Default);
    assert_eq!(sources.webhook_url, SettingSource::Missing);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let toml = r#"
[storage]
backend = "sqlite"

[import]
id_policy = "continue"
"#;
    let (settings, sources) = resolve_from(Some(toml), &path(), no_env, &CliOverrides::default());
    assert_eq!(settings.storage.backend, BackendKind::Sqlite);
    assert_eq!(settings.storage.quota_bytes, DEFAULT_QUOTA_BYTES);
    assert_eq!(settings.import.id_policy, IdPolicy::ContinueCollection);
    assert_eq!(sources.backend, SettingSource::ConfigFile);
    assert_eq!(sources.data_dir, SettingSource::Default);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let (settings, _) = resolve_from(Some("[storage\nbackend ="), &path(), no_env, &CliOverrides::default());
    assert_eq!(settings, AppSettings::default());
}

// -- Priority chain --

#[test]
fn env_beats_file() {
    let toml = "[storage]\ndata_dir = \"/from/file\"\n[sync]\nwebhook_url = \"https://file.example\"\n";
    let env = |var: &str| match var {
        ENV_DATA_DIR => Some("/from/env".to_string()),
        ENV_WEBHOOK_URL => Some("https://env.example".to_string()),
        _ => None,
    };
    let (settings, sources) = resolve_from(Some(toml), &path(), env, &CliOverrides::default());
    assert_eq!(settings.storage.data_dir(), PathBuf::from("/from/env"));
    assert_eq!(settings.sync.webhook_url.as_deref(), Some("https://env.example"));
    assert_eq!(sources.data_dir, SettingSource::EnvVar(ENV_DATA_DIR));
    assert_eq!(sources.webhook_url, SettingSource::EnvVar(ENV_WEBHOOK_URL));
}

#[test]
fn cli_beats_env() {
    let env = |var: &str| match var {
        ENV_BACKEND => Some("sqlite".to_string()),
        ENV_DATA_DIR => Some("/from/env".to_string()),
        _ => None,
    };
    let cli = CliOverrides {
        data_dir: Some(PathBuf::from("/from/cli")),
        backend: Some(BackendKind::Memory),
        webhook_url: None,
    };
    let (settings, sources) = resolve_from(None, &path(), env, &cli);
    assert_eq!(settings.storage.backend, BackendKind::Memory);
    assert_eq!(settings.storage.data_dir(), PathBuf::from("/from/cli"));
    assert_eq!(sources.backend, SettingSource::Cli);
    assert_eq!(sources.data_dir, SettingSource::Cli);
}

#[test]
fn blank_or_invalid_env_is_ignored() {
    let env = |var: &str| match var {
        ENV_BACKEND => Some("floppy".to_string()),
        ENV_DATA_DIR => Some("  ".to_string()),
        _ => None,
    };
    let (settings, sources) = resolve_from(None, &path(), env, &CliOverrides::default());
    assert_eq!(settings.storage.backend, BackendKind::File);
    assert_eq!(settings.storage.data_dir, None);
    assert_eq!(sources.backend, SettingSource::Default);
}

// -- set_value --

#[test]
fn set_value_updates_each_key() {
    let mut settings = AppSettings::default();
    settings.set_value("storage.backend", "sqlite").unwrap();
    settings.set_value("storage.data_dir", "/srv/shelf").unwrap();
    settings.set_value("storage.quota_bytes", "1024").unwrap();
    settings.set_value("import.id_policy", "continue").unwrap();
    settings.set_value("sync.webhook_url", "https://hooks.example/abc").unwrap();
    settings.set_value("sync.sheet_id", "1abc").unwrap();
    settings.set_value("sync.timeout_secs", "5").unwrap();

    assert_eq!(settings.storage.backend, BackendKind::Sqlite);
    assert_eq!(settings.storage.data_dir, Some(PathBuf::from("/srv/shelf")));
    assert_eq!(settings.storage.quota(), Some(1024));
    assert_eq!(settings.import.id_policy, IdPolicy::ContinueCollection);
    assert_eq!(settings.sync.webhook_url.as_deref(), Some("https://hooks.example/abc"));
    assert_eq!(settings.sync.sheet_id.as_deref(), Some("1abc"));
    assert_eq!(settings.sync.timeout(), Duration::from_secs(5));
}

#[test]
fn set_value_empty_clears() {
    let mut settings = AppSettings::default();
    settings.set_value("sync.webhook_url", "https://hooks.example").unwrap();
    settings.set_value("sync.webhook_url", "").unwrap();
    assert_eq!(settings.sync.webhook_url, None);

    settings.set_value("storage.quota_bytes", "0").unwrap();
    assert_eq!(settings.storage.quota(), None);
    settings.set_value("storage.quota_bytes", "").unwrap();
    assert_eq!(settings.storage.quota_bytes, DEFAULT_QUOTA_BYTES);
}

#[test]
fn set_value_rejects_bad_input() {
    let mut settings = AppSettings::default();
    assert!(matches!(
        settings.set_value("storage.colour", "red"),
        Err(SettingsError::UnknownKey(_))
    ));
    assert!(matches!(
        settings.set_value("storage.backend", "floppy"),
        Err(SettingsError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set_value("storage.quota_bytes", "lots"),
        Err(SettingsError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set_value("sync.webhook_url", "ftp://nope"),
        Err(SettingsError::InvalidValue { .. })
    ));
    assert_eq!(settings, AppSettings::default());
}

#[test]
fn every_listed_key_is_settable() {
    let mut settings = AppSettings::default();
    for key in SETTING_KEYS {
        settings.set_value(key, "").unwrap();
    }
}

// -- Save / load --

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("conf").join("settings.toml");

    let mut settings = AppSettings::default();
    settings.set_value("storage.backend", "sqlite").unwrap();
    settings.set_value("sync.sheet_id", "1abc").unwrap();
    save_settings_to(&file, &settings).unwrap();

    assert!(!file.with_extension("toml.tmp").exists());
    assert_eq!(load_settings_from(&file), settings);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load_settings_from(&dir.path().join("absent.toml")), AppSettings::default());
}
