use shelfkeep_catalog::RecordKind;
use shelfkeep_import::import_log::MAX_LOG_ENTRIES;
use shelfkeep_import::*;
use shelfkeep_store::{CollectionStore, MemoryStorage, Storage};

#[test]
fn empty_log_loads_as_empty() {
    let storage = MemoryStorage::new();
    assert!(load_import_log(&storage).unwrap().is_empty());
}

#[test]
fn entries_append_in_order() {
    let storage = MemoryStorage::new();
    log_import(&storage, &ImportLogEntry::new(RecordKind::Figures, "a.csv", SourceFormat::Delimited, 2, 2)).unwrap();
    log_import(&storage, &ImportLogEntry::new(RecordKind::Wishlist, "b.json", SourceFormat::Json, 5, 5)).unwrap();

    let log = load_import_log(&storage).unwrap();
    let sources: Vec<_> = log.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["a.csv", "b.json"]);
    assert!(log[0].imported_at <= log[1].imported_at);
}

#[test]
fn stored_format_uses_display_names() {
    let storage = MemoryStorage::new();
    log_import(&storage, &ImportLogEntry::new(RecordKind::Figures, "a.csv", SourceFormat::Delimited, 2, 2)).unwrap();
    log_import(&storage, &ImportLogEntry::new(RecordKind::Figures, "b.json", SourceFormat::Json, 1, 3)).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&storage.read(IMPORT_LOG_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(raw[0]["format"], SourceFormat::Delimited.as_str());
    assert_eq!(raw[1]["format"], SourceFormat::Json.as_str());

    let log = load_import_log(&storage).unwrap();
    assert_eq!(log[0].format, SourceFormat::Delimited);
}

#[test]
fn older_delimited_entries_still_load() {
    let storage = MemoryStorage::new();
    let old = r#"[{"kind":"figures","source":"a.csv","format":"delimited","added":1,"total":1,"importedAt":"2025-01-02T03:04:05Z"}]"#;
    storage.write(IMPORT_LOG_KEY, old).unwrap();
    let log = load_import_log(&storage).unwrap();
    assert_eq!(log[0].format, SourceFormat::Delimited);
}

#[test]
fn log_is_capped() {
    let storage = MemoryStorage::new();
    for i in 0..MAX_LOG_ENTRIES + 5 {
        let entry = ImportLogEntry::new(RecordKind::Customs, format!("batch-{i}"), SourceFormat::Delimited, 1, i + 1);
        log_import(&storage, &entry).unwrap();
    }

    let log = load_import_log(&storage).unwrap();
    assert_eq!(log.len(), MAX_LOG_ENTRIES);
    assert_eq!(log[0].source, "batch-5");
}

#[test]
fn corrupt_log_is_not_overwritten() {
    let storage = MemoryStorage::new();
    storage.write(IMPORT_LOG_KEY, "not json").unwrap();
    let entry = ImportLogEntry::new(RecordKind::Figures, "x", SourceFormat::Delimited, 1, 1);
    assert!(log_import(&storage, &entry).is_err());
    assert_eq!(storage.read(IMPORT_LOG_KEY).unwrap().as_deref(), Some("not json"));
}

#[test]
fn corrupt_log_does_not_fail_the_import() {
    let store = CollectionStore::new(MemoryStorage::new());
    store.storage().write(IMPORT_LOG_KEY, "{").unwrap();

    let report = import_text(&store, RecordKind::Figures, "name\nPinhead", &ImportOptions::default(), None).unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(store.load(RecordKind::Figures).unwrap().len(), 1);
}
