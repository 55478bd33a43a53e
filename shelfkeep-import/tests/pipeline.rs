use shelfkeep_catalog::{FieldValue, Record, RecordKind};
use shelfkeep_import::*;
use shelfkeep_store::{CollectionStore, FileStorage, MemoryStorage, SqliteStorage, Storage};

const FREDDY_AND_JASON: &str = "name,price,ranking\n\"Freddy Krueger\",45000,5\nJason,38000,\n";

fn figure(fields: &[(&str, FieldValue)]) -> Record {
    fields.iter().cloned().collect()
}

fn no_log() -> ImportOptions {
    ImportOptions {
        log_imports: false,
        ..Default::default()
    }
}

fn expected_freddy_and_jason() -> Vec<Record> {
    vec![
        figure(&[
            ("id", FieldValue::text("001")),
            ("name", FieldValue::text("Freddy Krueger")),
            ("price", FieldValue::Integer(45000)),
            ("ranking", FieldValue::Integer(5)),
            ("type", FieldValue::text("figures")),
            ("condition", FieldValue::text("new")),
            ("shelf", FieldValue::text("Eins")),
            ("display", FieldValue::text("Silent Horrors")),
        ]),
        figure(&[
            ("id", FieldValue::text("002")),
            ("name", FieldValue::text("Jason")),
            ("price", FieldValue::Integer(38000)),
            ("ranking", FieldValue::Integer(0)),
            ("type", FieldValue::text("figures")),
            ("condition", FieldValue::text("new")),
            ("shelf", FieldValue::text("Eins")),
            ("display", FieldValue::text("Silent Horrors")),
        ]),
    ]
}

#[test]
fn freddy_and_jason_end_to_end() {
    let store = CollectionStore::new(MemoryStorage::new());
    let report = import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.existing, 0);
    assert_eq!(report.total, 2);
    assert_eq!(report.format, SourceFormat::Delimited);
    assert_eq!(report.ids_assigned, 2);
    assert!(report.coercion_fallbacks.is_empty());

    let stored = store.load(RecordKind::Figures).unwrap();
    assert_eq!(stored, expected_freddy_and_jason());
}

#[test]
fn stored_json_matches_record_shape() {
    let store = CollectionStore::new(MemoryStorage::new());
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();

    let raw = store.storage().read("figureItems").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["id"], "001");
    assert_eq!(value[0]["price"], 45000);
    assert_eq!(value[1]["ranking"], 0);
    assert!(raw.starts_with(r#"[{"id":"001","name":"Freddy Krueger","price":45000"#));
}

#[test]
fn merge_is_append_only() {
    let store = CollectionStore::new(MemoryStorage::new());
    let existing = vec![
        figure(&[("id", FieldValue::text("a")), ("name", FieldValue::text("Ghostface"))]),
        figure(&[("id", FieldValue::text("b")), ("name", FieldValue::text("Chucky"))]),
        figure(&[("id", FieldValue::text("c")), ("name", FieldValue::text("Samara"))]),
    ];
    store.append(RecordKind::Figures, &existing).unwrap();

    let report = import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();
    assert_eq!((report.existing, report.added, report.total), (3, 2, 5));

    let stored = store.load(RecordKind::Figures).unwrap();
    assert_eq!(&stored[..3], &existing[..]);
    assert_eq!(&stored[3..], &expected_freddy_and_jason()[..]);
}

#[test]
fn reimport_duplicates_and_restarts_ids() {
    let store = CollectionStore::new(MemoryStorage::new());
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();

    let ids: Vec<_> = store
        .load(RecordKind::Figures)
        .unwrap()
        .iter()
        .filter_map(Record::id)
        .collect();
    assert_eq!(ids, vec!["001", "002", "001", "002"]);
}

#[test]
fn continue_policy_avoids_collisions() {
    let store = CollectionStore::new(MemoryStorage::new());
    let options = ImportOptions {
        id_policy: IdPolicy::ContinueCollection,
        ..no_log()
    };
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &options, None).unwrap();
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &options, None).unwrap();

    let ids: Vec<_> = store
        .load(RecordKind::Figures)
        .unwrap()
        .iter()
        .filter_map(Record::id)
        .collect();
    assert_eq!(ids, vec!["001", "002", "003", "004"]);
}

#[test]
fn continue_policy_survives_huge_stored_ids() {
    let store = CollectionStore::new(MemoryStorage::new());
    let huge = format!("[{{\"id\":\"{}\",\"name\":\"Leatherface\"}}]", usize::MAX);
    import_text(&store, RecordKind::Figures, &huge, &no_log(), None).unwrap();

    let options = ImportOptions {
        id_policy: IdPolicy::ContinueCollection,
        ..no_log()
    };
    let report = import_text(&store, RecordKind::Figures, "name\nX\n", &options, None).unwrap();
    assert_eq!(report.total, 2);

    let records = store.load(RecordKind::Figures).unwrap();
    assert_eq!(records[1].id().as_deref(), Some("001"));
}

#[test]
fn json_source_goes_through_the_same_normalizer() {
    let store = CollectionStore::new(MemoryStorage::new());
    let text = r#"[{"name":"Pennywise","price":"12"},{"id":"x9","name":"Candyman","shelf":"Drei"}]"#;
    let report = import_text(&store, RecordKind::Figures, text, &no_log(), None).unwrap();
    assert_eq!(report.format, SourceFormat::Json);
    assert_eq!(report.added, 2);

    let stored = store.load(RecordKind::Figures).unwrap();
    assert_eq!(stored[0].text("id"), Some("001"));
    assert_eq!(stored[0].text("price"), Some("12"));
    assert_eq!(stored[0].text("shelf"), Some("Eins"));
    assert_eq!(stored[1].text("id"), Some("x9"));
    assert_eq!(stored[1].text("shelf"), Some("Drei"));
    assert_eq!(stored[1].text("condition"), Some("new"));
}

#[test]
fn wishlist_import_only_defaults_type() {
    let store = CollectionStore::new(MemoryStorage::new());
    let report = import_text(
        &store,
        RecordKind::Wishlist,
        "name,price,link\nArt the Clown,9900,https://example.com/art\n",
        &no_log(),
        None,
    )
    .unwrap();
    assert_eq!(report.defaults_applied, 1);

    let stored = store.load(RecordKind::Wishlist).unwrap();
    assert_eq!(stored[0].text("type"), Some("figures"));
    assert!(!stored[0].contains("shelf"));
    assert!(store.load(RecordKind::Figures).unwrap().is_empty());
}

#[test]
fn parse_error_leaves_collection_untouched() {
    let store = CollectionStore::new(MemoryStorage::new());
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap();
    let before = store.storage().read("figureItems").unwrap();

    for bad in [r#"{"name":"not an array"}"#, "[1, 2]", "[{\"name\":"] {
        let err = import_text(&store, RecordKind::Figures, bad, &no_log(), None).unwrap_err();
        assert!(err.is_parse_error(), "{bad}: {err}");
    }
    let err = import_text(&store, RecordKind::Figures, "\n  \n", &no_log(), None).unwrap_err();
    assert!(matches!(err, ImportError::MissingHeader));

    assert_eq!(store.storage().read("figureItems").unwrap(), before);
}

#[test]
fn forced_format_overrides_detection() {
    let store = CollectionStore::new(MemoryStorage::new());
    let options = ImportOptions {
        format: Some(SourceFormat::Json),
        ..no_log()
    };
    let err = import_text(&store, RecordKind::Figures, "name\nFreddy", &options, None).unwrap_err();
    assert!(matches!(err, ImportError::Json(_)));
}

#[test]
fn coercion_fallbacks_are_reported() {
    let store = CollectionStore::new(MemoryStorage::new());
    let report = import_text(
        &store,
        RecordKind::Figures,
        "name,price\nTiffany,ask me\n\nBrightburn,100",
        &no_log(),
        None,
    )
    .unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(report.blank_lines_skipped, 1);
    assert_eq!(report.coercion_fallbacks.len(), 1);
    assert_eq!(report.coercion_fallbacks[0].line, 2);
    assert_eq!(report.coercion_fallbacks[0].token, "ask me");
}

#[test]
fn storage_full_hands_back_the_batch() {
    let store = CollectionStore::new(MemoryStorage::new().with_quota(64));
    let err = import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), None).unwrap_err();

    match err {
        ImportError::StorageFull { batch, source } => {
            assert!(source.is_quota());
            assert_eq!(batch, expected_freddy_and_jason());
        }
        other => panic!("expected StorageFull, got {other}"),
    }
    assert!(store.load(RecordKind::Figures).unwrap().is_empty());
}

#[test]
fn imports_are_logged() {
    let store = CollectionStore::new(MemoryStorage::new());
    let options = ImportOptions {
        source_label: "horror.csv".to_string(),
        ..Default::default()
    };
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &options, None).unwrap();

    let log = load_import_log(store.storage()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, RecordKind::Figures);
    assert_eq!(log[0].source, "horror.csv");
    assert_eq!(log[0].added, 2);
    assert_eq!(log[0].total, 2);
}

#[test]
fn works_on_file_and_sqlite_backends() {
    let dir = tempfile::tempdir().unwrap();
    let backends: Vec<Box<dyn Storage>> = vec![
        Box::new(FileStorage::new(dir.path().join("docs"))),
        Box::new(SqliteStorage::open(&dir.path().join("shelf.db")).unwrap()),
    ];

    for backend in backends {
        let store = CollectionStore::new(backend);
        import_text(&store, RecordKind::Customs, "name\nHomemade Pinhead", &no_log(), None).unwrap();
        let report = import_text(&store, RecordKind::Customs, FREDDY_AND_JASON, &no_log(), None).unwrap();
        assert_eq!(report.total, 3);
        let stored = store.load(RecordKind::Customs).unwrap();
        assert_eq!(stored[0].text("name"), Some("Homemade Pinhead"));
        assert_eq!(stored[2].text("name"), Some("Jason"));
    }
}

struct Recording(std::sync::Mutex<Vec<String>>);

impl ImportProgress for Recording {
    fn on_record(&self, current: usize, total: usize) {
        self.0.lock().unwrap().push(format!("{current}/{total}"));
    }
    fn on_phase(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
    fn on_complete(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

#[test]
fn progress_sees_every_record() {
    let store = CollectionStore::new(MemoryStorage::new());
    let progress = Recording(Default::default());
    import_text(&store, RecordKind::Figures, FREDDY_AND_JASON, &no_log(), Some(&progress)).unwrap();

    let events = progress.0.into_inner().unwrap();
    assert!(events.contains(&"1/2".to_string()));
    assert!(events.contains(&"2/2".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("Imported 2 figures record(s) (2 total)"));
}
