use shelfkeep_catalog::*;

fn freddy() -> Record {
    let json = r#"{
        "id": "001",
        "name": "Freddy Krueger",
        "price": 45000,
        "ranking": 5,
        "type": "figures",
        "condition": "new",
        "shelf": "Eins",
        "display": "Silent Horrors",
        "maker": "NECA"
    }"#;
    serde_json::from_str(json).unwrap()
}

#[test]
fn figure_view_reads_known_fields() {
    let item = CollectionItem::from_record(RecordKind::Figures, &freddy());
    let CollectionItem::Figure(figure) = &item else {
        panic!("expected a figure, got {item:?}");
    };
    assert_eq!(figure.id, "001");
    assert_eq!(figure.name, "Freddy Krueger");
    assert_eq!(figure.shelf, "Eins");
    assert_eq!(figure.display, "Silent Horrors");
    assert_eq!(figure.ranking, 5.0);
    assert_eq!(figure.price, Some(45000.0));
    assert_eq!(figure.image, None);
}

#[test]
fn unknown_fields_land_in_extra() {
    let item = CollectionItem::from_record(RecordKind::Figures, &freddy());
    let CollectionItem::Figure(figure) = item else {
        panic!("expected a figure");
    };
    assert_eq!(figure.extra.len(), 1);
    assert_eq!(figure.extra.text("maker"), Some("NECA"));
}

#[test]
fn wishlist_view_and_accessors() {
    let mut record = Record::new();
    record.set("id", "007");
    record.set("name", "Pumpkinhead");
    record.set("price", "129.99");
    record.set("link", "https://example.com/pumpkinhead");

    let item = CollectionItem::from_record(RecordKind::Wishlist, &record);
    assert_eq!(item.kind(), RecordKind::Wishlist);
    assert_eq!(item.id(), "007");
    assert_eq!(item.name(), "Pumpkinhead");
    assert_eq!(item.price(), Some(129.99));
}

#[test]
fn missing_fields_are_empty() {
    let item = CollectionItem::from_record(RecordKind::Customs, &Record::new());
    assert_eq!(item.id(), "");
    assert_eq!(item.price(), None);
}
