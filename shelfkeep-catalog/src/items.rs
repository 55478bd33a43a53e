//! Typed views over stored records, one struct per record kind.
//!
//! Collections are persisted as flat records so that fields added by a
//! sheet survive untouched. These types give the rest of the app named
//! access to the fields it understands; anything else lands in `extra`.

use crate::types::{FieldValue, Record, RecordKind};

// ── Figures ─────────────────────────────────────────────────────────────────

/// An owned figure on the checklist.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureItem {
    pub id: String,
    pub name: String,
    /// Category label, `"figures"` unless the sheet says otherwise.
    pub item_type: String,
    pub condition: String,
    pub shelf: String,
    pub display: String,
    pub ranking: f64,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub extra: Record,
}

// ── Wishlist ────────────────────────────────────────────────────────────────

/// An item the user is looking to buy.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistItem {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub extra: Record,
}

// ── Customs ─────────────────────────────────────────────────────────────────

/// A custom or modified piece.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomItem {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub extra: Record,
}

/// Tagged union over the three record kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionItem {
    Figure(FigureItem),
    Wishlist(WishlistItem),
    Custom(CustomItem),
}

const FIGURE_FIELDS: &[&str] = &[
    "id", "name", "type", "condition", "shelf", "display", "ranking", "price", "image",
];
const WISHLIST_FIELDS: &[&str] = &["id", "name", "type", "price", "link"];
const CUSTOM_FIELDS: &[&str] = &["id", "name", "type", "price", "notes"];

impl CollectionItem {
    /// Build the typed view of a stored record.
    pub fn from_record(kind: RecordKind, record: &Record) -> Self {
        let text = |field: &str| record.get(field).map(FieldValue::as_text).unwrap_or_default();
        let opt_text = |field: &str| {
            record
                .get(field)
                .filter(|v| !v.is_falsy())
                .map(FieldValue::as_text)
        };
        let number = |field: &str| record.get(field).and_then(number_of);

        match kind {
            RecordKind::Figures => Self::Figure(FigureItem {
                id: text("id"),
                name: text("name"),
                item_type: text("type"),
                condition: text("condition"),
                shelf: text("shelf"),
                display: text("display"),
                ranking: number("ranking").unwrap_or(0.0),
                price: number("price"),
                image: opt_text("image"),
                extra: extra_fields(record, FIGURE_FIELDS),
            }),
            RecordKind::Wishlist => Self::Wishlist(WishlistItem {
                id: text("id"),
                name: text("name"),
                item_type: text("type"),
                price: number("price"),
                link: opt_text("link"),
                extra: extra_fields(record, WISHLIST_FIELDS),
            }),
            RecordKind::Customs => Self::Custom(CustomItem {
                id: text("id"),
                name: text("name"),
                item_type: text("type"),
                price: number("price"),
                notes: opt_text("notes"),
                extra: extra_fields(record, CUSTOM_FIELDS),
            }),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Figure(_) => RecordKind::Figures,
            Self::Wishlist(_) => RecordKind::Wishlist,
            Self::Custom(_) => RecordKind::Customs,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Figure(f) => &f.id,
            Self::Wishlist(w) => &w.id,
            Self::Custom(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Figure(f) => &f.name,
            Self::Wishlist(w) => &w.name,
            Self::Custom(c) => &c.name,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self {
            Self::Figure(f) => f.price,
            Self::Wishlist(w) => w.price,
            Self::Custom(c) => c.price,
        }
    }
}

/// Numbers stored as text (older imports) are still read as numbers.
fn number_of(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Text(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn extra_fields(record: &Record, known: &[&str]) -> Record {
    record
        .iter()
        .filter(|(name, _)| !known.contains(name))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
