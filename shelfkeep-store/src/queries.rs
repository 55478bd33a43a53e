//! List queries over a loaded collection: sorting, filtering, statistics.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use shelfkeep_catalog::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort by one field.
///
/// Numbers compare numerically, text case-insensitively, numbers sort
/// before text, and records missing the field always go last.
pub fn sort_records(records: &mut [Record], field: &str, order: SortOrder) {
    records.sort_by(|a, b| {
        match (present(a.get(field)), present(b.get(field))) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            }
        }
    });
}

fn present(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|v| !matches!(v, FieldValue::Null))
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_text().to_lowercase().cmp(&b.as_text().to_lowercase()),
    }
}

/// Which records a listing shows.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring matched against every field's text.
    pub search: Option<String>,
    /// Exact (case-insensitive) field matches; all must hold.
    pub equals: Vec<(String, String)>,
}

impl RecordFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn field_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                record
                    .iter()
                    .any(|(_, value)| value.as_text().to_lowercase().contains(&needle))
            }
        };
        search_ok
            && self.equals.iter().all(|(field, expected)| {
                record
                    .get(field)
                    .is_some_and(|v| v.as_text().eq_ignore_ascii_case(expected))
            })
    }
}

/// Keep the records the filter matches, in their original order.
pub fn filter_records(records: Vec<Record>, filter: &RecordFilter) -> Vec<Record> {
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Summary numbers for one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStats {
    pub count: usize,
    /// Records with a numeric, non-zero price.
    pub priced: usize,
    pub total_price: f64,
    /// Record count per `shelf` value; records without a shelf are not counted.
    pub by_shelf: BTreeMap<String, usize>,
}

impl CollectionStats {
    pub fn average_price(&self) -> Option<f64> {
        (self.priced > 0).then(|| self.total_price / self.priced as f64)
    }
}

pub fn collection_stats(records: &[Record]) -> CollectionStats {
    let mut stats = CollectionStats {
        count: records.len(),
        ..Default::default()
    };
    for record in records {
        if let Some(price) = record.number("price").filter(|p| *p != 0.0) {
            stats.priced += 1;
            stats.total_price += price;
        }
        if let Some(shelf) = record.get("shelf").filter(|v| !v.is_falsy()) {
            *stats.by_shelf.entry(shelf.as_text()).or_default() += 1;
        }
    }
    stats
}
