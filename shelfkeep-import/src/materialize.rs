//! Row materializer: header row + token row → record.

use shelfkeep_catalog::{CoercionTable, Record};

use crate::tokenizer::tokenize_line;

/// Field names from the first row of a batch. Fixed for the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    names: Vec<String>,
}

impl HeaderSet {
    /// Tokenize a header line. Names are trimmed so `name, price` works.
    pub fn parse(line: &str, delimiter: char) -> Self {
        Self {
            names: tokenize_line(line, delimiter)
                .into_iter()
                .map(|name| name.trim().to_string())
                .collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    pub record: Record,
    /// Numeric fields whose token was not a number and became `0`.
    pub fallbacks: Vec<String>,
}

/// Pair headers with tokens by position.
///
/// Headers past the end of a short row stay unset (defaults come later);
/// tokens past the last header are dropped. Blank header names are
/// skipped, since a trailing delimiter on the header row yields one.
pub fn materialize_row(headers: &HeaderSet, tokens: &[String], table: &CoercionTable) -> Materialized {
    let mut record = Record::new();
    let mut fallbacks = Vec::new();

    for (name, token) in headers.names().iter().zip(tokens) {
        if name.is_empty() {
            continue;
        }
        let coerced = table.coerce(name, token);
        if coerced.fell_back {
            fallbacks.push(name.clone());
        }
        record.set(name.as_str(), coerced.value);
    }

    Materialized { record, fallbacks }
}
