use shelfkeep_catalog::Record;
use shelfkeep_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON import expects an array of records, got {found}")]
    NotAnArray { found: &'static str },

    #[error("JSON record #{index} is {found}, expected an object")]
    NotAnObject { index: usize, found: &'static str },

    #[error("No header row: the input is empty")]
    MissingHeader,

    /// The batch parsed and normalized, but the merged collection does not
    /// fit in storage. The batch is handed back so it is not lost.
    #[error("Storage is full; {count} parsed records were not saved: {source}", count = .batch.len())]
    StorageFull {
        batch: Vec<Record>,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    /// True for errors raised before any storage was touched.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::NotAnArray { .. } | Self::NotAnObject { .. } | Self::MissingHeader
        )
    }
}

/// JSON type name for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
