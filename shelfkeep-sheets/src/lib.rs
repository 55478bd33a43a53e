//! Remote sources and sinks: published Google Sheets as import input, and
//! webhooks (Zapier and similar) that receive a collection on sync.

pub mod error;
pub mod fetch;
pub mod webhook;

pub use error::{FetchError, WebhookError};
pub use fetch::{fetch_text, parse_sheet_url, resolve_source, sheet_csv_url, SheetRef, DEFAULT_TIMEOUT};
pub use webhook::{push_collection, SyncPayload};
