//! Pushing a collection to a webhook as JSON.

use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use shelfkeep_catalog::{Record, RecordKind};

use crate::error::WebhookError;

/// Body of a sync request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload<'a> {
    pub kind: RecordKind,
    pub storage_key: &'static str,
    pub count: usize,
    pub records: &'a [Record],
}

impl<'a> SyncPayload<'a> {
    pub fn new(kind: RecordKind, records: &'a [Record]) -> Self {
        Self {
            kind,
            storage_key: kind.storage_key(),
            count: records.len(),
            records,
        }
    }
}

/// POST the whole collection to `url`. Returns the HTTP status on success.
pub fn push_collection(
    url: &str,
    kind: RecordKind,
    records: &[Record],
    timeout: Duration,
) -> Result<u16, WebhookError> {
    Url::parse(url).map_err(|e| WebhookError::InvalidUrl(format!("{url}: {e}")))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("shelfkeep/", env!("CARGO_PKG_VERSION")))
        .build()?;

    log::debug!("POST {} {} record(s) to {}", records.len(), kind, url);
    let response = client.post(url).json(&SyncPayload::new(kind, records)).send()?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(WebhookError::Status {
            status: status.as_u16(),
            message: message.trim().chars().take(200).collect(),
        });
    }

    Ok(status.as_u16())
}
