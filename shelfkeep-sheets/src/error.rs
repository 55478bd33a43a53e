/// Errors fetching remote import text. The import never starts on these.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("{url} returned an HTML page, not delimited text (is the sheet published?)")]
    NotDelimited { url: String },

    #[error("Not a sheet id or URL: {0}")]
    InvalidSource(String),
}

/// Errors pushing a collection to a webhook.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
}
