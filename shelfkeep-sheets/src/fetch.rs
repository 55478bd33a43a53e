//! Fetching import text from a published Google Sheet or any URL.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use crate::error::FetchError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SHEETS_HOST: &str = "docs.google.com";
const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// A spreadsheet identified from a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub sheet_id: String,
    /// Tab id; `None` is the first tab.
    pub gid: Option<String>,
    /// "Publish to the web" links (`/d/e/<id>/pub`) use a different id space
    /// and export path than editor links.
    pub published: bool,
}

impl SheetRef {
    pub fn csv_url(&self) -> String {
        if self.published {
            let mut url = format!("{SHEETS_BASE}/e/{}/pub?output=csv", self.sheet_id);
            if let Some(gid) = &self.gid {
                url.push_str(&format!("&gid={gid}"));
            }
            url
        } else {
            sheet_csv_url(&self.sheet_id, self.gid.as_deref())
        }
    }
}

/// CSV export URL for an editor sheet id.
pub fn sheet_csv_url(sheet_id: &str, gid: Option<&str>) -> String {
    let mut url = format!("{SHEETS_BASE}/{sheet_id}/export?format=csv");
    if let Some(gid) = gid {
        url.push_str(&format!("&gid={gid}"));
    }
    url
}

/// Pull the sheet id and tab out of a Google Sheets link.
///
/// Accepts editor links (`/spreadsheets/d/<id>/edit#gid=0`), export links
/// and published links (`/spreadsheets/d/e/<id>/pubhtml`). Returns `None`
/// for anything else.
pub fn parse_sheet_url(url: &str) -> Option<SheetRef> {
    let parsed = Url::parse(url.trim()).ok()?;
    if parsed.host_str()? != SHEETS_HOST {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let (sheet_id, published) = match segments.as_slice() {
        ["spreadsheets", "d", "e", id, ..] => (*id, true),
        ["spreadsheets", "d", id, ..] => (*id, false),
        _ => return None,
    };
    if !is_sheet_id(sheet_id) {
        return None;
    }

    let gid = parsed
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            parsed
                .fragment()
                .and_then(|f| f.split('&').find_map(|part| part.strip_prefix("gid=")))
                .map(str::to_string)
        })
        .filter(|g| !g.is_empty());

    Some(SheetRef {
        sheet_id: sheet_id.to_string(),
        gid,
        published,
    })
}

fn is_sheet_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Turn user input into the URL to fetch.
///
/// A bare sheet id becomes its CSV export URL; a Google Sheets link is
/// rewritten to its CSV export (with `gid` overriding the link's tab);
/// any other http(s) URL is fetched as given.
pub fn resolve_source(input: &str, gid: Option<&str>) -> Result<String, FetchError> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        if let Some(mut sheet) = parse_sheet_url(input) {
            if let Some(gid) = gid {
                sheet.gid = Some(gid.to_string());
            }
            return Ok(sheet.csv_url());
        }
        return Url::parse(input)
            .map(|_| input.to_string())
            .map_err(|_| FetchError::InvalidSource(input.to_string()));
    }

    if is_sheet_id(input) {
        Ok(sheet_csv_url(input, gid))
    } else {
        Err(FetchError::InvalidSource(input.to_string()))
    }
}

/// GET `url` and return the body as text.
///
/// Unpublished sheets redirect to a sign-in page, which comes back as a
/// 200 HTML document; that is reported as [`FetchError::NotDelimited`].
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("shelfkeep/", env!("CARGO_PKG_VERSION")))
        .build()?;

    log::debug!("GET {url}");
    let response = client.get(url).send()?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("HTTP {} for {}", status, url);
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let is_html_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("text/html"));
    let body = response.text()?;

    if is_html_type || looks_like_html(&body) {
        return Err(FetchError::NotDelimited {
            url: url.to_string(),
        });
    }

    log::debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(15).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz0123456789_-xyz";

    #[test]
    fn export_url_for_bare_id() {
        assert_eq!(
            sheet_csv_url(ID, None),
            format!("https://docs.google.com/spreadsheets/d/{ID}/export?format=csv")
        );
        assert!(sheet_csv_url(ID, Some("42")).ends_with("&gid=42"));
    }

    #[test]
    fn editor_link_with_fragment_gid() {
        let sheet = parse_sheet_url(&format!("https://docs.google.com/spreadsheets/d/{ID}/edit#gid=1234")).unwrap();
        assert_eq!(sheet.sheet_id, ID);
        assert_eq!(sheet.gid.as_deref(), Some("1234"));
        assert!(!sheet.published);
    }

    #[test]
    fn export_link_with_query_gid() {
        let sheet =
            parse_sheet_url(&format!("https://docs.google.com/spreadsheets/d/{ID}/export?format=csv&gid=7")).unwrap();
        assert_eq!(sheet.gid.as_deref(), Some("7"));
    }

    #[test]
    fn published_link() {
        let sheet = parse_sheet_url("https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pubhtml").unwrap();
        assert!(sheet.published);
        assert_eq!(sheet.sheet_id, "2PACX-1vQabc");
        assert_eq!(
            sheet.csv_url(),
            "https://docs.google.com/spreadsheets/d/e/2PACX-1vQabc/pub?output=csv"
        );
    }

    #[test]
    fn other_hosts_are_not_sheets() {
        assert!(parse_sheet_url("https://example.com/spreadsheets/d/abc/edit").is_none());
        assert!(parse_sheet_url("https://docs.google.com/document/d/abc/edit").is_none());
        assert!(parse_sheet_url("not a url").is_none());
    }

    #[test]
    fn resolve_bare_id_and_links() {
        assert_eq!(resolve_source(ID, None).unwrap(), sheet_csv_url(ID, None));
        assert_eq!(
            resolve_source(&format!("https://docs.google.com/spreadsheets/d/{ID}/edit#gid=5"), Some("9")).unwrap(),
            sheet_csv_url(ID, Some("9"))
        );
        assert_eq!(
            resolve_source("https://example.com/figures.csv", None).unwrap(),
            "https://example.com/figures.csv"
        );
    }

    #[test]
    fn resolve_rejects_garbage() {
        assert!(matches!(resolve_source("has spaces in it", None), Err(FetchError::InvalidSource(_))));
        assert!(matches!(resolve_source("", None), Err(FetchError::InvalidSource(_))));
    }

    #[test]
    fn html_sniffing() {
        assert!(looks_like_html("  <!DOCTYPE html><html>"));
        assert!(looks_like_html("<html lang=en>"));
        assert!(!looks_like_html("name,price\nFreddy,1"));
    }
}
