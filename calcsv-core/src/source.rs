//! Acquiring the raw calendar: an uploaded buffer or a URL to fetch.
//!
//! Everything here runs before the parser. Failures are reported as
//! [`CalCsvError::InputUnavailable`] so callers can tell "you gave me nothing
//! usable" apart from "the calendar you gave me is broken".

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::FetchSettings;
use crate::error::{CalCsvError, CalCsvResult};

/// Message used when neither a file nor a URL was supplied.
pub const NO_INPUT: &str = "Error: no file or URL specified.";

/// Where the calendar comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Upload(Vec<u8>),
    Url(String),
}

impl InputSource {
    /// Pick the input from optional form values. A non-empty upload wins over a URL.
    pub fn select(upload: Option<Vec<u8>>, url: Option<String>) -> CalCsvResult<Self> {
        if let Some(bytes) = upload.filter(|b| !b.is_empty()) {
            return Ok(InputSource::Upload(bytes));
        }

        match url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            Some(url) => Ok(InputSource::Url(url)),
            None => Err(CalCsvError::InputUnavailable(NO_INPUT.to_string())),
        }
    }

    /// Materialize the whole calendar buffer.
    pub async fn load(self, client: &Client) -> CalCsvResult<Vec<u8>> {
        match self {
            InputSource::Upload(bytes) => Ok(bytes),
            InputSource::Url(url) => fetch_ics(client, &url).await,
        }
    }
}

/// HTTP client used for calendar fetches.
pub fn build_client(settings: &FetchSettings) -> CalCsvResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|e| CalCsvError::Config(format!("Could not build HTTP client: {e}")))
}

/// Parse a calendar URL, mapping `webcal://` and `webcals://` onto HTTP.
pub fn normalize_url(raw: &str) -> CalCsvResult<Url> {
    let raw = raw.trim();
    let rewritten = match raw.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("webcal") => format!("http://{rest}"),
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("webcals") => format!("https://{rest}"),
        _ => raw.to_string(),
    };

    let url = Url::parse(&rewritten)
        .map_err(|e| CalCsvError::InputUnavailable(format!("Invalid calendar URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CalCsvError::InputUnavailable(format!(
            "Unsupported URL scheme '{other}'"
        ))),
    }
}

/// Download an ICS document. Network errors and non-2xx statuses are input errors.
pub async fn fetch_ics(client: &Client, raw_url: &str) -> CalCsvResult<Vec<u8>> {
    let url = normalize_url(raw_url)?;
    info!(%url, "fetching calendar");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| CalCsvError::InputUnavailable(format!("Failed to fetch ICS file: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CalCsvError::InputUnavailable(format!(
            "Failed to fetch ICS file: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| CalCsvError::InputUnavailable(format!("Failed to fetch ICS file: {e}")))?;

    debug!(%url, bytes = body.len(), "fetched calendar");
    Ok(body.to_vec())
}
