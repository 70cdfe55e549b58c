//! Blocking HTTP client for the listing backend.

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ListingSource, SourceError};
use crate::model::{
    ExportRequest, ExportedFile, Listing, NotifyAck, NotifyRequest, RescoreMap, ScoreRequest,
    ScoreResult, rescore_map,
};

/// Filename used when an export response carries no `Content-Disposition`.
pub const DEFAULT_EXPORT_FILENAME: &str = "listings_export.csv";

const USER_AGENT: &str = concat!("lotdesk/", env!("CARGO_PKG_VERSION"));

/// Bytes escaped in a path segment: everything outside the RFC 3986
/// unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`ListingSource`] backed by the listing REST API.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl HttpListingSource {
    /// Client for `base_url` (e.g. `http://127.0.0.1:8000/api`).
    #[must_use]
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            agent,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut request = self
            .agent
            .request(method, url)
            .set("Accept", "application/json")
            .set("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ureq::Response, SourceError> {
        let url = self.url(path);
        let mut request = self.request("GET", &url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        debug!(%url, "GET");
        request.call().map_err(|err| call_error(&url, err))
    }

    fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ureq::Response, SourceError> {
        let url = self.url(path);
        debug!(%url, "POST");
        self.request("POST", &url)
            .send_json(body)
            .map_err(|err| call_error(&url, err))
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SourceError> {
        let response = self.post(path, body)?;
        decode(&self.url(path), response)
    }
}

impl ListingSource for HttpListingSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn check_health(&self) -> bool {
        match self.get("/healthz", &[]) {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "health check failed");
                false
            }
        }
    }

    fn load_all(&self) -> Result<Vec<Listing>, SourceError> {
        let url = self.url("/listings");
        let body: Value = decode(&url, self.get("/listings", &[])?)?;
        listings_from_value(&url, body)
    }

    fn load_buyer(
        &self,
        buyer_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Listing>, SourceError> {
        let path = format!(
            "/listings/buyer/{}",
            utf8_percent_encode(buyer_id, PATH_SEGMENT)
        );
        let query: Vec<(&str, String)> = [("start_date", start), ("end_date", end)]
            .into_iter()
            .filter_map(|(key, ts)| {
                ts.map(|ts| (key, ts.to_rfc3339_opts(SecondsFormat::Secs, true)))
            })
            .collect();
        let url = self.url(&path);
        let body: Value = decode(&url, self.get(&path, &query)?)?;
        listings_from_value(&url, body)
    }

    fn rescore(&self, batch: &[ScoreRequest]) -> Result<RescoreMap, SourceError> {
        let results: Vec<ScoreResult> = self.post_json("/score", batch)?;
        Ok(rescore_map(results))
    }

    fn notify(&self, request: &NotifyRequest) -> Result<Vec<NotifyAck>, SourceError> {
        self.post_json("/notify", std::slice::from_ref(request))
    }

    fn ingest(&self, listings: &[Listing]) -> Result<Vec<Listing>, SourceError> {
        self.post_json("/ingest", listings)
    }

    fn export(&self, request: &ExportRequest) -> Result<ExportedFile, SourceError> {
        let path = "/export/listings";
        let response = self.post(path, request)?;
        let filename = response
            .header("Content-Disposition")
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());
        let csv = response.into_string().map_err(|err| SourceError::Decode {
            url: self.url(path),
            message: err.to_string(),
        })?;
        Ok(ExportedFile { filename, csv })
    }
}

fn call_error(url: &str, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = error_detail(status, &body);
            warn!(%url, status, %message, "backend rejected request");
            SourceError::Status { status, message }
        }
        ureq::Error::Transport(transport) => SourceError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, SourceError> {
    response
        .into_json::<T>()
        .map_err(|err| SourceError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
}

/// A listing array, or an empty collection for any other JSON shape.
fn listings_from_value(url: &str, body: Value) -> Result<Vec<Listing>, SourceError> {
    if !body.is_array() {
        warn!(%url, "listing response was not an array; treating as empty");
        return Ok(Vec::new());
    }
    serde_json::from_value(body).map_err(|err| SourceError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// The `detail` or `message` field of an error body, else `HTTP <status>`.
fn error_detail(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"]
                .into_iter()
                .find_map(|key| match value.get(key)? {
                    Value::Null => None,
                    Value::String(s) if s.is_empty() => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Extract `filename` from a `Content-Disposition` header value.
fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|name| !name.is_empty())
}
