//! HTTP access to the search endpoint.
//!
//! The module uses a trait-based design so the run loop can be driven by
//! something other than the network:
//! - [`SearchApi`]: Core trait, one GET per call
//! - [`HttpSearchApi`]: The real implementation on top of `reqwest`
//!
//! # Fetch contract
//!
//! A response contributes rows only when its status is `200` *and* its
//! `Content-Type` starts with `application/json` *and* the body is an object
//! with a `matches` array; entries of that array that are not objects are
//! skipped individually. Anything else becomes a non-`Matches`
//! [`FetchOutcome`], which callers treat as "no rows for this window".
//! Transport faults (DNS, refused connection, client timeout) are returned as
//! errors and are not retried.

use crate::error::Result;
use crate::models::Record;
use crate::utils::truncate_for_log;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// What a single search request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A well-formed response; may be empty.
    Matches(Vec<Record>),
    /// Status other than `200`.
    BadStatus(u16),
    /// `200`, but the content type was missing or not JSON.
    NotJson(Option<String>),
    /// JSON content type, but the body could not be read as `{"matches": [...]}`.
    Malformed(String),
}

impl FetchOutcome {
    /// Rows this outcome contributes to the table.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            FetchOutcome::Matches(rows) => rows,
            _ => Vec::new(),
        }
    }

    /// Whether the response was unusable, as opposed to merely empty.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, FetchOutcome::Matches(_))
    }

    /// Classify a response from its status, content type and body.
    pub fn from_response(status: u16, content_type: Option<&str>, body: &str) -> Self {
        if status != StatusCode::OK.as_u16() {
            return FetchOutcome::BadStatus(status);
        }
        let is_json = content_type
            .map(|ct| ct.trim().starts_with("application/json"))
            .unwrap_or(false);
        if !is_json {
            return FetchOutcome::NotJson(content_type.map(str::to_string));
        }
        parse_matches(body)
    }
}

fn parse_matches(body: &str) -> FetchOutcome {
    let mut payload: serde_json::Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => {
            return FetchOutcome::Malformed(format!(
                "{e}; body: {}",
                truncate_for_log(body, 200)
            ));
        }
    };

    match payload.get_mut("matches").map(serde_json::Value::take) {
        Some(serde_json::Value::Array(items)) => {
            let mut records = Vec::with_capacity(items.len());
            for (position, item) in items.into_iter().enumerate() {
                match item {
                    serde_json::Value::Object(record) => records.push(record),
                    other => warn!(
                        position,
                        entry = %truncate_for_log(&other.to_string(), 200),
                        "Skipping non-object entry in matches"
                    ),
                }
            }
            FetchOutcome::Matches(records)
        }
        Some(_) => FetchOutcome::Malformed("`matches` is not an array".to_string()),
        None => FetchOutcome::Malformed("response has no `matches` field".to_string()),
    }
}

/// A search backend that answers one URL at a time.
pub trait SearchApi {
    /// Issue a GET for `url` and classify the response.
    async fn search(&self, url: &str) -> Result<FetchOutcome>;
}

/// [`SearchApi`] over HTTP.
///
/// No timeout is configured beyond `reqwest`'s defaults.
#[derive(Debug, Clone, Default)]
pub struct HttpSearchApi {
    client: reqwest::Client,
}

impl HttpSearchApi {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl SearchApi for HttpSearchApi {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn search(&self, url: &str) -> Result<FetchOutcome> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(
            status,
            content_type = content_type.as_deref().unwrap_or(""),
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search response received"
        );
        Ok(FetchOutcome::from_response(
            status,
            content_type.as_deref(),
            &body,
        ))
    }
}
