//! HTTP client for the analytics reports endpoint
//!
//! Every page request goes to the same URL with a varying query string:
//! `path` identifies the report, `limit` the page size, and `token` resumes
//! a paginated fetch. Responses are a JSON envelope whose `anies` array
//! carries the XML payload as a string.

use crate::types::ColumnMapping;
use serde::Deserialize;
use std::time::Duration;

use super::xml;

/// Outcome of one page request
#[derive(Debug)]
pub(crate) enum PageResult {
    /// The envelope carried an XML payload
    Payload(String),
    /// The request succeeded but the envelope had no payload
    Empty,
    /// The request failed (transport error, non-2xx status, or bad JSON)
    Failed,
}

/// JSON envelope wrapping the XML payload
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    anies: Vec<String>,
}

/// Client for one analytics endpoint with a fixed credential
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AnalyticsClient {
    /// Create a client for `base_url` authenticating with `api_key`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            http: builder.build().unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch one page of a report
    ///
    /// Every page passes `report_path` and `limit`; resumed pages add the
    /// resumption token from the first page. Failures never bubble up as
    /// errors here: the pager treats a [`PageResult::Failed`] as a
    /// truncation point.
    pub(crate) async fn fetch_page(
        &self,
        report_path: &str,
        limit: Option<usize>,
        token: Option<&str>,
    ) -> PageResult {
        // Stored paths may arrive percent-encoded; the transport re-encodes
        let path = urlencoding::decode(report_path)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| report_path.to_string());

        let mut query: Vec<(&str, String)> = vec![("path", path)];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(token) = token {
            query.push(("token", token.to_string()));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .header("Authorization", format!("apikey {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(report_path, error = %e, "page request failed");
                return PageResult::Failed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(report_path, %status, body, "page request returned an error status");
            return PageResult::Failed;
        }

        let envelope: Envelope = match response.json().await {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(report_path, error = %e, "page response was not a valid envelope");
                return PageResult::Failed;
            }
        };

        match envelope.anies.into_iter().find(|p| !p.is_empty()) {
            Some(payload) => PageResult::Payload(payload),
            None => PageResult::Empty,
        }
    }

    /// Resolve the column headers of a report
    ///
    /// Degrades to an empty mapping on any failure; the runner decides
    /// whether an empty mapping is fatal for the operation at hand.
    pub async fn resolve_headers(&self, report_path: &str) -> ColumnMapping {
        let payload = match self.fetch_page(report_path, None, None).await {
            PageResult::Payload(p) => p,
            PageResult::Empty => {
                tracing::warn!(report_path, "header response carried no schema payload");
                return ColumnMapping::new();
            }
            PageResult::Failed => return ColumnMapping::new(),
        };

        match xml::parse_schema(&payload) {
            Ok(mapping) => {
                tracing::debug!(report_path, columns = mapping.len(), "resolved report headers");
                mapping
            }
            Err(e) => {
                tracing::error!(report_path, error = %e, "schema payload failed to parse");
                ColumnMapping::new()
            }
        }
    }
}
