//! Pull-based row stream over the paginated analytics endpoint
//!
//! [`RowStream`] buffers one page at a time and yields rows one by one,
//! following resumption tokens until the service marks the fetch finished,
//! the row cap is reached, or a page fails. A failed page ends the stream
//! with the rows already yielded and sets the truncated flag, so partial
//! output is still written but never mistaken for a complete run.

use crate::types::{FetchOutcome, RowRecord};
use std::collections::VecDeque;

use super::client::{AnalyticsClient, PageResult};
use super::xml;

/// Callback invoked with (rows yielded so far, progress message)
pub type ProgressFn = Box<dyn Fn(u64, String) + Send + Sync>;

/// Parameters of one paginated fetch
pub struct FetchParams {
    /// Report path on the analytics server
    pub report_path: String,
    /// Rows requested per page
    pub page_size: usize,
    /// Stop after this many rows; None fetches everything
    pub max_rows: Option<u64>,
    /// Invoke the progress callback every N yielded rows
    pub progress_interval: u64,
    /// Optional progress callback
    pub progress: Option<ProgressFn>,
}

/// One in-flight paginated fetch
pub struct RowStream<'a> {
    client: &'a AnalyticsClient,
    params: FetchParams,
    token: Option<String>,
    buffered: VecDeque<RowRecord>,
    no_more_pages: bool,
    truncated: bool,
    yielded: u64,
}

impl<'a> RowStream<'a> {
    /// Start a fetch; no request is made until the first row is pulled
    pub fn new(client: &'a AnalyticsClient, params: FetchParams) -> Self {
        Self {
            client,
            params,
            token: None,
            buffered: VecDeque::new(),
            no_more_pages: false,
            truncated: false,
            yielded: 0,
        }
    }

    /// Pull the next row, fetching the next page when the buffer runs dry
    pub async fn next_row(&mut self) -> Option<RowRecord> {
        loop {
            if let Some(row) = self.buffered.pop_front() {
                self.yielded += 1;
                if self.params.progress_interval > 0
                    && self.yielded % self.params.progress_interval == 0
                {
                    if let Some(progress) = &self.params.progress {
                        progress(self.yielded, format!("Fetched {} rows...", self.yielded));
                    }
                }
                if let Some(max) = self.params.max_rows {
                    if self.yielded >= max {
                        self.buffered.clear();
                        self.no_more_pages = true;
                    }
                }
                return Some(row);
            }

            if self.no_more_pages {
                return None;
            }
            self.fetch_next_page().await;
        }
    }

    /// Drain the stream into a [`FetchOutcome`]
    pub async fn collect(mut self) -> FetchOutcome {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await {
            rows.push(row);
        }
        FetchOutcome {
            rows,
            truncated: self.truncated,
        }
    }

    /// Whether a page failure cut the stream short
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Rows yielded so far
    pub fn rows_yielded(&self) -> u64 {
        self.yielded
    }

    async fn fetch_next_page(&mut self) {
        // Every page repeats the limit; without it the service falls back
        // to its default page size on resumed requests.
        let result = self
            .client
            .fetch_page(
                &self.params.report_path,
                Some(self.params.page_size),
                self.token.as_deref(),
            )
            .await;

        let payload = match result {
            PageResult::Payload(p) => p,
            PageResult::Empty => {
                tracing::warn!(
                    report_path = %self.params.report_path,
                    "page carried no payload, ending fetch"
                );
                self.no_more_pages = true;
                return;
            }
            PageResult::Failed => {
                self.truncated = true;
                self.no_more_pages = true;
                return;
            }
        };

        let page = match xml::parse_rowset(&payload) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(
                    report_path = %self.params.report_path,
                    error = %e,
                    "rowset payload failed to parse"
                );
                self.truncated = true;
                self.no_more_pages = true;
                return;
            }
        };

        self.buffered.extend(page.rows);

        if page.finished {
            self.no_more_pages = true;
        } else if let Some(token) = page.token {
            self.token = Some(token);
        } else if self.token.is_none() {
            // The first page must carry a token to resume with; stop rather
            // than re-request it forever. Follow-up pages omit the token and
            // the fetch keeps resuming with the one already held.
            tracing::warn!(
                report_path = %self.params.report_path,
                "unfinished page without a resumption token, ending fetch"
            );
            self.no_more_pages = true;
        }
    }
}
