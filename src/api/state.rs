//! Application state for the API server

use crate::{Config, ReportFetcher};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones) and provides access to the
/// report fetcher and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The report fetcher coordinating task configuration and job runs
    pub fetcher: Arc<ReportFetcher>,

    /// Configuration (read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: Arc<ReportFetcher>, config: Arc<Config>) -> Self {
        Self { fetcher, config }
    }
}
