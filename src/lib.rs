//! # alma-reports
//!
//! Backend library for fetching Alma Analytics reports.
//!
//! ## Design Philosophy
//!
//! alma-reports is designed to be:
//! - **Library-first** - The REST API is optional, the fetcher is a plain Rust crate
//! - **Event-driven** - Consumers subscribe to job lifecycle events, no polling required
//! - **Resilient** - A failed page mid-fetch still yields the rows collected so far,
//!   flagged as truncated instead of silently passing as complete
//!
//! ## Quick Start
//!
//! ```no_run
//! use alma_reports::{Config, ReportFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = ReportFetcher::new(config).await?;
//!
//!     // Subscribe to job lifecycle events
//!     let mut events = fetcher.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Run a configured task in test mode
//!     let job = fetcher.run_task("loans", true).await?;
//!     println!("Started job {}", job.id);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Report fetching: client, pagination, output encoding, run orchestration
pub mod fetcher;
/// In-memory job tracking
pub mod jobs;
/// Per-run log files and log browsing
pub mod logs;
/// JSON-file-backed task configuration
pub mod tasks;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{AnalyticsConfig, Config, ServerConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use fetcher::{AnalyticsClient, ReportFetcher, RunOptions};
pub use jobs::JobTracker;
pub use tasks::{Frequency, Task, TaskSpec, TaskStore};
pub use types::{
    Column, ColumnMapping, Event, FetchOutcome, Job, JobId, JobStatus, OutputFormat, RowRecord,
    RunOutcome,
};

/// Helper to serve the REST API with graceful signal handling.
///
/// Runs the API server until it stops or a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use alma_reports::{Config, ReportFetcher, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let fetcher = Arc::new(ReportFetcher::new((*config).clone()).await?);
///
///     run_with_shutdown(fetcher, config).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(
    fetcher: std::sync::Arc<ReportFetcher>,
    config: std::sync::Arc<Config>,
) -> Result<()> {
    tokio::select! {
        result = api::start_api_server(fetcher, config) => result,
        _ = wait_for_signal() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
