//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Task configuration management
//! - [`jobs`] - Report runs and job tracking
//! - [`logs`] - Per-run log file browsing
//! - [`system`] - Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod jobs;
mod logs;
mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` continues to work
pub use jobs::*;
pub use logs::*;
pub use system::*;
pub use tasks::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Request body for POST /reports/run
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RunRequest {
    /// Name of the configured task to run
    pub task_name: String,
    /// Use the task's test output/log locations and row cap (default: false)
    #[serde(default)]
    pub test_mode: bool,
}

/// Query parameters for GET /reports/jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ListJobsQuery {
    /// Maximum number of jobs to return, newest first (default: 50)
    pub limit: Option<usize>,
}

/// Query parameters for GET /logs/:task_name
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ListLogsQuery {
    /// Browse the test-mode log directory instead of the production one (default: false)
    #[serde(default)]
    pub test_mode: bool,
}

/// Query parameters for GET /logs/:task_name/:filename
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ReadLogQuery {
    /// Return only the last N lines; 0 returns the whole file (default: 500)
    pub tail: Option<usize>,
    /// Browse the test-mode log directory instead of the production one (default: false)
    #[serde(default)]
    pub test_mode: bool,
}
