//! Core types for alma-reports

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a report job (8 random alphanumeric characters)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a fresh random job id
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        Self(id)
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle status of a report job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, background task not started yet
    Pending,
    /// Fetch in progress
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled by the user (bookkeeping only; the fetch is not interrupted)
    Cancelled,
}

impl JobStatus {
    /// Whether the job is still pending or running
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// One asynchronous report run tracked by the [`crate::jobs::JobTracker`]
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier
    pub id: JobId,
    /// Name of the task this job runs
    pub task_name: String,
    /// Whether the run uses the test output/log locations and row cap
    pub test_mode: bool,
    /// Current status
    pub status: JobStatus,
    /// When the job was created
    pub started_at: DateTime<Utc>,
    /// When the job reached a terminal status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Rows fetched so far (final count once completed)
    pub rows_fetched: u64,
    /// Output file written by a completed run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// Failure message for a failed run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Last progress message reported by the fetch loop
    pub progress_message: String,
    /// True when a page request failed mid-fetch and the output holds partial results
    pub truncated: bool,
}

/// Event emitted during a report job's lifecycle
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job created and queued for execution
    JobQueued {
        /// Job identifier
        id: JobId,
        /// Task the job runs
        task_name: String,
        /// Test-mode flag
        test_mode: bool,
    },

    /// Background execution started
    JobStarted {
        /// Job identifier
        id: JobId,
    },

    /// Progress update from the fetch loop
    JobProgress {
        /// Job identifier
        id: JobId,
        /// Rows fetched so far
        rows_fetched: u64,
        /// Human-readable status message
        message: String,
    },

    /// Run finished successfully
    JobCompleted {
        /// Job identifier
        id: JobId,
        /// Output file written
        output_file: PathBuf,
        /// Total rows written
        rows_fetched: u64,
        /// Whether the fetch ended early on a failed page
        truncated: bool,
    },

    /// Run failed
    JobFailed {
        /// Job identifier
        id: JobId,
        /// Failure message
        error: String,
    },

    /// Job cancelled (bookkeeping only)
    JobCancelled {
        /// Job identifier
        id: JobId,
    },
}

/// One column of a report: internal key plus display heading
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    /// Internal column identifier from the schema document
    pub key: String,
    /// Human-readable heading (falls back to the key when absent)
    pub heading: String,
}

/// Ordered column key -> display heading mapping
///
/// Order is authoritative for output and mirrors the schema document's
/// element order. Keys are unique; the first occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<Column>,
}

impl ColumnMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, ignoring duplicate keys
    pub fn push(&mut self, key: impl Into<String>, heading: impl Into<String>) {
        let key = key.into();
        if self.columns.iter().any(|c| c.key == key) {
            return;
        }
        self.columns.push(Column {
            key,
            heading: heading.into(),
        });
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the mapping has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over columns in output order
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Display headings in output order
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.heading.as_str())
    }

    /// Column keys in output order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}

impl<'a> IntoIterator for &'a ColumnMapping {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// One decoded data row: column key -> nullable cell value
pub type RowRecord = HashMap<String, Option<String>>;

/// Tabular output format
///
/// A closed enum: unrecognized format strings are rejected when task
/// configuration is parsed, instead of silently falling back to CSV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Excel workbook, single worksheet
    #[default]
    Xlsx,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            other => Err(crate::error::Error::Config {
                message: format!("unknown output format '{other}'"),
                key: Some("output_format".into()),
            }),
        }
    }
}

/// Result of fully materializing a row stream
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// All rows yielded before the stream ended
    pub rows: Vec<RowRecord>,
    /// True when a page request failed and the rows are partial
    pub truncated: bool,
}

/// Result of a successful report run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Path of the output file that was written
    pub output_file: PathBuf,
    /// Total rows written to the output file
    pub rows_fetched: u64,
    /// True when the fetch ended early on a failed page (partial results)
    pub truncated: bool,
}
