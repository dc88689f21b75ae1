//! JSON-file-backed task configuration store
//!
//! Tasks are stored as one JSON object keyed by task name. The on-disk field
//! names are the uppercase keys the standalone fetch script used
//! (`ALMA_REPORT_PATH`, `OUTPUT_PATH`, ...), so an existing config file keeps
//! working; the API-facing [`Task`] model uses snake_case fields.

use crate::error::{Error, Result};
use crate::types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// How often a task is meant to run (stored metadata; no scheduler executes it)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Run once a day
    #[default]
    Daily,
    /// Run once a week
    Weekly,
}

/// Task settings without the name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskSpec {
    /// Report path on the analytics server (percent-escaped)
    pub report_path: String,
    /// Directory the output file is written to
    pub output_path: PathBuf,
    /// Output file name (joined onto the output directory)
    pub output_file_name: String,
    /// Output format (default: xlsx)
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Directory for per-run log files
    pub log_dir: PathBuf,
    /// Output directory used in test mode (falls back to `output_path`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_output_path: Option<PathBuf>,
    /// Log directory used in test mode (no fallback: absent means no run log)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_log_dir: Option<PathBuf>,
    /// Row cap applied in test mode; absent means unbounded even in test mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_row_limit: Option<u64>,
    /// Intended run frequency (default: daily)
    #[serde(default)]
    pub frequency: Frequency,
    /// Whether the task is active (default: true)
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A named task as exposed over the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Task name (the key in the configuration file)
    pub name: String,
    /// Task settings
    #[serde(flatten)]
    pub spec: TaskSpec,
}

/// On-disk task representation with the legacy uppercase keys
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredTask {
    #[serde(rename = "ALMA_REPORT_PATH", default)]
    report_path: String,
    #[serde(rename = "OUTPUT_PATH", default)]
    output_path: PathBuf,
    #[serde(rename = "OUTPUT_FILE_NAME", default)]
    output_file_name: String,
    #[serde(rename = "OUTPUT_FORMAT", default)]
    output_format: OutputFormat,
    #[serde(rename = "LOG_DIR", default)]
    log_dir: PathBuf,
    #[serde(
        rename = "TEST_OUTPUT_PATH",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    test_output_path: Option<PathBuf>,
    #[serde(
        rename = "TEST_LOG_DIR",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    test_log_dir: Option<PathBuf>,
    #[serde(
        rename = "TEST_ROW_LIMIT",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    test_row_limit: Option<u64>,
    #[serde(rename = "FREQUENCY", default)]
    frequency: Frequency,
    #[serde(rename = "ACTIVE", default = "default_true")]
    active: bool,
}

impl From<TaskSpec> for StoredTask {
    fn from(spec: TaskSpec) -> Self {
        Self {
            report_path: spec.report_path,
            output_path: spec.output_path,
            output_file_name: spec.output_file_name,
            output_format: spec.output_format,
            log_dir: spec.log_dir,
            test_output_path: spec.test_output_path,
            test_log_dir: spec.test_log_dir,
            test_row_limit: spec.test_row_limit,
            frequency: spec.frequency,
            active: spec.active,
        }
    }
}

impl From<StoredTask> for TaskSpec {
    fn from(stored: StoredTask) -> Self {
        Self {
            report_path: stored.report_path,
            output_path: stored.output_path,
            output_file_name: stored.output_file_name,
            output_format: stored.output_format,
            log_dir: stored.log_dir,
            test_output_path: stored.test_output_path,
            test_log_dir: stored.test_log_dir,
            test_row_limit: stored.test_row_limit,
            frequency: stored.frequency,
            active: stored.active,
        }
    }
}

fn default_true() -> bool {
    true
}

/// CRUD store over the JSON task configuration file
///
/// Reads re-read the file so external edits are picked up; writes are
/// serialized behind a mutex.
pub struct TaskStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TaskStore {
    /// Open the store, creating an empty config file if none exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&path, b"{}").await?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, StoredTask>> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_all(&self, tasks: &BTreeMap<String, StoredTask>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(tasks)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    /// List all tasks
    pub async fn list(&self) -> Result<Vec<Task>> {
        let tasks = self.read_all().await?;
        Ok(tasks
            .into_iter()
            .map(|(name, stored)| Task {
                name,
                spec: stored.into(),
            })
            .collect())
    }

    /// Look up one task by name
    pub async fn get(&self, name: &str) -> Result<Option<Task>> {
        let mut tasks = self.read_all().await?;
        Ok(tasks.remove(name).map(|stored| Task {
            name: name.to_string(),
            spec: stored.into(),
        }))
    }

    /// Create a new task; fails if the name is taken
    pub async fn create(&self, task: Task) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.read_all().await?;
        if tasks.contains_key(&task.name) {
            return Err(Error::TaskExists(task.name));
        }
        tasks.insert(task.name.clone(), task.spec.clone().into());
        self.write_all(&tasks).await?;
        Ok(task)
    }

    /// Replace an existing task's settings; `None` if the task does not exist
    pub async fn update(&self, name: &str, spec: TaskSpec) -> Result<Option<Task>> {
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.read_all().await?;
        if !tasks.contains_key(name) {
            return Ok(None);
        }
        tasks.insert(name.to_string(), spec.clone().into());
        self.write_all(&tasks).await?;
        Ok(Some(Task {
            name: name.to_string(),
            spec,
        }))
    }

    /// Delete a task; returns whether it existed
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.read_all().await?;
        if tasks.remove(name).is_none() {
            return Ok(false);
        }
        self.write_all(&tasks).await?;
        Ok(true)
    }
}
