//! Log file browsing handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::logs::{self, LogContent, LogFile};
use crate::tasks::TaskSpec;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::path::PathBuf;

use super::{ListLogsQuery, ReadLogQuery};

/// Log directory of a task for the requested mode
///
/// In test mode the directory is the task's `test_log_dir`; absent means
/// test runs of this task write no logs, so there is nothing to browse.
fn log_dir(spec: &TaskSpec, test_mode: bool) -> Option<PathBuf> {
    if test_mode {
        spec.test_log_dir.clone()
    } else {
        Some(spec.log_dir.clone())
    }
}

/// GET /logs/:task_name - List a task's log files
#[utoipa::path(
    get,
    path = "/api/v1/logs/{task_name}",
    tag = "logs",
    params(
        ("task_name" = String, Path, description = "Task name"),
        ("test_mode" = Option<bool>, Query, description = "Browse the test-mode log directory")
    ),
    responses(
        (status = 200, description = "Log files, newest first", body = Vec<LogFile>),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_task_logs(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<Vec<LogFile>>, Error> {
    let task = state
        .fetcher
        .tasks
        .get(&name)
        .await?
        .ok_or(Error::TaskNotFound(name))?;

    let files = match log_dir(&task.spec, query.test_mode) {
        Some(dir) => logs::list_log_files(&dir)?,
        None => Vec::new(),
    };
    Ok(Json(files))
}

/// GET /logs/:task_name/:filename - Read (the tail of) a log file
#[utoipa::path(
    get,
    path = "/api/v1/logs/{task_name}/{filename}",
    tag = "logs",
    params(
        ("task_name" = String, Path, description = "Task name"),
        ("filename" = String, Path, description = "Log file name"),
        ("tail" = Option<usize>, Query, description = "Last N lines to return; 0 for the whole file (default: 500)"),
        ("test_mode" = Option<bool>, Query, description = "Browse the test-mode log directory")
    ),
    responses(
        (status = 200, description = "Log file content", body = LogContent),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "Task or log file not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn read_task_log(
    State(state): State<AppState>,
    Path((name, filename)): Path<(String, String)>,
    Query(query): Query<ReadLogQuery>,
) -> Result<Json<LogContent>, Error> {
    let task = state
        .fetcher
        .tasks
        .get(&name)
        .await?
        .ok_or(Error::TaskNotFound(name))?;

    let dir = log_dir(&task.spec, query.test_mode)
        .ok_or_else(|| Error::NotFound("log directory".to_string()))?;
    let content = logs::read_log_file(&dir, &filename, query.tail.unwrap_or(500))?;
    Ok(Json(content))
}
