//! Report run and job tracking handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::Job;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::{ListJobsQuery, RunRequest};

/// POST /reports/run - Start a report run
#[utoipa::path(
    post,
    path = "/api/v1/reports/run",
    tag = "jobs",
    request_body(content = RunRequest, description = "Task to run and mode"),
    responses(
        (status = 202, description = "Run queued; returns the pending job", body = Job),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn run_report(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<(StatusCode, Json<Job>), Error> {
    let job = state
        .fetcher
        .run_task(&request.task_name, request.test_mode)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /reports/jobs - List jobs, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reports/jobs",
    tag = "jobs",
    params(("limit" = Option<usize>, Query, description = "Maximum number of jobs to return (default: 50)")),
    responses(
        (status = 200, description = "Jobs, newest first", body = Vec<Job>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Json<Vec<Job>> {
    let jobs = state.fetcher.jobs.list(query.limit.unwrap_or(50)).await;
    Json(jobs)
}

/// GET /reports/jobs/:id - Get a single job
#[utoipa::path(
    get,
    path = "/api/v1/reports/jobs/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job", body = Job),
        (status = 404, description = "Job not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, Error> {
    let job = state
        .fetcher
        .jobs
        .get(&id)
        .await
        .ok_or(Error::JobNotFound(id))?;
    Ok(Json(job))
}

/// POST /reports/jobs/:id/cancel - Cancel a pending or running job
#[utoipa::path(
    post,
    path = "/api/v1/reports/jobs/{id}/cancel",
    tag = "jobs",
    params(("id" = String, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job cancelled"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is not in a cancellable state"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let job = state.fetcher.cancel_job(&id).await?;
    Ok(Json(json!({
        "message": "Job cancelled",
        "job": job,
    })))
}
