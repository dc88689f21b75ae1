//! Task configuration handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::tasks::{Task, TaskSpec};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET /tasks - List configured tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "All configured tasks", body = Vec<Task>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, Error> {
    let tasks = state.fetcher.tasks.list().await?;
    Ok(Json(tasks))
}

/// GET /tasks/:name - Get a single task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{name}",
    tag = "tasks",
    params(("name" = String, Path, description = "Task name")),
    responses(
        (status = 200, description = "The task configuration", body = Task),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Task>, Error> {
    let task = state
        .fetcher
        .tasks
        .get(&name)
        .await?
        .ok_or(Error::TaskNotFound(name))?;
    Ok(Json(task))
}

/// POST /tasks - Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "tasks",
    request_body(content = Task, description = "Task to create"),
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 409, description = "A task with this name already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), Error> {
    let created = state.fetcher.tasks.create(task).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /tasks/:name - Replace a task's settings
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{name}",
    tag = "tasks",
    params(("name" = String, Path, description = "Task name")),
    request_body(content = TaskSpec, description = "New task settings"),
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(spec): Json<TaskSpec>,
) -> Result<Json<Task>, Error> {
    let updated = state
        .fetcher
        .tasks
        .update(&name, spec)
        .await?
        .ok_or(Error::TaskNotFound(name))?;
    Ok(Json(updated))
}

/// DELETE /tasks/:name - Delete a task
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{name}",
    tag = "tasks",
    params(("name" = String, Path, description = "Task name")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, Error> {
    if state.fetcher.tasks.delete(&name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::TaskNotFound(name))
    }
}
