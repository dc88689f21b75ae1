//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the alma-reports REST
//! API using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the alma-reports REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "alma-reports REST API",
        version = "0.2.0",
        description = "REST API for fetching Alma Analytics reports: task configuration, report runs, job tracking, and run logs",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8600/api/v1", description = "Local development server")
    ),
    paths(
        // Tasks
        crate::api::routes::list_tasks,
        crate::api::routes::get_task,
        crate::api::routes::create_task,
        crate::api::routes::update_task,
        crate::api::routes::delete_task,

        // Jobs
        crate::api::routes::run_report,
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::cancel_job,

        // Logs
        crate::api::routes::list_task_logs,
        crate::api::routes::read_task_log,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::Job,
        crate::types::Event,
        crate::types::OutputFormat,

        // Task types from tasks.rs
        crate::tasks::Task,
        crate::tasks::TaskSpec,
        crate::tasks::Frequency,

        // Log types from logs.rs
        crate::logs::LogFile,
        crate::logs::LogContent,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ServerConfig,
        crate::config::AnalyticsConfig,

        // Request/query types
        crate::api::routes::RunRequest,
        crate::api::routes::ListJobsQuery,
        crate::api::routes::ListLogsQuery,
        crate::api::routes::ReadLogQuery,

        // Error types
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Task configuration management"),
        (name = "jobs", description = "Report runs and job tracking"),
        (name = "logs", description = "Per-run log file browsing"),
        (name = "system", description = "Health, events, and API documentation")
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_and_includes_all_route_groups() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_value(&spec).unwrap();

        let paths = json["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/tasks"));
        assert!(paths.contains_key("/api/v1/tasks/{name}"));
        assert!(paths.contains_key("/api/v1/reports/run"));
        assert!(paths.contains_key("/api/v1/reports/jobs"));
        assert!(paths.contains_key("/api/v1/reports/jobs/{id}/cancel"));
        assert!(paths.contains_key("/api/v1/logs/{task_name}"));
        assert!(paths.contains_key("/api/v1/health"));
        assert!(paths.contains_key("/api/v1/events"));
    }

    #[test]
    fn spec_includes_core_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_value(&spec).unwrap();

        let schemas = json["components"]["schemas"].as_object().unwrap();
        assert!(schemas.contains_key("Job"));
        assert!(schemas.contains_key("JobStatus"));
        assert!(schemas.contains_key("Task"));
        assert!(schemas.contains_key("ApiError"));
    }
}
