//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for managing report tasks,
//! starting runs, tracking jobs, and browsing run logs.

use crate::{Config, ReportFetcher, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `GET /api/v1/tasks` - List configured tasks
/// - `GET /api/v1/tasks/:name` - Get single task
/// - `POST /api/v1/tasks` - Create task
/// - `PUT /api/v1/tasks/:name` - Replace task settings
/// - `DELETE /api/v1/tasks/:name` - Delete task
///
/// ## Jobs
/// - `POST /api/v1/reports/run` - Start a report run
/// - `GET /api/v1/reports/jobs` - List jobs (newest first)
/// - `GET /api/v1/reports/jobs/:id` - Get single job
/// - `POST /api/v1/reports/jobs/:id/cancel` - Cancel a pending/running job
///
/// ## Logs
/// - `GET /api/v1/logs/:task_name` - List a task's run log files
/// - `GET /api/v1/logs/:task_name/:filename` - Read (the tail of) a log file
///
/// ## System
/// - `GET /health` and `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /api/v1/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(fetcher: Arc<ReportFetcher>, config: Arc<Config>) -> Router {
    let state = AppState::new(fetcher, config.clone());

    let api = Router::new()
        // Tasks
        .route("/tasks", get(routes::list_tasks))
        .route("/tasks", post(routes::create_task))
        .route("/tasks/:name", get(routes::get_task))
        .route("/tasks/:name", put(routes::update_task))
        .route("/tasks/:name", delete(routes::delete_task))
        // Jobs
        .route("/reports/run", post(routes::run_report))
        .route("/reports/jobs", get(routes::list_jobs))
        .route("/reports/jobs/:id", get(routes::get_job))
        .route("/reports/jobs/:id/cancel", post(routes::cancel_job))
        // Logs
        .route("/logs/:task_name", get(routes::list_task_logs))
        .route("/logs/:task_name/:filename", get(routes::read_task_log))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Bare /health for load balancers alongside the versioned prefix
    let router = Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health_check));

    // Merge Swagger UI routes if enabled in config (before applying state).
    // The UI loads the spec from its own URL to avoid clashing with the
    // /api/v1/openapi.json route defined above.
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply CORS middleware if enabled in config
    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Allows the specified origins, all methods, and all headers; "*" in the
/// list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Creates a TCP listener, binds it to the configured address, and serves
/// the API router until the server stops.
///
/// # Example
///
/// ```no_run
/// use alma_reports::{Config, ReportFetcher};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let fetcher = Arc::new(ReportFetcher::new((*config).clone()).await?);
///
/// // Start API server (blocks until shutdown)
/// alma_reports::api::start_api_server(fetcher, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(fetcher: Arc<ReportFetcher>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(fetcher, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
