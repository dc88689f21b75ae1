use super::*;
use crate::tasks::{Task, TaskSpec};
use crate::types::OutputFormat;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;


/// Router plus the fetcher behind it, backed by a temp directory
async fn test_app() -> (Router, Arc<ReportFetcher>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        tasks_file: dir.path().join("reports_config.json"),
        ..Default::default()
    };
    let fetcher = Arc::new(ReportFetcher::new(config.clone()).await.unwrap());
    let app = create_router(fetcher.clone(), Arc::new(config));
    (app, fetcher, dir)
}

fn sample_task(base: &Path) -> Task {
    Task {
        name: "loans".into(),
        spec: TaskSpec {
            report_path: "%2Fshared%2FLoans".into(),
            output_path: base.join("out"),
            output_file_name: "loans.xlsx".into(),
            output_format: OutputFormat::Xlsx,
            log_dir: base.join("logs"),
            test_output_path: None,
            test_log_dir: None,
            test_row_limit: None,
            frequency: Default::default(),
            active: true,
        },
    }
}

async fn get_req(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn delete_req(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
