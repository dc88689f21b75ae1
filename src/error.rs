//! Error types for alma-reports
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (configuration, tasks, jobs, remote service)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for alma-reports operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for alma-reports
///
/// This is the primary error type used throughout the library. Each variant
/// includes enough context to produce a human-readable job failure message.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tasks_file")
        key: Option<String>,
    },

    /// The API credential environment variable is not set
    #[error("{var} environment variable not set")]
    MissingApiKey {
        /// Name of the environment variable that was expected
        var: String,
    },

    /// Task not found in the configuration store
    #[error("task '{0}' not found")]
    TaskNotFound(String),

    /// Task with this name already exists
    #[error("task '{0}' already exists")]
    TaskExists(String),

    /// Job not found in the tracker
    #[error("job '{0}' not found")]
    JobNotFound(String),

    /// Job cannot be cancelled in its current state
    #[error("job '{id}' cannot be cancelled in state {status}")]
    JobNotCancellable {
        /// The job id the cancel was attempted on
        id: String,
        /// The status that prevents cancellation (e.g., "completed")
        status: String,
    },

    /// Header resolution produced no columns, so the run cannot proceed
    #[error("no headers found for report '{report_path}'")]
    NoHeaders {
        /// The report path that yielded an empty column mapping
        report_path: String,
    },

    /// Network error talking to the analytics endpoint
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Delimited output encoding failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook output encoding failed
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Requested path is outside the allowed directory
    #[error("invalid file path: {0}")]
    InvalidPath(String),

    /// Generic resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// API error response format
///
/// Returned by API endpoints when an error occurs: a machine-readable code,
/// a human-readable message, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "task_not_found",
///     "message": "task 'circulation' not found"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "task_not_found", "validation_error")
    pub code: String,

    /// Human-readable error message, suitable for displaying to end users
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidPath(_) => 400,

            // 404 Not Found
            Error::TaskNotFound(_) => 404,
            Error::JobNotFound(_) => 404,
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::TaskExists(_) => 409,
            Error::JobNotCancellable { .. } => 409,

            // 500 Internal Server Error
            Error::MissingApiKey { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Csv(_) => 500,
            Error::Xlsx(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - remote analytics service
            Error::NoHeaders { .. } => 502,
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::MissingApiKey { .. } => "missing_api_key",
            Error::TaskNotFound(_) => "task_not_found",
            Error::TaskExists(_) => "task_exists",
            Error::JobNotFound(_) => "job_not_found",
            Error::JobNotCancellable { .. } => "job_not_cancellable",
            Error::NoHeaders { .. } => "no_headers",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Csv(_) => "csv_error",
            Error::Xlsx(_) => "xlsx_error",
            Error::InvalidPath(_) => "invalid_path",
            Error::NotFound(_) => "not_found",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::JobNotCancellable { id, status } => Some(serde_json::json!({
                "job_id": id,
                "status": status,
            })),
            Error::NoHeaders { report_path } => Some(serde_json::json!({
                "report_path": report_path,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a vec of (Error, expected_status_code, expected_error_code) for
    /// every reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("tasks_file".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::InvalidPath("../escape.log".into()),
                400,
                "invalid_path",
            ),
            (
                Error::TaskNotFound("circulation".into()),
                404,
                "task_not_found",
            ),
            (Error::JobNotFound("ab12cd34".into()), 404, "job_not_found"),
            (Error::NotFound("log file 'x.log'".into()), 404, "not_found"),
            (Error::TaskExists("circulation".into()), 409, "task_exists"),
            (
                Error::JobNotCancellable {
                    id: "ab12cd34".into(),
                    status: "completed".into(),
                },
                409,
                "job_not_cancellable",
            ),
            (
                Error::MissingApiKey {
                    var: "ALMA_PROD_API_KEY".into(),
                },
                500,
                "missing_api_key",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (
                Error::NoHeaders {
                    report_path: "/shared/reports/loans".into(),
                },
                502,
                "no_headers",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_status = error.status_code();
            assert_eq!(
                actual_status, expected_status,
                "Error variant with error_code={expected_code} returned status {actual_status}, expected {expected_status}"
            );
        }
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_code = error.error_code();
            assert_eq!(
                actual_code, expected_code,
                "Error variant with expected status={expected_status} returned error_code={actual_code}, expected {expected_code}"
            );
        }
    }

    #[test]
    fn missing_api_key_message_names_the_variable() {
        let err = Error::MissingApiKey {
            var: "ALMA_PROD_API_KEY".into(),
        };
        assert_eq!(
            err.to_string(),
            "ALMA_PROD_API_KEY environment variable not set"
        );
    }

    #[test]
    fn no_headers_message_names_the_report() {
        let err = Error::NoHeaders {
            report_path: "/shared/reports/loans".into(),
        };
        assert!(err.to_string().contains("no headers found"));
        assert!(err.to_string().contains("/shared/reports/loans"));
    }

    #[test]
    fn api_error_from_job_not_cancellable_has_id_and_status() {
        let err = Error::JobNotCancellable {
            id: "ab12cd34".into(),
            status: "completed".into(),
        };
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "job_not_cancellable");
        let details = api.error.details.expect("should have details");
        assert_eq!(details["job_id"], "ab12cd34");
        assert_eq!(details["status"], "completed");
    }

    #[test]
    fn api_error_from_no_headers_has_report_path() {
        let err = Error::NoHeaders {
            report_path: "/shared/reports/loans".into(),
        };
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "no_headers");
        let details = api.error.details.expect("should have details");
        assert_eq!(details["report_path"], "/shared/reports/loans");
    }

    #[test]
    fn api_error_from_task_not_found_has_no_details() {
        let err = Error::TaskNotFound("circulation".into());
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "task_not_found");
        assert!(api.error.details.is_none());
    }

    #[test]
    fn api_error_message_matches_error_display() {
        let err = Error::TaskExists("circulation".into());
        let display_msg = err.to_string();
        let api: ApiError = err.into();

        assert_eq!(api.error.message, display_msg);
    }

    #[test]
    fn api_error_without_details_omits_details_in_json() {
        let api = ApiError::new("test_code", "test message");

        let json_str = serde_json::to_string(&api).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(parsed["error"]["code"], "test_code");
        assert_eq!(parsed["error"]["message"], "test message");
        assert!(
            parsed["error"].get("details").is_none(),
            "details field should be omitted from JSON when None"
        );
    }

    #[test]
    fn api_error_factories_produce_expected_codes() {
        assert_eq!(ApiError::not_found("Job 'x'").error.code, "not_found");
        assert_eq!(
            ApiError::validation("name is required").error.code,
            "validation_error"
        );
        assert_eq!(ApiError::internal("boom").error.code, "internal_error");
    }
}
