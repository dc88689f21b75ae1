//! Configuration types for alma-reports

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Top-level configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// REST API server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote analytics endpoint settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Path of the JSON task configuration file (default: "./reports_config.json")
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            analytics: AnalyticsConfig::default(),
            tasks_file: default_tasks_file(),
        }
    }
}

/// REST API server settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Address the API server binds to (default: 127.0.0.1:8600)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS middleware (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" allows any origin (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve the interactive Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Remote analytics endpoint settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsConfig {
    /// Base URL of the analytics reports endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key (default: "ALMA_PROD_API_KEY")
    ///
    /// The credential is read at run start; a missing variable fails the job
    /// before any network call.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Rows requested per page (default: 1000)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Invoke the progress callback every N yielded rows (default: 100)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Request timeout in seconds; None uses the transport default (no bound)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            page_size: default_page_size(),
            progress_interval: default_progress_interval(),
            request_timeout_secs: None,
        }
    }
}

fn default_tasks_file() -> PathBuf {
    PathBuf::from("./reports_config.json")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8600))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_base_url() -> String {
    "https://api-eu.hosted.exlibrisgroup.com/almaws/v1/analytics/reports".to_string()
}

fn default_api_key_env() -> String {
    "ALMA_PROD_API_KEY".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_progress_interval() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.tasks_file, PathBuf::from("./reports_config.json"));
        assert_eq!(config.analytics.page_size, 1000);
        assert_eq!(config.analytics.progress_interval, 100);
        assert_eq!(config.analytics.api_key_env, "ALMA_PROD_API_KEY");
        assert!(config.analytics.base_url.contains("analytics/reports"));
        assert_eq!(config.analytics.request_timeout_secs, None);
        assert!(config.server.cors_enabled);
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.analytics.page_size, 1000);
        assert_eq!(config.server.bind_address.port(), 8600);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config: Config = serde_json::from_str(
            r#"{"analytics": {"page_size": 25, "request_timeout_secs": 30}}"#,
        )
        .unwrap();
        assert_eq!(config.analytics.page_size, 25);
        assert_eq!(config.analytics.request_timeout_secs, Some(30));
        assert_eq!(config.analytics.progress_interval, 100);
    }
}
