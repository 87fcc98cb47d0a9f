//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock upstream injected, enabling E2E testing without reaching
//! PokeAPI.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use nuzdex_core::{
    testing::MockSpeciesSource, Config, DatabaseConfig, ServerConfig, SqliteSpeciesStore,
    SyncConfig,
};

/// Re-export fixtures for test convenience
pub use nuzdex_core::testing::fixtures;

/// Test fixture for E2E testing with a mock upstream.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ensure_species() {
///     let fixture = TestFixture::new().await;
///     fixture.source.add(fixtures::pikachu()).await;
///
///     let response = fixture.post_empty("/api/v1/species/25").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock upstream - configure species and failures
    pub source: Arc<MockSpeciesSource>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let source = Arc::new(MockSpeciesSource::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            sync: SyncConfig {
                delay_ms: test_config.sync_delay_ms,
                not_found_threshold: test_config.not_found_threshold,
                max_consecutive_failures: None,
            },
            ..Default::default()
        };

        let store = Arc::new(
            SqliteSpeciesStore::new(&db_path).expect("Failed to create species store"),
        );

        let state = Arc::new(nuzdex_server::state::AppState::new(
            config,
            Arc::clone(&source) as Arc<dyn nuzdex_core::SpeciesSource>,
            store,
        ));

        let router = nuzdex_server::api::create_router(state);

        Self {
            router,
            source,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Poll a sync job until it leaves the running state.
    pub async fn wait_for_job(&self, job_id: &str) -> TestResponse {
        for _ in 0..300 {
            let response = self.get(&format!("/api/v1/sync/{}", job_id)).await;
            if response.body["status"] != "running" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Sync job {} did not finish in time", job_id);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Delay between sync attempts
    pub sync_delay_ms: u64,
    /// Consecutive not-found results that end a sync
    pub not_found_threshold: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            sync_delay_ms: 0,
            not_found_threshold: 20,
        }
    }
}

impl TestConfig {
    /// Slow syncs down so they can be observed and cancelled.
    pub fn with_delay(sync_delay_ms: u64) -> Self {
        Self {
            sync_delay_ms,
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
