//! Common test utilities for driving the HTTP API in-process.
//!
//! The fixture wires a real SQLite ticket store (in a temp dir) with a
//! scripted classifier, so tests control exactly what the classifier says.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use triage_core::{
    categorizer::LlmClient,
    config::{CategorizerConfig, DatabaseConfig},
    testing::{MockLlmClient, MockReply},
    Categorizer, Config, SqliteTicketStore, TicketStore,
};
use triage_server::state::AppState;

/// Helper to assert response status with helpful error message.
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

/// Re-export fixtures for test convenience
pub use triage_core::testing::fixtures;

/// In-process server with a controllable classifier.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock classifier; with no scripted replies every call fails
    pub classifier: Arc<MockLlmClient>,
    /// Direct access to the store behind the API
    pub store: Arc<SqliteTicketStore>,
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
    /// Fixture whose classifier fails until a reply is scripted.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Fixture with no classifier at all (keyword scoring only).
    pub fn keywords_only() -> Self {
        Self::build(false)
    }

    fn build(with_classifier: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            categorizer: CategorizerConfig {
                // No backoff so failing classifiers don't slow the suite
                retry_delay_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let store =
            Arc::new(SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"));
        let classifier = Arc::new(MockLlmClient::new());

        let mut categorizer = Categorizer::new(config.categorizer.clone());
        if with_classifier {
            categorizer = categorizer.with_client(Arc::clone(&classifier) as Arc<dyn LlmClient>);
        }

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn TicketStore>,
            Arc::new(categorizer),
        ));

        Self {
            router: triage_server::api::create_router(state),
            classifier,
            store,
            temp_dir,
        }
    }

    /// Script the next classifier answer.
    pub fn classifier_says(&self, text: &str) {
        self.classifier.push_reply(MockReply::text(text));
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch the raw text of an endpoint (for non-JSON responses).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
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
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Create a ticket through the API and return its id.
    pub async fn create_ticket(&self, title: &str, description: &str) -> i64 {
        let response = self
            .post(
                "/api/tickets",
                serde_json::json!({
                    "title": title,
                    "description": description,
                    "user_name": "Jordan Doe",
                    "user_email": "jordan@example.com"
                }),
            )
            .await;
        assert_status!(response, StatusCode::CREATED);
        response.body["ticket_id"]
            .as_i64()
            .expect("ticket_id missing")
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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
