//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture builds the real router over [`MockTicketProvider`],
//! [`MockRepository`] and [`MockMetadataIndex`], so every HTTP scenario runs
//! without a repository or database.
//!
//! # Example
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_search() {
//!     let fixture = TestFixture::new();
//!
//!     let response = fixture
//!         .post("/api/v1/documents/search", json!({ "tax_id": "20218874-5" }))
//!         .await;
//!
//!     assert_eq!(response.status, 404);
//! }
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use docvault_core::{
    create_authenticator, load_config_from_str, AuthMethod,
    testing::{MockMetadataIndex, MockRepository, MockTicketProvider},
};
use docvault_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use docvault_core::testing::fixtures;

pub const API_KEY: &str = "test-caller-key";

const BASE_CONFIG: &str = r#"
[auth]
method = "none"

[repository]
url = "http://repository.test/api"
api_key = "repo-key"

[principal]
user_id = "svc-docvault"
password = "pw"
"#;

/// Test fixture with controllable mocks.
pub struct TestFixture {
    pub router: Router,
    pub tickets: Arc<MockTicketProvider>,
    pub repository: Arc<MockRepository>,
    pub index: Arc<MockMetadataIndex>,
    api_key: Option<String>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Require this caller key on API routes
    pub api_key: Option<String>,
    pub restrict_content_types: bool,
    pub batch_concurrency: Option<usize>,
    pub max_batch_size: Option<usize>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let mut config = load_config_from_str(BASE_CONFIG).expect("Invalid base config");
        if let Some(key) = &test_config.api_key {
            config.auth.method = AuthMethod::ApiKey;
            config.auth.api_key = Some(key.clone());
        }
        config.ingestion.restrict_content_types = test_config.restrict_content_types;
        if let Some(n) = test_config.batch_concurrency {
            config.ingestion.batch_concurrency = n;
        }
        if let Some(n) = test_config.max_batch_size {
            config.ingestion.max_batch_size = n;
        }

        let tickets = Arc::new(MockTicketProvider::new());
        let repository = Arc::new(MockRepository::new());
        let index = Arc::new(MockMetadataIndex::new());

        let authenticator = create_authenticator(&config.auth).expect("Invalid auth config");
        let state = Arc::new(AppState::new(
            config,
            authenticator,
            tickets.clone(),
            repository.clone(),
            index.clone(),
        ));

        Self {
            router: create_router(state),
            tickets,
            repository,
            index,
            api_key: test_config.api_key,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(self.builder("GET", path).body(Body::empty()).unwrap())
            .await
    }

    /// POST a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let request = self
            .builder("POST", path)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    /// POST a raw body (for malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = self
            .builder("POST", path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart form. Each part is (name, optional file name, content).
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: &[(&str, Option<&str>, &[u8])],
    ) -> TestResponse {
        const BOUNDARY: &str = "docvault-test-boundary";

        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = self
            .builder("POST", path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    /// Send a request as-is, without the fixture's caller key.
    pub async fn send_unauthenticated(&self, request: Request<Body>) -> TestResponse {
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

impl TestConfig {
    pub fn with_api_key() -> Self {
        Self {
            api_key: Some(API_KEY.to_string()),
            ..Default::default()
        }
    }
}

/// Metadata as a JSON value, ready for request bodies.
pub fn metadata_json() -> Value {
    serde_json::to_value(fixtures::valid_metadata()).unwrap()
}
