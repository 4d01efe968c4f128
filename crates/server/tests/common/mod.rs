//! Common test utilities for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use transcriber_core::{
    testing::{fixtures::MediaFixture, MockCommandRunner, MockSettingsProvider},
    Config, JobStatus, Transcriber, TranscriberOptions,
};

/// Response from a test request.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Router wired to a transcriber backed by mocks and a fixture tree.
pub struct TestFixture {
    pub router: Router,
    pub transcriber: Transcriber,
    pub runner: MockCommandRunner,
    pub settings: MockSettingsProvider,
    pub media: MediaFixture,
}

impl TestFixture {
    pub fn new() -> Self {
        let media = MediaFixture::new();
        let runner = MockCommandRunner::new();
        let settings = MockSettingsProvider::with_settings(media.settings());

        let mut config = Config::default();
        config.tools = media.pipeline_config();

        let transcriber = Transcriber::new(
            TranscriberOptions::from(&config),
            Arc::new(runner.clone()),
            Arc::new(settings.clone()),
        );

        let state = Arc::new(transcriber_server::state::AppState::new(
            config,
            transcriber.clone(),
        ));
        let router = transcriber_server::api::create_router(state);

        Self {
            router,
            transcriber,
            runner,
            settings,
            media,
        }
    }

    /// Input media path as a JSON string value.
    pub fn input(&self) -> String {
        self.media.input.to_string_lossy().into_owned()
    }

    /// Poll until the job reaches a terminal status and its task is gone.
    pub async fn wait_for_terminal(&self) -> JobStatus {
        for _ in 0..500 {
            let job = self.transcriber.current_job();
            if job.status.is_terminal() && !self.transcriber.has_active_job() {
                return job.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "timed out waiting for terminal status, current job: {:?}",
            self.transcriber.current_job()
        );
    }

    /// Poll until the job reaches `status`.
    pub async fn wait_for_status(&self, status: JobStatus) {
        for _ in 0..500 {
            if self.transcriber.current_job().status == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "timed out waiting for {}, current job: {:?}",
            status,
            self.transcriber.current_job()
        );
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

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
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

    /// Send a GET request and return the raw body text.
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
        (status, String::from_utf8_lossy(&bytes).into_owned())
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
