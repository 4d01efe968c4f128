//! API integration tests.
//!
//! The router is exercised in-process with `oneshot`; the transcriber behind
//! it runs against a mock command runner and an in-memory settings provider.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use transcriber_core::{
    testing::{fixtures, ScriptedCommand},
    JobStatus,
};

use common::TestFixture;

// =============================================================================
// Health and config
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_returns_effective_config() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["server"]["port"], 8080);
    assert_eq!(response.body["tools"]["ffmpeg_path"], "ffmpeg");
    assert_eq!(response.body["tools"]["whisper_path"], "whisper.cpp");
    assert_eq!(response.body["events"]["capacity"], 1000);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/nope").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Jobs
// =============================================================================

#[tokio::test]
async fn test_current_job_is_idle_initially() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/jobs/current").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], "");
    assert_eq!(response.body["status"], "idle");
}

#[tokio::test]
async fn test_start_job_runs_to_completion() {
    let fixture = TestFixture::new();
    fixtures::script_success(&fixture.runner, "  hello from the clip \n").await;

    let response = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["status"], "preprocessing");
    let job_id = response.body["id"].as_str().unwrap().to_string();
    assert!(job_id.starts_with("job-"));

    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Done);

    let current = fixture.get("/api/v1/jobs/current").await;
    assert_eq!(current.body["id"], job_id.as_str());
    assert_eq!(current.body["status"], "done");

    let events = fixture.get("/api/v1/jobs/events").await;
    assert_eq!(events.status, StatusCode::OK);
    let events = events.body.as_array().unwrap().clone();

    let result = events
        .iter()
        .find(|e| e["type"] == "result")
        .expect("result event");
    let text_path = fixture.media.output_dir.join("clip.txt");
    assert_eq!(result["textPath"], text_path.to_string_lossy().as_ref());
    assert_eq!(result["jobId"], job_id.as_str());
    assert!(text_path.exists());

    let logs: Vec<_> = events.iter().filter(|e| e["type"] == "log").collect();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["command"], "ffmpeg");
    assert_eq!(logs[1]["command"], "whisper.cpp");
    assert_eq!(logs[1]["exitCode"], 0);

    assert!(events.iter().all(|e| e["type"] != "error"));
}

#[tokio::test]
async fn test_start_job_while_running_returns_conflict() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .script("ffmpeg", ScriptedCommand::block_until_cancelled())
        .await;

    let first = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    assert_eq!(first.status, StatusCode::ACCEPTED);

    let second = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "job already running");

    // The original job is unaffected
    let current = fixture.get("/api/v1/jobs/current").await;
    assert_eq!(current.body["id"], first.body["id"]);

    fixture.post_empty("/api/v1/jobs/cancel").await;
    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_running_job() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .script("ffmpeg", ScriptedCommand::block_until_cancelled())
        .await;

    let started = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    assert_eq!(started.status, StatusCode::ACCEPTED);
    fixture.wait_for_status(JobStatus::Preprocessing).await;

    let response = fixture.post_empty("/api/v1/jobs/cancel").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cancelled"], true);

    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Cancelled);

    let events = fixture.get("/api/v1/jobs/events").await;
    let events = events.body.as_array().unwrap().clone();
    let cancelled: Vec<_> = events
        .iter()
        .filter(|e| e["type"] == "status" && e["status"] == "cancelled")
        .collect();
    assert_eq!(cancelled.len(), 1);
    assert!(events.iter().all(|e| e["type"] != "error"));
    assert_eq!(fixture.media.workspaces_left(), 0);
}

#[tokio::test]
async fn test_cancel_without_job_returns_conflict() {
    let fixture = TestFixture::new();

    let response = fixture.post_empty("/api/v1/jobs/cancel").await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "no running job");
}

#[tokio::test]
async fn test_cancel_after_completion_returns_conflict() {
    let fixture = TestFixture::new();
    fixtures::script_success(&fixture.runner, "done").await;

    fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Done);

    let response = fixture.post_empty("/api/v1/jobs/cancel").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_failed_job_reports_error_events() {
    let fixture = TestFixture::new();
    fixture
        .runner
        .script(
            "ffmpeg",
            ScriptedCommand::exit(1).stderr("Invalid data found when processing input"),
        )
        .await;

    let response = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Failed);

    let events = fixture.get("/api/v1/jobs/events").await;
    let events = events.body.as_array().unwrap().clone();
    let error = events
        .iter()
        .find(|e| e["type"] == "error")
        .expect("error event");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("ffmpeg audio conversion failed"));
    assert_eq!(error["status"], "failed");

    let replay = events
        .iter()
        .filter(|e| e["type"] == "log")
        .last()
        .expect("log replay");
    assert_eq!(replay["command"], "ffmpeg");
    assert_eq!(replay["exitCode"], 1);
    assert_eq!(replay["stderr"], "Invalid data found when processing input");
}

#[tokio::test]
async fn test_missing_input_file_fails_asynchronously() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/jobs", json!({ "inputPath": "/does/not/exist.mp4" }))
        .await;

    // Validation happens inside the pipeline, so the request is still accepted
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(fixture.wait_for_terminal().await, JobStatus::Failed);
    assert!(fixture.runner.calls().await.is_empty());
}

#[tokio::test]
async fn test_start_job_missing_field_is_rejected() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/jobs", json!({ "path": "x" })).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(fixture.transcriber.current_job().status, JobStatus::Idle);
}

#[tokio::test]
async fn test_start_job_malformed_json_is_rejected() {
    let fixture = TestFixture::new();

    let response = fixture.post_raw("/api/v1/jobs", "{not json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_start_job_settings_failure_returns_500() {
    let fixture = TestFixture::new();
    fixture.settings.fail_next_load("disk on fire").await;

    let response = fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("load settings"));
    assert_eq!(fixture.transcriber.current_job().status, JobStatus::Idle);
    assert!(fixture.transcriber.job_events(0).is_empty());
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_events_since_returns_only_newer() {
    let fixture = TestFixture::new();
    fixtures::script_success(&fixture.runner, "text").await;

    fixture
        .post("/api/v1/jobs", json!({ "inputPath": fixture.input() }))
        .await;
    fixture.wait_for_terminal().await;

    let all = fixture.get("/api/v1/jobs/events?since=0").await;
    let all = all.body.as_array().unwrap().clone();
    assert!(all.len() > 3);

    let seqs: Vec<u64> = all.iter().map(|e| e["seq"].as_u64().unwrap()).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));

    let cursor = seqs[1];
    let newer = fixture
        .get(&format!("/api/v1/jobs/events?since={cursor}"))
        .await;
    let newer = newer.body.as_array().unwrap().clone();
    assert_eq!(newer.len(), all.len() - 2);
    assert_eq!(newer[0]["seq"].as_u64().unwrap(), seqs[2]);

    let last = *seqs.last().unwrap();
    let none = fixture
        .get(&format!("/api/v1/jobs/events?since={last}"))
        .await;
    assert_eq!(none.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_events_empty_before_any_job() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/jobs/events").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_get_settings() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/settings").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["modelPath"],
        fixture.media.model_dir.to_string_lossy().as_ref()
    );
    assert_eq!(response.body["language"], "auto");
}

#[tokio::test]
async fn test_put_settings_normalizes_and_persists() {
    let fixture = TestFixture::new();

    let response = fixture
        .put(
            "/api/v1/settings",
            json!({
                "modelPath": "  /models/ggml-small.bin ",
                "outputDir": "/transcripts",
                "language": "   "
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["modelPath"], "/models/ggml-small.bin");
    assert_eq!(response.body["language"], "auto");
    assert_eq!(fixture.settings.save_count().await, 1);

    let reloaded = fixture.get("/api/v1/settings").await;
    assert_eq!(reloaded.body["outputDir"], "/transcripts");
}

#[tokio::test]
async fn test_get_settings_failure_returns_500() {
    let fixture = TestFixture::new();
    fixture.settings.fail_next_load("unreadable").await;

    let response = fixture.get("/api/v1/settings").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"].is_string());
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("transcriber_http_requests_total"));
    assert!(body.contains("transcriber_job_active"));
    assert!(body.contains("transcriber_jobs_started_total"));
}

// =============================================================================
// WebSocket
// =============================================================================

#[tokio::test]
async fn test_ws_route_rejects_plain_get() {
    let fixture = TestFixture::new();

    let (status, _) = fixture.get_text("/api/v1/ws").await;

    assert!(status.is_client_error(), "unexpected status {}", status);
    assert_ne!(status, StatusCode::NOT_FOUND);
}
