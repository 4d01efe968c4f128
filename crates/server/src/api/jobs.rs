//! Job control and event polling handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use transcriber_core::{Event, Job, TranscriberError};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Request body for starting a job
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobBody {
    /// Media file to transcribe
    pub input_path: String,
}

/// Query parameters for event polling
#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    /// Return events with a sequence number greater than this
    pub since: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a transcriber error to an HTTP status and JSON body.
pub(crate) fn error_response(err: TranscriberError) -> ApiError {
    let status = match &err {
        TranscriberError::Job(_) => StatusCode::CONFLICT,
        TranscriberError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Start transcribing a media file
pub async fn start_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartJobBody>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    match state.transcriber().start_transcription(&body.input_path).await {
        Ok(job) => {
            info!(job_id = %job.id, input = %body.input_path, "Job accepted");
            Ok((StatusCode::ACCEPTED, Json(job)))
        }
        Err(e) => {
            warn!("Rejected job for {}: {}", body.input_path, e);
            Err(error_response(e))
        }
    }
}

/// Request cancellation of the running job
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CancelResponse>, ApiError> {
    state
        .transcriber()
        .cancel_transcription()
        .map(|()| Json(CancelResponse { cancelled: true }))
        .map_err(error_response)
}

/// Snapshot of the current job
pub async fn current_job(State(state): State<Arc<AppState>>) -> Json<Job> {
    Json(state.transcriber().current_job())
}

/// Events recorded after `since`, oldest first
pub async fn job_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Json<Vec<Event>> {
    Json(state.transcriber().job_events(params.since.unwrap_or(0)))
}
