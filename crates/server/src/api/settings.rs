//! Settings handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;
use transcriber_core::Settings;

use super::jobs::{error_response, ApiError};
use crate::state::AppState;

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, ApiError> {
    state
        .transcriber()
        .get_settings()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Persist settings; the stored (normalized) value is returned.
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    let saved = state
        .transcriber()
        .save_settings(settings)
        .await
        .map_err(error_response)?;
    info!(model_path = %saved.model_path, output_dir = %saved.output_dir, "Settings saved");
    Ok(Json(saved))
}
