//! Notices API endpoints

use crate::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::Json;
use metaltrack_core::Notice;

/// Live notices, oldest first
pub async fn api_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.track.notifier().snapshot())
}

/// Dismiss a notice
pub async fn api_dismiss_notice(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.track.notifier().dismiss(id) {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(ApiError::NotFound { resource: format!("notice {}", id) })
    }
}
