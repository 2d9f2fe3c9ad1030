//! Session API endpoints

use crate::{ApiError, AppState};
use axum::extract::State;
use axum::Json;
use metaltrack_core::{Credentials, User};

/// Log in with Master sheet credentials
pub async fn api_login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.track.login(&credentials).await?))
}

/// Clear the session
pub async fn api_logout(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.track.logout()?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Current user, `null` when logged out
pub async fn api_session(State(state): State<AppState>) -> Result<Json<Option<User>>, ApiError> {
    Ok(Json(state.track.authenticator().current()?))
}
