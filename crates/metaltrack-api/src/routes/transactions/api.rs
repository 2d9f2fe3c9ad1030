//! Transactions API endpoints
//!
//! Endpoints:
//! - api_transactions: History with optional search (admin)
//! - api_create_transaction: Append a new entry (any session)
//! - api_delete_transaction: Delete by sheet row (admin)
//! - api_reload: Refetch the Entries sheet
//! - api_options: Entry form dropdown options

use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use metaltrack_core::{EntryForm, Fetched, LoadState, MasterOptions, NewEntry, Transaction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Get transactions, optionally filtered (JSON API)
pub async fn api_transactions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.transactions(params.search.as_deref())?))
}

/// Validate and append a new entry
pub async fn api_create_transaction(
    State(state): State<AppState>,
    Json(form): Json<EntryForm>,
) -> Result<(StatusCode, Json<NewEntry>), ApiError> {
    state.require_user()?;
    let entry = state.track.record(&form).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Delete the transaction at a sheet row
pub async fn api_delete_transaction(
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> Result<Json<Transaction>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.delete(position).await?))
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub loaded: usize,
}

/// Refetch the Entries sheet
pub async fn api_reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    state.require_user()?;
    match state.track.refresh().await? {
        Fetched::Applied(loaded) => Ok(Json(ReloadResponse { loaded })),
        Fetched::Superseded => Err(ApiError::Superseded),
    }
}

/// Dropdown options for the entry form
pub async fn api_options(State(state): State<AppState>) -> Result<Json<MasterOptions>, ApiError> {
    state.require_user()?;
    Ok(Json(state.track.options().await))
}

/// Load state of the transaction snapshot
pub async fn api_load_state(State(state): State<AppState>) -> Json<LoadState<usize>> {
    Json(match state.track.load_state() {
        LoadState::Loading => LoadState::Loading,
        LoadState::Failed(reason) => LoadState::Failed(reason),
        LoadState::Ready(transactions) => LoadState::Ready(transactions.len()),
    })
}
