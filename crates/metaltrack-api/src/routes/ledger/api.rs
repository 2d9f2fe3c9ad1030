//! Ledger sheet API endpoint

use crate::{ApiError, AppState};
use axum::extract::{Query, State};
use axum::Json;
use metaltrack_core::{Fetched, LedgerSheet};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct LedgerParams {
    pub metal: Option<String>,
    pub search: Option<String>,
}

/// Switch the Ledger sheet to a metal and return its rows
pub async fn api_ledger(
    State(state): State<AppState>,
    Query(params): Query<LedgerParams>,
) -> Result<Json<LedgerSheet>, ApiError> {
    state.require_admin()?;
    match state
        .track
        .select_ledger_metal(params.metal.as_deref(), params.search.as_deref())
        .await?
    {
        Fetched::Applied(sheet) => Ok(Json(sheet)),
        Fetched::Superseded => Err(ApiError::Superseded),
    }
}
