//! Balances API endpoints
//!
//! Endpoints:
//! - api_metal_balances: Per-metal totals in the ledger or stock view
//! - api_party_balances: Per-party Dr/Cr ledger
//! - api_top_parties: Dashboard party list
//! - api_party_statement: One party's ledger and transactions
//! - api_summary: Summary card totals

use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::Json;
use metaltrack_core::{
    BalanceView, MetalBalance, PartyLedgerEntry, PartyStatement, StockStatus, SummaryTotals,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct MetalBalanceParams {
    pub view: Option<String>,
    pub search: Option<String>,
}

/// A metal balance; the stock badge is only set in the stock view
#[derive(Debug, Serialize)]
pub struct MetalBalanceResponse {
    #[serde(flatten)]
    pub balance: MetalBalance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StockStatus>,
}

/// Per-metal balances (JSON API)
pub async fn api_metal_balances(
    State(state): State<AppState>,
    Query(params): Query<MetalBalanceParams>,
) -> Result<Json<Vec<MetalBalanceResponse>>, ApiError> {
    state.require_admin()?;
    let view = match params.view.as_deref() {
        Some(raw) => raw.parse::<BalanceView>().map_err(ApiError::bad_request)?,
        None => BalanceView::default(),
    };

    let threshold = state.track.good_threshold();
    let balances = state
        .track
        .metal_balances(view, params.search.as_deref())?
        .into_iter()
        .map(|balance| MetalBalanceResponse {
            status: (view == BalanceView::Stock).then(|| balance.stock_status(threshold)),
            balance,
        })
        .collect();
    Ok(Json(balances))
}

/// Per-party balances
pub async fn api_party_balances(
    State(state): State<AppState>,
) -> Result<Json<Vec<PartyLedgerEntry>>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.party_balances()?))
}

/// Parties shown on the dashboard
pub async fn api_top_parties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PartyLedgerEntry>>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.top_parties()?))
}

/// One party's statement
pub async fn api_party_statement(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PartyStatement>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.party_statement(&name)?))
}

/// Summary totals
pub async fn api_summary(State(state): State<AppState>) -> Result<Json<SummaryTotals>, ApiError> {
    state.require_admin()?;
    Ok(Json(state.track.summary()?))
}
