//! JSON HTTP API for metaltrack
//!
//! Routes are organized into modules:
//! - routes::session: Login, logout, current user
//! - routes::transactions: History, new entries, deletion, reload, form options
//! - routes::balances: Metal and party balances, summary, party statements
//! - routes::ledger: Spreadsheet-computed ledger per metal
//! - routes::notices: Pending notices

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use metaltrack_config::Config;
use metaltrack_core::{MetalTrack, User};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub track: Arc<MetalTrack>,
}

impl AppState {
    pub fn new(track: Arc<MetalTrack>) -> Self {
        Self { track }
    }

    /// Logged-in user of any role
    pub fn require_user(&self) -> Result<User, ApiError> {
        Ok(self.track.authenticator().require_user()?)
    }

    /// Logged-in admin
    pub fn require_admin(&self) -> Result<User, ApiError> {
        let user = self.require_user()?;
        if user.role.is_admin() {
            Ok(user)
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::balances::{api_metal_balances, api_party_balances, api_party_statement, api_summary, api_top_parties};
    use routes::ledger::api_ledger;
    use routes::notices::{api_dismiss_notice, api_notices};
    use routes::session::{api_login, api_logout, api_session};
    use routes::transactions::{api_create_transaction, api_delete_transaction, api_load_state, api_options, api_reload, api_transactions};

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/login", post(api_login))
        .route("/api/logout", post(api_logout))
        .route("/api/session", get(api_session))
        .route("/api/transactions", get(api_transactions).post(api_create_transaction))
        .route("/api/transactions/:position", delete(api_delete_transaction))
        .route("/api/reload", post(api_reload))
        .route("/api/status", get(api_load_state))
        .route("/api/options", get(api_options))
        .route("/api/balances/metals", get(api_metal_balances))
        .route("/api/balances/parties", get(api_party_balances))
        .route("/api/parties/top", get(api_top_parties))
        .route("/api/parties/:name", get(api_party_statement))
        .route("/api/summary", get(api_summary))
        .route("/api/ledger", get(api_ledger))
        .route("/api/notices", get(api_notices))
        .route("/api/notices/:id", delete(api_dismiss_notice))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process stops.
pub async fn start_server(config: &Config, track: Arc<MetalTrack>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let router = create_router(AppState::new(track));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting metaltrack server on http://{}", addr);

    axum::serve(listener, router).await?;
    log::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metaltrack_core::{CoreResult, MemorySessionStore, Repository};
    use metaltrack_parser::{EntryRow, LedgerRow, MasterRow};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct FakeRepository {
        entries: Mutex<Vec<EntryRow>>,
    }

    fn entry(position: usize, from: &str, to: &str, kind: &str, weight: i64) -> EntryRow {
        EntryRow {
            position,
            date: None,
            from: from.to_string(),
            to: to.to_string(),
            voucher_type: kind.to_string(),
            voucher_no: format!("V-{}", position),
            metal_type: "Gold".to_string(),
            weight: Some(Decimal::from(weight)),
        }
    }

    fn credential(name: &str, username: &str, role: &str) -> MasterRow {
        MasterRow {
            from_option: name.to_string(),
            to_option: name.to_string(),
            metal_option: "Gold".to_string(),
            username: username.to_string(),
            password: "pw".to_string(),
            role: role.to_string(),
        }
    }

    #[async_trait]
    impl Repository for FakeRepository {
        async fn fetch_entries(&self) -> CoreResult<Vec<EntryRow>> {
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn fetch_master(&self) -> CoreResult<Vec<MasterRow>> {
            Ok(vec![credential("Vikas", "admin", "admin"), credential("Ravi", "clerk", "user")])
        }

        async fn fetch_ledger(&self) -> CoreResult<Vec<LedgerRow>> {
            Ok(vec![LedgerRow {
                name: "Workshop A".to_string(),
                metal_type: "Gold".to_string(),
                dr: Decimal::from(10),
                cr: Decimal::from(4),
                balance: Decimal::from(-6),
            }])
        }

        async fn append_entry(&self, row: Vec<String>) -> CoreResult<()> {
            let mut entries = self.entries.lock().unwrap();
            let position = entries.len() + 2;
            entries.push(EntryRow {
                position,
                date: None,
                from: row[1].clone(),
                to: row[2].clone(),
                voucher_type: row[3].clone(),
                voucher_no: row[4].clone(),
                metal_type: row[5].clone(),
                weight: row[6].parse().ok(),
            });
            Ok(())
        }

        async fn update_cell(&self, _sheet: &str, _row: u32, _column: u32, _value: &str) -> CoreResult<()> {
            Ok(())
        }

        async fn delete_entry(&self, _position: usize) -> CoreResult<()> {
            Ok(())
        }
    }

    async fn app() -> Router {
        let repository = FakeRepository {
            entries: Mutex::new(vec![
                entry(2, "A", "B", "Issue", 10),
                entry(3, "B", "C", "Issue", 2),
                entry(4, "C", "A", "Receipt", 4),
            ]),
        };
        let track = Arc::new(MetalTrack::new(
            Arc::new(Config::default()),
            Arc::new(repository),
            Arc::new(MemorySessionStore::default()),
        ));
        track.refresh().await.unwrap();
        create_router(AppState::new(track))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    async fn login(app: &Router, username: &str) {
        let (status, _) = call(
            app,
            "POST",
            "/api/login",
            Some(serde_json::json!({"username": username, "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, status) = call(&app, "GET", "/api/status", None).await;
        assert_eq!(status, serde_json::json!({"state": "ready", "data": 3}));
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let app = app().await;
        let (status, _) = call(&app, "GET", "/api/balances/parties", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        login(&app, "clerk").await;
        let (status, _) = call(&app, "GET", "/api/balances/parties", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        login(&app, "admin").await;
        let (status, body) = call(&app, "GET", "/api/balances/parties", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_login() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/api/login",
            Some(serde_json::json!({"username": "admin", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_session_and_logout() {
        let app = app().await;
        let (_, body) = call(&app, "GET", "/api/session", None).await;
        assert!(body.is_null());

        login(&app, "admin").await;
        let (_, body) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(body["role"], "admin");
        assert_eq!(body["name"], "Vikas");

        call(&app, "POST", "/api/logout", None).await;
        let (_, body) = call(&app, "GET", "/api/session", None).await;
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_metal_balances_views() {
        let app = app().await;
        login(&app, "admin").await;

        let (_, ledger) = call(&app, "GET", "/api/balances/metals", None).await;
        assert_eq!(ledger[0]["metal_type"], "Gold");
        assert_eq!(ledger[0]["balance_qty"], "8");
        assert!(ledger[0].get("status").is_none());

        let (_, stock) = call(&app, "GET", "/api/balances/metals?view=stock&search=gol", None).await;
        assert_eq!(stock[0]["balance_qty"], "-8");
        assert_eq!(stock[0]["status"], "out_of_stock");

        let (status, _) = call(&app, "GET", "/api/balances/metals?view=sideways", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_and_delete_transaction() {
        let app = app().await;
        let form = serde_json::json!({"from": "A", "to": "B", "voucherNo": "ISS-9", "weight": "2"});

        let (status, _) = call(&app, "POST", "/api/transactions", Some(form.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        login(&app, "clerk").await;
        let (status, body) = call(&app, "POST", "/api/transactions", Some(form)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["voucher_no"], "ISS-9");

        let (status, _) = call(&app, "DELETE", "/api/transactions/5", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        login(&app, "admin").await;
        let (_, history) = call(&app, "GET", "/api/transactions", None).await;
        assert_eq!(history.as_array().unwrap().len(), 4);

        let (status, _) = call(&app, "DELETE", "/api/transactions/5", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, "DELETE", "/api/transactions/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_party_routes() {
        let app = app().await;
        login(&app, "admin").await;

        let (_, statement) = call(&app, "GET", "/api/parties/A", None).await;
        assert_eq!(statement["lines"].as_array().unwrap().len(), 2);

        let (status, _) = call(&app, "GET", "/api/parties/Nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, top) = call(&app, "GET", "/api/parties/top", None).await;
        assert_eq!(top.as_array().unwrap().len(), 3);

        let (_, summary) = call(&app, "GET", "/api/summary", None).await;
        assert_eq!(summary["total_issued"], "12");
    }

    #[tokio::test]
    async fn test_ledger_and_notices() {
        let app = app().await;
        login(&app, "admin").await;

        let (status, body) = call(&app, "GET", "/api/ledger", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metal"], "Gold");
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);

        let (_, notices) = call(&app, "GET", "/api/notices", None).await;
        assert!(notices.as_array().unwrap().is_empty());

        let (status, _) = call(&app, "DELETE", "/api/notices/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
