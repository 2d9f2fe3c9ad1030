//! Error types for metaltrack-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metaltrack_core::{CoreError, ErrorCode, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Admin access required")]
    Forbidden,

    #[error("Superseded by a newer request")]
    Superseded,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Superseded => StatusCode::CONFLICT,
            ApiError::Core(error) => match error.code() {
                ErrorCode::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::TransactionNotFound | ErrorCode::PartyNotFound => StatusCode::NOT_FOUND,
                ErrorCode::TransportError | ErrorCode::ParseError => StatusCode::BAD_GATEWAY,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::InvalidCredentials | ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorCode::SessionError | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(error) => {
                if error.severity() == ErrorSeverity::Critical {
                    log::error!("{}", error);
                }
                serde_json::to_value(error.to_details()).unwrap_or_default()
            }
            other => serde_json::json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
