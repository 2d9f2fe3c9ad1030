//! Error types for metaltrack-parser

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid response format from {sheet}: no JSON object found")]
    InvalidFormat { sheet: String },

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet reported an error: {message}")]
    SheetError { message: String },
}
