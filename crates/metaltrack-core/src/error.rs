//! Error types for metaltrack-core
//!
//! This module provides error handling for the ledger service, including
//! error codes, severities, detailed messages and suggestions.

use metaltrack_parser::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Transactions not fetched yet, or the last fetch failed
    NotLoaded,
    /// Transaction not found
    TransactionNotFound,
    /// Party not found
    PartyNotFound,
    /// Network failure or rejected write
    TransportError,
    /// Unexpected payload shape
    ParseError,
    /// Invalid user input
    ValidationError,
    /// Username/password mismatch
    InvalidCredentials,
    /// Unauthorized access
    Unauthorized,
    /// Session store failure
    SessionError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::PartyNotFound => write!(f, "PARTY_NOT_FOUND"),
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::SessionError => write!(f, "SESSION_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application cannot run as configured
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for metaltrack-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Transactions not loaded")]
    NotLoaded,

    #[error("Transaction not found at row {position}")]
    TransactionNotFound { position: usize },

    #[error("Party not found: {name}")]
    PartyNotFound { name: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Shorthand for validation failures
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation { message: message.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::PartyNotFound { .. } => ErrorCode::PartyNotFound,
            CoreError::Transport { .. } => ErrorCode::TransportError,
            CoreError::Parse { .. } => ErrorCode::ParseError,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::Session { .. } => ErrorCode::SessionError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotLoaded => ErrorSeverity::Warning,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::PartyNotFound { .. } => ErrorSeverity::Info,
            CoreError::Transport { .. } => ErrorSeverity::Error,
            CoreError::Parse { .. } => ErrorSeverity::Error,
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::InvalidCredentials => ErrorSeverity::Warning,
            CoreError::Unauthorized => ErrorSeverity::Warning,
            CoreError::Session { .. } => ErrorSeverity::Error,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NotLoaded => {
                details = details.with_suggestion(
                    "Reload the transactions with POST /api/reload.".to_string()
                );
            }
            CoreError::TransactionNotFound { position } => {
                details = details.with_detail(serde_json::json!({ "position": position }));
                details = details.with_suggestion(
                    "The row may already have been deleted; reload the history.".to_string()
                );
            }
            CoreError::PartyNotFound { name } => {
                details = details.with_suggestion(format!(
                    "No transaction names '{}' as from or to party.", name
                ));
            }
            CoreError::Transport { message } => {
                details = details.with_detail(serde_json::json!({ "transport_message": message }));
                details = details.with_suggestion(
                    "Check your connection and try again.".to_string()
                );
            }
            CoreError::Parse { message } => {
                details = details.with_detail(serde_json::json!({ "parse_message": message }));
                details = details.with_suggestion(
                    "Check that the sheet is shared publicly and the sheet name is correct.".to_string()
                );
            }
            CoreError::Validation { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::InvalidCredentials => {
                details = details.with_suggestion(
                    "Usernames and passwords are case-sensitive.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ParseError> for CoreError {
    fn from(error: ParseError) -> Self {
        CoreError::Parse { message: error.to_string() }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        CoreError::Transport { message: error.to_string() }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User performing the operation (if logged in)
    pub username: Option<String>,
    /// Operation being performed
    pub operation: String,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            username: None,
            operation: operation.into(),
        }
    }

    /// Add the acting user
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "metaltrack::error",
            "ERROR [{}] {} - Operation: {} - User: {:?}",
            error.code(),
            error,
            context.operation,
            context.username
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "metaltrack::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.username
        );
    }
}

// ==================== Tests ====================
