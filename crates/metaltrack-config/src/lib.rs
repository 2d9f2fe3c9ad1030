//! Configuration management for metaltrack
//!
//! This module handles loading, validation, and management of
//! metaltrack configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Spreadsheet endpoints and sheet names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet identifier used by the export endpoint
    #[serde(default)]
    pub sheet_id: String,
    /// Base URL of the tabular-data export endpoint
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,
    /// Script endpoint used for inserts, updates and deletes
    #[serde(default)]
    pub script_url: String,
    /// Sheet holding one transaction per row
    #[serde(default = "default_entries_sheet")]
    pub entries_sheet: String,
    /// Sheet holding dropdown options and credentials
    #[serde(default = "default_master_sheet")]
    pub master_sheet: String,
    /// Sheet holding the spreadsheet-computed party ledger
    #[serde(default = "default_ledger_sheet")]
    pub ledger_sheet: String,
    /// Row of the Ledger sheet's metal selector cell (1-based)
    #[serde(default = "default_ledger_metal_row")]
    pub ledger_metal_row: u32,
    /// Column of the Ledger sheet's metal selector cell (1-based)
    #[serde(default = "default_ledger_metal_column")]
    pub ledger_metal_column: u32,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            export_base_url: default_export_base_url(),
            script_url: String::new(),
            entries_sheet: default_entries_sheet(),
            master_sheet: default_master_sheet(),
            ledger_sheet: default_ledger_sheet(),
            ledger_metal_row: default_ledger_metal_row(),
            ledger_metal_column: default_ledger_metal_column(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_export_base_url() -> String {
    "https://docs.google.com/spreadsheets/d".to_string()
}

fn default_entries_sheet() -> String {
    "Entries".to_string()
}

fn default_master_sheet() -> String {
    "Master".to_string()
}

fn default_ledger_sheet() -> String {
    "Ledger".to_string()
}

fn default_ledger_metal_row() -> u32 {
    1
}

fn default_ledger_metal_column() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

/// Session persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the logged-in user
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

/// Notice queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Maximum number of notices kept at once
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Seconds before a notice expires
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_capacity() -> usize {
    20
}

fn default_ttl_secs() -> u64 {
    5
}

/// Stock level classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Balances above this many grams count as good stock
    #[serde(default = "default_good_threshold")]
    pub good_threshold: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            good_threshold: default_good_threshold(),
        }
    }
}

fn default_good_threshold() -> u32 {
    100
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Spreadsheet settings
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Notice settings
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Stock classification settings
    #[serde(default)]
    pub stock: StockConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.sheet.sheet_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "sheet.sheet_id".to_string(),
            });
        }

        for (field, url) in [
            ("sheet.export_base_url", &self.sheet.export_base_url),
            ("sheet.script_url", &self.sheet.script_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::MissingField { field: field.to_string() });
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "URL must start with http:// or https://".to_string(),
                });
            }
        }

        if self.sheet.ledger_metal_row == 0 || self.sheet.ledger_metal_column == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sheet.ledger_metal_row".to_string(),
                reason: "Sheet rows and columns are 1-based".to_string(),
            });
        }

        if self.sheet.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sheet.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.notifications.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notifications.capacity".to_string(),
                reason: "Capacity must be greater than 0".to_string(),
            });
        }

        if self.notifications.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notifications.ttl_secs".to_string(),
                reason: "Notices need a positive lifetime".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("Unknown log level '{}'", self.logging.level),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Export endpoint URL for a sheet
    pub fn export_url(&self, sheet_name: &str) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:json&sheet={}",
            self.sheet.export_base_url.trim_end_matches('/'),
            self.sheet.sheet_id,
            urlencoding::encode(sheet_name)
        )
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
