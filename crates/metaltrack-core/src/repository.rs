//! Spreadsheet repository
//!
//! Reads go through the public export endpoint, writes through the
//! deployed script endpoint.

use async_trait::async_trait;
use metaltrack_config::Config;
use metaltrack_parser::{EntryRow, LedgerRow, MasterRow, ParserRef};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Repository reference type
pub type RepositoryRef = Arc<dyn Repository>;

/// Remote sheet operations
#[async_trait]
pub trait Repository: Send + Sync {
    async fn fetch_entries(&self) -> CoreResult<Vec<EntryRow>>;
    async fn fetch_master(&self) -> CoreResult<Vec<MasterRow>>;
    async fn fetch_ledger(&self) -> CoreResult<Vec<LedgerRow>>;

    /// Append a row to the Entries sheet
    async fn append_entry(&self, row: Vec<String>) -> CoreResult<()>;

    /// Write a single cell (1-based row and column)
    async fn update_cell(&self, sheet: &str, row: u32, column: u32, value: &str) -> CoreResult<()>;

    /// Delete a row of the Entries sheet (1-based sheet row)
    async fn delete_entry(&self, position: usize) -> CoreResult<()>;
}

/// Script endpoint reply
#[derive(Debug, Deserialize)]
struct WriteReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Repository backed by the shared spreadsheet
pub struct SheetsRepository {
    config: Arc<Config>,
    parser: ParserRef,
    client: reqwest::Client,
}

impl SheetsRepository {
    pub fn new(config: Arc<Config>, parser: ParserRef) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.sheet.timeout_secs))
            .build()?;
        Ok(Self { config, parser, client })
    }

    async fn fetch_sheet(&self, sheet: &str) -> CoreResult<String> {
        let url = self.config.export_url(sheet);
        log::debug!("Fetching sheet {} from {}", sheet, url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CoreError::Transport {
                message: format!("Fetching {} failed with status {}", sheet, response.status()),
            });
        }
        Ok(response.text().await?)
    }

    async fn write(&self, action: &str, fields: Vec<(&'static str, String)>) -> CoreResult<()> {
        let mut form = vec![("action", action.to_string())];
        form.extend(fields);

        let response = self
            .client
            .post(&self.config.sheet.script_url)
            .form(&form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CoreError::Transport {
                message: format!("Write '{}' failed with status {}", action, response.status()),
            });
        }

        let reply = response.json::<WriteReply>().await?;
        if reply.success {
            Ok(())
        } else {
            let reason = reply
                .error
                .or(reply.message)
                .unwrap_or_else(|| "script reported failure".to_string());
            Err(CoreError::Transport {
                message: format!("Write '{}' rejected: {}", action, reason),
            })
        }
    }
}

#[async_trait]
impl Repository for SheetsRepository {
    async fn fetch_entries(&self) -> CoreResult<Vec<EntryRow>> {
        let sheet = &self.config.sheet.entries_sheet;
        let body = self.fetch_sheet(sheet).await?;
        let rows = self.parser.parse_entries(&body, sheet)?;
        log::debug!("Parsed {} rows from {}", rows.len(), sheet);
        Ok(rows)
    }

    async fn fetch_master(&self) -> CoreResult<Vec<MasterRow>> {
        let sheet = &self.config.sheet.master_sheet;
        let body = self.fetch_sheet(sheet).await?;
        let rows = self.parser.parse_master(&body, sheet)?;
        log::debug!("Parsed {} rows from {}", rows.len(), sheet);
        Ok(rows)
    }

    async fn fetch_ledger(&self) -> CoreResult<Vec<LedgerRow>> {
        let sheet = &self.config.sheet.ledger_sheet;
        let body = self.fetch_sheet(sheet).await?;
        let rows = self.parser.parse_ledger(&body, sheet)?;
        log::debug!("Parsed {} rows from {}", rows.len(), sheet);
        Ok(rows)
    }

    async fn append_entry(&self, row: Vec<String>) -> CoreResult<()> {
        let row_data = serde_json::to_string(&row).map_err(|e| CoreError::Internal {
            message: e.to_string(),
        })?;
        self.write("insert", vec![
            ("sheetName", self.config.sheet.entries_sheet.clone()),
            ("rowData", row_data),
        ])
        .await
    }

    async fn update_cell(&self, sheet: &str, row: u32, column: u32, value: &str) -> CoreResult<()> {
        self.write("update", vec![
            ("sheetName", sheet.to_string()),
            ("rowIndex", row.to_string()),
            ("columnIndex", column.to_string()),
            ("value", value.to_string()),
        ])
        .await
    }

    async fn delete_entry(&self, position: usize) -> CoreResult<()> {
        self.write("delete", vec![
            ("sheetName", self.config.sheet.entries_sheet.clone()),
            ("rowIndex", position.to_string()),
        ])
        .await
    }
}
