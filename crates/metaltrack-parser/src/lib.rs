//! Spreadsheet export parser
//!
//! Turns the wrapped JSON returned by the tabular-data export endpoint into
//! typed rows for the Entries, Master and Ledger sheets.

use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;
pub mod rows;

pub use error::ParseError;
pub use parser::SheetParser;

// Re-export commonly used types
pub use types::{Cell, Row, SheetResponse, Table};
pub use rows::{EntryRow, LedgerRow, MasterRow};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn SheetParserTrait>;

/// Trait for export payload parsers
pub trait SheetParserTrait: Send + Sync {
    /// Parse a raw response body into its table
    fn parse_table(&self, body: &str, sheet: &str) -> Result<Table, ParseError>;

    /// Parse an Entries sheet response
    fn parse_entries(&self, body: &str, sheet: &str) -> Result<Vec<EntryRow>, ParseError> {
        Ok(rows::entry_rows(&self.parse_table(body, sheet)?))
    }

    /// Parse a Master sheet response
    fn parse_master(&self, body: &str, sheet: &str) -> Result<Vec<MasterRow>, ParseError> {
        Ok(rows::master_rows(&self.parse_table(body, sheet)?))
    }

    /// Parse a Ledger sheet response
    fn parse_ledger(&self, body: &str, sheet: &str) -> Result<Vec<LedgerRow>, ParseError> {
        Ok(rows::ledger_rows(&self.parse_table(body, sheet)?))
    }
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultSheetParser;

impl SheetParserTrait for DefaultSheetParser {
    fn parse_table(&self, body: &str, sheet: &str) -> Result<Table, ParseError> {
        SheetParser::parse_table(body, sheet)
    }
}
