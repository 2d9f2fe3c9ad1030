//! Column-position mapping for the Entries, Master and Ledger sheets

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parser::SheetParser;
use crate::types::{Row, Table};

/// Entries sheet columns
pub mod entries {
    pub const DATE: usize = 0;
    pub const FROM: usize = 1;
    pub const TO: usize = 2;
    pub const VOUCHER_TYPE: usize = 3;
    pub const VOUCHER_NO: usize = 4;
    pub const METAL_TYPE: usize = 5;
    pub const WEIGHT: usize = 6;
}

/// Master sheet columns
pub mod master {
    /// Column A holds the from-party options and the user's display name
    pub const FROM_OPTION: usize = 0;
    pub const TO_OPTION: usize = 1;
    pub const METAL_OPTION: usize = 2;
    pub const USERNAME: usize = 3;
    pub const PASSWORD: usize = 4;
    pub const ROLE: usize = 5;
}

/// Ledger sheet columns
pub mod ledger {
    pub const NAME: usize = 0;
    pub const METAL_TYPE: usize = 1;
    pub const DR: usize = 2;
    pub const CR: usize = 3;
    pub const BALANCE: usize = 4;
}

/// A transaction row as stored in the Entries sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRow {
    /// 1-based sheet row number
    pub position: usize,
    pub date: Option<NaiveDate>,
    pub from: String,
    pub to: String,
    pub voucher_type: String,
    pub voucher_no: String,
    pub metal_type: String,
    /// `None` when the weight cell is not numeric
    pub weight: Option<Decimal>,
}

/// A Master sheet row: dropdown options plus one credential record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    pub from_option: String,
    pub to_option: String,
    pub metal_option: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl MasterRow {
    /// Credential cells are all present
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.role.is_empty()
    }

    /// Display name of the credential's owner
    pub fn display_name(&self) -> &str {
        if self.from_option.is_empty() {
            "User"
        } else {
            &self.from_option
        }
    }
}

/// A spreadsheet-computed ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub name: String,
    pub metal_type: String,
    pub dr: Decimal,
    pub cr: Decimal,
    pub balance: Decimal,
}

/// Sheet row index of a table row (row 0 is the header on sheet row 1)
fn sheet_position(index: usize) -> usize {
    index + 1
}

fn number_or_zero(row: &Row, column: usize) -> Decimal {
    SheetParser::parse_weight(row.cell(column)).unwrap_or(Decimal::ZERO)
}

/// Map Entries rows; the header and rows without a date cell are skipped
pub fn entry_rows(table: &Table) -> Vec<EntryRow> {
    let mut rows = Vec::new();
    for (index, row) in table.rows.iter().enumerate().skip(1) {
        if !row.has_cells() || !row.cell(entries::DATE).map_or(false, |c| c.is_set()) {
            continue;
        }

        let weight = SheetParser::parse_weight(row.cell(entries::WEIGHT));
        if weight.is_none() {
            log::warn!("Entries row {} has a non-numeric weight", sheet_position(index));
        }

        let raw_date = row.text(entries::DATE);
        let date = SheetParser::parse_date(&raw_date);
        if date.is_none() {
            log::warn!("Entries row {} has an unreadable date: {}", sheet_position(index), raw_date);
        }

        rows.push(EntryRow {
            position: sheet_position(index),
            date,
            from: row.text(entries::FROM),
            to: row.text(entries::TO),
            voucher_type: row.text(entries::VOUCHER_TYPE),
            voucher_no: row.text(entries::VOUCHER_NO),
            metal_type: row.text(entries::METAL_TYPE),
            weight,
        });
    }
    rows
}

/// Map Master rows, skipping the header
pub fn master_rows(table: &Table) -> Vec<MasterRow> {
    table
        .rows
        .iter()
        .skip(1)
        .filter(|row| row.has_cells())
        .map(|row| MasterRow {
            from_option: row.text(master::FROM_OPTION),
            to_option: row.text(master::TO_OPTION),
            metal_option: row.text(master::METAL_OPTION),
            username: row.text(master::USERNAME),
            password: row.text(master::PASSWORD),
            role: row.text(master::ROLE),
        })
        .collect()
}

/// Map Ledger rows; the header and rows without a name cell are skipped
pub fn ledger_rows(table: &Table) -> Vec<LedgerRow> {
    table
        .rows
        .iter()
        .skip(1)
        .filter(|row| row.cell(ledger::NAME).map_or(false, |c| c.is_set()))
        .map(|row| LedgerRow {
            name: row.text(ledger::NAME),
            metal_type: row.text(ledger::METAL_TYPE),
            dr: number_or_zero(row, ledger::DR),
            cr: number_or_zero(row, ledger::CR),
            balance: number_or_zero(row, ledger::BALANCE),
        })
        .collect()
}
