//! New-entry form validation
//!
//! Turns the entry form into the row appended to the Entries sheet.

use chrono::NaiveDate;
use metaltrack_parser::SheetParser;
use metaltrack_utils::format_sheet_date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Metal, MetalType, VoucherType};

/// Party dropdown value that switches to a free-text name
pub const NEW_PARTY: &str = "New Party";

/// Entry form as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryForm {
    pub from: String,
    pub to: String,
    pub new_from: String,
    pub new_to: String,
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    pub metal_type: MetalType,
    /// Raw weight text as typed
    pub weight: String,
}

fn default_metal() -> MetalType {
    MetalType::from(Metal::Gold)
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            new_from: String::new(),
            new_to: String::new(),
            voucher_type: VoucherType::Issue,
            voucher_no: String::new(),
            metal_type: default_metal(),
            weight: String::new(),
        }
    }
}

/// A validated entry ready to be appended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    pub metal_type: MetalType,
    pub weight: Decimal,
}

impl NewEntry {
    /// Row in Entries column order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_sheet_date(self.date),
            self.from.clone(),
            self.to.clone(),
            self.voucher_type.as_str().to_string(),
            self.voucher_no.clone(),
            self.metal_type.as_str().to_string(),
            self.weight.normalize().to_string(),
        ]
    }
}

fn resolve_party(selected: &str, new_name: &str) -> CoreResult<String> {
    if selected == NEW_PARTY {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Please enter a name for the new party"));
        }
        Ok(name.to_string())
    } else {
        Ok(selected.trim().to_string())
    }
}

impl EntryForm {
    /// Validate the form and stamp it with `date`
    pub fn validate(&self, date: NaiveDate) -> CoreResult<NewEntry> {
        let from = resolve_party(&self.from, &self.new_from)?;
        let to = resolve_party(&self.to, &self.new_to)?;
        let voucher_no = self.voucher_no.trim();
        let weight = self.weight.trim();

        if from.is_empty() || to.is_empty() || voucher_no.is_empty() || weight.is_empty() {
            return Err(CoreError::validation("Please fill all required fields"));
        }

        let weight = SheetParser::parse_decimal(weight)
            .filter(|w| !w.is_sign_negative())
            .ok_or_else(|| CoreError::validation(format!("Invalid weight: {}", weight)))?;

        let metal_type = if self.metal_type.is_blank() {
            default_metal()
        } else {
            self.metal_type.clone()
        };

        Ok(NewEntry {
            date,
            from,
            to,
            voucher_type: self.voucher_type,
            voucher_no: voucher_no.to_string(),
            metal_type,
            weight,
        })
    }
}
