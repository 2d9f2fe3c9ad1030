//! Export payload parser

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{Cell, SheetResponse, Table};

static DATE_CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Date\((\d{4}),\s*(\d{1,2}),\s*(\d{1,2})").expect("valid date constructor regex")
});

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid dd/mm/yyyy regex")
});

/// Parser for the tabular-data export format
pub struct SheetParser;

impl SheetParser {
    /// Strip the non-JSON wrapper around the payload.
    ///
    /// The export wraps its JSON in a callback prefix and suffix; the object
    /// runs from the first `{` to the last `}`.
    pub fn extract_json<'a>(body: &'a str, sheet: &str) -> Result<&'a str, ParseError> {
        let start = body.find('{');
        let end = body.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
            _ => Err(ParseError::InvalidFormat { sheet: sheet.to_string() }),
        }
    }

    /// Parse a raw export body into its table
    pub fn parse_table(body: &str, sheet: &str) -> Result<Table, ParseError> {
        let json = Self::extract_json(body, sheet)?;
        let response: SheetResponse = serde_json::from_str(json)?;

        if response.status.as_deref() == Some("error") {
            let message = response
                .errors
                .first()
                .and_then(|e| e.detailed_message.clone().or_else(|| e.message.clone()))
                .unwrap_or_else(|| format!("{} returned an error status", sheet));
            return Err(ParseError::SheetError { message });
        }

        let table = response.table.unwrap_or_default();
        log::debug!("Parsed {} rows from sheet {}", table.rows.len(), sheet);
        Ok(table)
    }

    /// Parse a sheet date.
    ///
    /// Accepts the export's `Date(y,m,d)` constructor form (0-based month,
    /// optional trailing time parts), `dd/mm/yyyy` as written by the entry
    /// form, ISO `yyyy-mm-dd`, and RFC 3339 timestamps.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(caps) = DATE_CONSTRUCTOR.captures(raw) {
            let year: i32 = caps[1].parse().ok()?;
            let month0: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month0 + 1, day);
        }

        if let Some(caps) = DAY_MONTH_YEAR.captures(raw) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }

        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
    }

    /// Parse a weight cell.
    ///
    /// Blank cells read as zero; text that is not a number yields `None`.
    pub fn parse_weight(cell: Option<&Cell>) -> Option<Decimal> {
        let Some(cell) = cell else {
            return Some(Decimal::ZERO);
        };
        match &cell.v {
            None | Some(serde_json::Value::Null) => Some(Decimal::ZERO),
            Some(serde_json::Value::Number(n)) => Self::parse_decimal(&n.to_string()),
            Some(serde_json::Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(Decimal::ZERO)
                } else {
                    Self::parse_decimal(s)
                }
            }
            Some(_) => None,
        }
    }

    /// Parse a decimal literal, accepting scientific notation
    pub fn parse_decimal(raw: &str) -> Option<Decimal> {
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
    }
}
