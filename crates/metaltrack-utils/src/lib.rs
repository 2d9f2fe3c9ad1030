//! Utility functions and helpers

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

/// Compare two labels the way a browser's locale compare orders them:
/// case-insensitively first, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Case-insensitive substring test used by every search box
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a weight with one decimal place (e.g. "-6.0")
pub fn format_weight(weight: Decimal) -> String {
    format!(
        "{:.1}",
        weight.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Format a date the way the sheet stores it (dd/mm/yyyy)
pub fn format_sheet_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
