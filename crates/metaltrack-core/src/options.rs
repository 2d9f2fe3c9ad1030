//! Dropdown options from the Master sheet and the Ledger sheet filter

use metaltrack_parser::{LedgerRow, MasterRow};
use metaltrack_utils::{contains_ignore_case, locale_cmp};
use serde::{Deserialize, Serialize};

use crate::types::Metal;

/// Options offered by the entry form and the ledger metal selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterOptions {
    pub from_parties: Vec<String>,
    pub to_parties: Vec<String>,
    pub metal_types: Vec<String>,
}

impl Default for MasterOptions {
    /// Fallback used when the Master sheet is empty or unreachable
    fn default() -> Self {
        Self {
            from_parties: Vec::new(),
            to_parties: Vec::new(),
            metal_types: fallback_metals(),
        }
    }
}

fn fallback_metals() -> Vec<String> {
    Metal::ALL.iter().map(|m| m.as_str().to_string()).collect()
}

fn column_values<F>(rows: &[MasterRow], pick: F) -> Vec<String>
where
    F: Fn(&MasterRow) -> &str,
{
    let mut values: Vec<String> = rows
        .iter()
        .map(|row| pick(row).trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    values.sort_by(|a, b| locale_cmp(a, b));
    values
}

impl MasterOptions {
    pub fn from_rows(rows: &[MasterRow]) -> Self {
        let metal_types = column_values(rows, |r| r.metal_option.as_str());
        Self {
            from_parties: column_values(rows, |r| r.from_option.as_str()),
            to_parties: column_values(rows, |r| r.to_option.as_str()),
            metal_types: if metal_types.is_empty() {
                fallback_metals()
            } else {
                metal_types
            },
        }
    }

    /// Gold when offered, otherwise the first option
    pub fn default_ledger_metal(&self) -> Option<&str> {
        self.metal_types
            .iter()
            .find(|m| m.as_str() == Metal::Gold.as_str())
            .or_else(|| self.metal_types.first())
            .map(String::as_str)
    }
}

/// Keep ledger rows for `metal` (case-insensitive), optionally narrowed by name
pub fn filter_ledger(rows: Vec<LedgerRow>, metal: &str, search: Option<&str>) -> Vec<LedgerRow> {
    let metal = metal.trim();
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    rows.into_iter()
        .filter(|row| row.metal_type.trim().eq_ignore_ascii_case(metal))
        .filter(|row| search.map_or(true, |s| contains_ignore_case(&row.name, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn master(from: &str, to: &str, metal: &str) -> MasterRow {
        MasterRow {
            from_option: from.to_string(),
            to_option: to.to_string(),
            metal_option: metal.to_string(),
            username: String::new(),
            password: String::new(),
            role: String::new(),
        }
    }

    fn ledger(name: &str, metal: &str) -> LedgerRow {
        LedgerRow {
            name: name.to_string(),
            metal_type: metal.to_string(),
            dr: Decimal::ZERO,
            cr: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_options_trimmed_sorted_non_blank() {
        let rows = vec![
            master(" Workshop B ", "Nitesh", "Silver"),
            master("Main Warehouse", "", "Gold"),
            master("", "amit", " "),
        ];
        let options = MasterOptions::from_rows(&rows);
        assert_eq!(options.from_parties, vec!["Main Warehouse", "Workshop B"]);
        assert_eq!(options.to_parties, vec!["amit", "Nitesh"]);
        assert_eq!(options.metal_types, vec!["Gold", "Silver"]);
    }

    #[test]
    fn test_empty_metals_fall_back() {
        let options = MasterOptions::from_rows(&[master("A", "B", "")]);
        assert_eq!(options.metal_types, vec!["Gold", "Diamond", "Silver", "Platinum"]);
        assert_eq!(MasterOptions::default().metal_types.len(), 4);
        assert!(MasterOptions::default().from_parties.is_empty());
    }

    #[test]
    fn test_default_ledger_metal() {
        let options = MasterOptions::from_rows(&[master("", "", "Silver"), master("", "", "Gold")]);
        assert_eq!(options.default_ledger_metal(), Some("Gold"));

        let options = MasterOptions::from_rows(&[master("", "", "Silver"), master("", "", "Copper")]);
        assert_eq!(options.default_ledger_metal(), Some("Copper"));
    }

    #[test]
    fn test_filter_ledger() {
        let rows = vec![
            ledger("Workshop A", "GOLD"),
            ledger("Workshop B", "Gold"),
            ledger("Nitesh", "Gold"),
            ledger("Workshop A", "Silver"),
        ];
        let gold = filter_ledger(rows.clone(), "gold", None);
        assert_eq!(gold.len(), 3);

        let shops = filter_ledger(rows, "Gold", Some("shop"));
        let names: Vec<&str> = shops.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Workshop A", "Workshop B"]);
    }
}
