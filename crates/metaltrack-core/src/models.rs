//! Core data models for the ledger

use chrono::NaiveDate;
use metaltrack_parser::EntryRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{Metal, MetalType, Role, StockStatus, VoucherType};

/// Transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sheet row number assigned by the repository
    pub position: usize,
    /// Transaction date (`None` when the sheet cell is unreadable)
    pub date: Option<NaiveDate>,
    pub from: String,
    pub to: String,
    pub voucher_type: VoucherType,
    pub voucher_no: String,
    pub metal_type: MetalType,
    /// Weight in grams; `None` when the sheet held a non-numeric value
    pub weight: Option<Decimal>,
}

impl Transaction {
    /// Valid records carry a metal type, a numeric weight and both parties.
    /// Anything else is excluded from every aggregate.
    pub fn is_valid(&self) -> bool {
        !self.metal_type.is_blank()
            && self.weight.is_some()
            && !self.from.trim().is_empty()
            && !self.to.trim().is_empty()
    }

    /// Weight of a valid record
    pub fn valid_weight(&self) -> Option<Decimal> {
        if self.is_valid() {
            self.weight
        } else {
            None
        }
    }

    /// Check if a party is either side of the transaction
    pub fn involves(&self, party: &str) -> bool {
        self.from == party || self.to == party
    }
}

impl From<EntryRow> for Transaction {
    fn from(row: EntryRow) -> Self {
        Transaction {
            position: row.position,
            date: row.date,
            from: row.from,
            to: row.to,
            voucher_type: VoucherType::from_sheet(&row.voucher_type),
            voucher_no: row.voucher_no,
            metal_type: MetalType::new(row.metal_type),
            weight: row.weight,
        }
    }
}

/// Issued/received totals for one metal type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalBalance {
    pub metal_type: MetalType,
    pub issued_qty: Decimal,
    pub receipt_qty: Decimal,
    /// Sign depends on the view the balance was computed for
    pub balance_qty: Decimal,
}

impl MetalBalance {
    pub fn stock_status(&self, good_threshold: Decimal) -> StockStatus {
        StockStatus::classify(self.balance_qty, good_threshold)
    }
}

/// Debit/credit pair for one party and metal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrCr {
    pub dr: Decimal,
    pub cr: Decimal,
}

impl DrCr {
    /// Positive when the party holds more than it has given out
    pub fn balance(&self) -> Decimal {
        self.cr - self.dr
    }
}

/// Per-party ledger across the tracked metals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyLedgerEntry {
    pub party: String,
    pub metals: BTreeMap<Metal, DrCr>,
    pub total_balance: Decimal,
}

impl PartyLedgerEntry {
    pub fn new(party: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            metals: Metal::ALL.into_iter().map(|m| (m, DrCr::default())).collect(),
            total_balance: Decimal::ZERO,
        }
    }

    pub fn get(&self, metal: Metal) -> DrCr {
        self.metals.get(&metal).copied().unwrap_or_default()
    }

    pub fn balance(&self, metal: Metal) -> Decimal {
        self.get(metal).balance()
    }

    pub(crate) fn debit(&mut self, metal: Metal, weight: Decimal) {
        self.metals.entry(metal).or_default().dr += weight;
    }

    pub(crate) fn credit(&mut self, metal: Metal, weight: Decimal) {
        self.metals.entry(metal).or_default().cr += weight;
    }

    /// Recompute `total_balance` from the per-metal ledgers
    pub(crate) fn recompute_total(&mut self) {
        self.total_balance = Metal::ALL.iter().map(|m| self.balance(*m)).sum();
    }
}

/// Summary card figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Receipt minus issue for Gold
    pub gold_balance: Decimal,
    /// Receipt minus issue for Diamond
    pub diamond_balance: Decimal,
    pub total_issued: Decimal,
    pub total_received: Decimal,
}

/// Direction of a statement line from the party's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The party was the `from` side
    Issued,
    /// The party was the `to` side
    Received,
}

/// A transaction seen from one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub direction: Direction,
    pub counterparty: String,
    pub transaction: Transaction,
}

/// A party's ledger entry together with its transactions, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyStatement {
    pub party: String,
    pub ledger: PartyLedgerEntry,
    pub lines: Vec<StatementLine>,
}

/// Logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(deserialize_with = "super::types::deserialize_role")]
    pub role: Role,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entry_row(metal: &str, weight: Option<Decimal>) -> EntryRow {
        EntryRow {
            position: 2,
            date: NaiveDate::from_ymd_opt(2023, 4, 1),
            from: "A".to_string(),
            to: "B".to_string(),
            voucher_type: "Issue".to_string(),
            voucher_no: "ISS-1".to_string(),
            metal_type: metal.to_string(),
            weight,
        }
    }

    #[test]
    fn test_transaction_from_entry_row() {
        let txn = Transaction::from(entry_row("Gold", Decimal::from_str("31.2").ok()));
        assert_eq!(txn.voucher_type, VoucherType::Issue);
        assert_eq!(txn.metal_type.known(), Some(Metal::Gold));
        assert!(txn.is_valid());
        assert!(txn.involves("A"));
        assert!(!txn.involves("a"));
    }

    #[test]
    fn test_transaction_validity() {
        assert!(!Transaction::from(entry_row("  ", Some(Decimal::ONE))).is_valid());
        assert!(!Transaction::from(entry_row("Gold", None)).is_valid());

        let mut txn = Transaction::from(entry_row("Gold", Some(Decimal::ONE)));
        txn.to = String::new();
        assert!(!txn.is_valid());
        assert_eq!(txn.valid_weight(), None);
    }

    #[test]
    fn test_party_ledger_entry_totals() {
        let mut entry = PartyLedgerEntry::new("A");
        entry.debit(Metal::Gold, Decimal::from(10));
        entry.credit(Metal::Gold, Decimal::from(4));
        entry.credit(Metal::Silver, Decimal::from(3));
        entry.recompute_total();
        assert_eq!(entry.balance(Metal::Gold), Decimal::from(-6));
        assert_eq!(entry.total_balance, Decimal::from(-3));
        assert_eq!(entry.metals.len(), 4);
    }
}
