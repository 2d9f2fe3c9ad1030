//! Balance aggregation engine
//!
//! Pure functions deriving balances from a full transaction list. Records
//! failing [`Transaction::is_valid`] are dropped from every computation.

use metaltrack_utils::{contains_ignore_case, locale_cmp};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{
    Direction, MetalBalance, PartyLedgerEntry, PartyStatement, StatementLine, SummaryTotals,
    Transaction,
};
use crate::types::{BalanceView, Metal, MetalType, VoucherType};

fn valid<'a>(transactions: &'a [Transaction]) -> impl Iterator<Item = (&'a Transaction, Decimal)> + 'a {
    transactions
        .iter()
        .filter_map(|t| t.valid_weight().map(|w| (t, w)))
}

/// Issued/received totals per metal type under the given view's convention.
///
/// Only observed metal types appear. The ledger view is sorted by metal type,
/// the stock view keeps first-seen order.
pub fn metal_balances(transactions: &[Transaction], view: BalanceView) -> Vec<MetalBalance> {
    let mut index: HashMap<&MetalType, usize> = HashMap::new();
    let mut balances: Vec<MetalBalance> = Vec::new();

    for (txn, weight) in valid(transactions) {
        let slot = *index.entry(&txn.metal_type).or_insert_with(|| {
            balances.push(MetalBalance {
                metal_type: txn.metal_type.clone(),
                issued_qty: Decimal::ZERO,
                receipt_qty: Decimal::ZERO,
                balance_qty: Decimal::ZERO,
            });
            balances.len() - 1
        });

        let balance = &mut balances[slot];
        match txn.voucher_type {
            VoucherType::Issue => balance.issued_qty += weight,
            VoucherType::Receipt => balance.receipt_qty += weight,
        }
    }

    for balance in &mut balances {
        balance.balance_qty = view.balance(balance.issued_qty, balance.receipt_qty);
    }

    if view == BalanceView::Ledger {
        balances.sort_by(|a, b| locale_cmp(a.metal_type.as_str(), b.metal_type.as_str()));
    }

    balances
}

/// Debit/credit ledger for every party, sorted by party name.
///
/// The `from` side is debited and the `to` side credited for the tracked
/// metals; other metal types register the parties without touching a ledger.
pub fn party_balances(transactions: &[Transaction]) -> Vec<PartyLedgerEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut parties: Vec<PartyLedgerEntry> = Vec::new();

    for (txn, weight) in valid(transactions) {
        let from = party_slot(&mut index, &mut parties, &txn.from);
        let to = party_slot(&mut index, &mut parties, &txn.to);

        if let Some(metal) = txn.metal_type.known() {
            // from == to lands both sides on the same entry
            parties[from].debit(metal, weight);
            parties[to].credit(metal, weight);
        }
        parties[from].recompute_total();
        parties[to].recompute_total();
    }

    parties.sort_by(|a, b| locale_cmp(&a.party, &b.party));
    parties
}

fn party_slot<'a>(
    index: &mut HashMap<&'a str, usize>,
    parties: &mut Vec<PartyLedgerEntry>,
    name: &'a str,
) -> usize {
    *index.entry(name).or_insert_with(|| {
        parties.push(PartyLedgerEntry::new(name));
        parties.len() - 1
    })
}

/// Transactions naming the party on either side, newest first.
///
/// Equal dates keep their input order; undated records sort last.
pub fn transactions_for_party(transactions: &[Transaction], party: &str) -> Vec<Transaction> {
    let mut matching: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.involves(party))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching
}

/// Summary card totals
pub fn summary_totals(transactions: &[Transaction]) -> SummaryTotals {
    let mut totals = SummaryTotals::default();

    for (txn, weight) in valid(transactions) {
        // Receiving increases a metal's balance, issuing decreases it
        let signed = match txn.voucher_type {
            VoucherType::Issue => {
                totals.total_issued += weight;
                -weight
            }
            VoucherType::Receipt => {
                totals.total_received += weight;
                weight
            }
        };

        match txn.metal_type.known() {
            Some(Metal::Gold) => totals.gold_balance += signed,
            Some(Metal::Diamond) => totals.diamond_balance += signed,
            _ => {}
        }
    }

    totals
}

/// A party's ledger entry and its transactions, or `None` for unknown parties
pub fn party_statement(transactions: &[Transaction], party: &str) -> Option<PartyStatement> {
    let ledger = party_balances(transactions)
        .into_iter()
        .find(|entry| entry.party == party)?;

    let lines = transactions_for_party(transactions, party)
        .into_iter()
        .map(|transaction| {
            let (direction, counterparty) = if transaction.from == party {
                (Direction::Issued, transaction.to.clone())
            } else {
                (Direction::Received, transaction.from.clone())
            };
            StatementLine {
                direction,
                counterparty,
                transaction,
            }
        })
        .collect();

    Some(PartyStatement {
        party: party.to_string(),
        ledger,
        lines,
    })
}

/// First `limit` parties (in name order) with a non-zero total balance
pub fn top_parties(entries: &[PartyLedgerEntry], limit: usize) -> Vec<PartyLedgerEntry> {
    entries
        .iter()
        .filter(|entry| !entry.total_balance.is_zero())
        .take(limit)
        .cloned()
        .collect()
}

/// History search across parties, voucher number and metal type
pub fn search_transactions(transactions: &[Transaction], term: &str) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| {
            contains_ignore_case(&t.from, term)
                || contains_ignore_case(&t.to, term)
                || contains_ignore_case(&t.voucher_no, term)
                || contains_ignore_case(t.metal_type.as_str(), term)
        })
        .cloned()
        .collect()
}

/// Balance search by metal type
pub fn search_metal_balances(balances: &[MetalBalance], term: &str) -> Vec<MetalBalance> {
    balances
        .iter()
        .filter(|b| contains_ignore_case(b.metal_type.as_str(), term))
        .cloned()
        .collect()
}
