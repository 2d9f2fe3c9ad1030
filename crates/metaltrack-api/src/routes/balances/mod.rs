//! Balance routes - Per-metal balances, party ledgers, summary cards
//!
//! All endpoints here are admin-only.

pub mod api;

pub use api::{
    api_metal_balances,
    api_party_balances,
    api_top_parties,
    api_party_statement,
    api_summary,
};
