//! Ledger sheet routes

pub mod api;

pub use api::api_ledger;
