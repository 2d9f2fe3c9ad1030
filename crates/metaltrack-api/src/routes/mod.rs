//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints

pub mod session;
pub mod transactions;
pub mod balances;
pub mod ledger;
pub mod notices;
