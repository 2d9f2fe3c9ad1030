//! Transaction routes - History, new entries, deletion and reload
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{
    api_transactions,
    api_create_transaction,
    api_delete_transaction,
    api_reload,
    api_options,
    api_load_state,
};
