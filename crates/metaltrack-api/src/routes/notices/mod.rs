//! Notice routes

pub mod api;

pub use api::{api_dismiss_notice, api_notices};
