//! Session routes - Login against the Master sheet, logout, current user

pub mod api;

pub use api::{api_login, api_logout, api_session};
