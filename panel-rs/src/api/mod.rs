//! REST API module for panel-rs
//!
//! Provides HTTP endpoints for limit edits and the language index

pub mod accounts;
pub mod auth;
pub mod handlers;
pub mod languages;
pub mod server;

pub use handlers::AppState;
pub use server::{router, ApiServer};
