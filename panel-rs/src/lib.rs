//! panel-rs: hosting control panel core
//!
//! Resource limits for resellers and their clients, and the index of
//! installed translation catalogs.
//!
//! # Features
//!
//! - **Limits**: tri-state limits (`-1` disabled, `0` unlimited, `n` capped)
//!   checked against what the reseller assigned and what clients consume
//! - **Accounts**: reseller and client edit flows persisted in SQLite
//! - **I18n**: gettext `.mo` reader, cached language index, JS strings
//! - **API**: JSON endpoints behind bearer tokens
//!
//! # Example
//!
//! ```no_run
//! use panel_rs::config::Config;
//! use panel_rs::events::EventManager;
//! use panel_rs::i18n::RunMode;
//! use panel_rs::messages::PageMessages;
//! use panel_rs::Panel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let panel = Panel::open(&config, RunMode::Batch, EventManager::new()).await?;
//!
//!     let mut messages = PageMessages::new();
//!     let index = panel.languages.rebuild(&mut messages).await?;
//!     println!("{} language(s)", index.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`limits`]: limit values and validation rules
//! - [`accounts`]: edit flows, SQLite store, request service
//! - [`i18n`]: catalogs and the language index
//! - [`settings`]: two-tier configuration store
//! - [`events`]: extension points
//! - [`api`]: HTTP API

pub mod accounts;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod i18n;
pub mod limits;
pub mod logging;
pub mod messages;
pub mod settings;

// Re-export commonly used types
pub use app::Panel;
pub use config::Config;
pub use error::{PanelError, Result};
