/// Reseller and client accounts
///
/// This module provides:
/// - Request contexts and change sets for limit edits
/// - The reseller (admin side) and client (reseller side) edit flows
/// - SQLite persistence and the request-level [`AccountService`]

pub mod client;
pub mod reseller;
pub mod service;
pub mod store;
pub mod types;

pub use client::validate_client_limits;
pub use reseller::validate_reseller_limits;
pub use service::{AccountService, EditOutcome};
pub use store::AccountStore;
pub use types::{
    ChangeSet, ClientAccount, ClientChange, ClientContext, LimitDiff, LimitsChange, LimitsForm,
    Principal, RawLimit, ResellerContext, ResellerProps, Role,
};
