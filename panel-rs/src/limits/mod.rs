/// Resource limits for resellers and their clients
///
/// This module provides:
/// - The tri-state [`Limit`] value and the list of limited [`Service`]s
/// - The hierarchical validation rules
/// - [`ValidationReport`] for collecting per-field failures

pub mod report;
pub mod types;
pub mod validator;

pub use report::{FieldViolation, ValidationReport};
pub use types::{
    bytes_to_mib, mib_to_bytes, InvalidLimit, Limit, LimitSet, Service, Usage, MAX_MAIL_QUOTA_MIB,
};
pub use validator::{
    check_client_limit_against_reseller, check_hierarchical_limit, validate_limit,
    validate_limit_for, LimitViolation,
};
