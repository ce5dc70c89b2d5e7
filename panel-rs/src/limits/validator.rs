//! Hierarchical limit rules
//!
//! Pure decision functions: they never touch storage and never fail hard.
//! A rule violation is returned as a [`LimitViolation`] value that names the
//! service and the quantity that made the change illegal.

use std::fmt;

use super::types::{Limit, Service};

/// Why a proposed limit was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitViolation {
    /// Value is not `-1`, `0` or a positive number (or `-1` where not allowed)
    Malformed { service: Service },
    /// New reseller limit is below what its clients already consume
    ConsumptionExceedsLimit { service: Service, consumed: u64 },
    /// New reseller limit is below what the reseller already assigned
    AssignedExceedsLimit { service: Service, assigned: u64 },
    DisableConsumedService { service: Service },
    DisableAssignedService { service: Service },
    /// Some client is unlimited for the service, so the reseller cannot be capped
    UnlimitedSubordinates { service: Service },
    /// A capped reseller cannot grant an unlimited client
    UnlimitedNotAllowed { service: Service },
    DisableClientInUse { service: Service, consumed: u64 },
    /// Client limit above the reseller's remaining headroom
    ExceedsResellerHeadroom { service: Service, max: i64 },
    BelowClientConsumption { service: Service, consumed: u64 },
    /// SQL databases disabled while SQL users are not
    SqlDatabasesDisabled,
    /// SQL users disabled while SQL databases are not
    SqlUsersDisabled,
    /// Client enables SQL users while its SQL databases limit is disabled
    SqlDatabasesUnavailable,
    /// Client enables SQL databases while its SQL users limit is disabled
    SqlUsersUnavailable,
    InvalidMailQuota,
    MailQuotaExceedsDisk,
    MailQuotaUnlimited { max: u64 },
    MailQuotaBelowMailboxes { mailboxes: u64 },
}

impl LimitViolation {
    /// Service the violation is attributed to, if any
    pub fn service(&self) -> Option<Service> {
        use LimitViolation::*;
        match self {
            Malformed { service }
            | ConsumptionExceedsLimit { service, .. }
            | AssignedExceedsLimit { service, .. }
            | DisableConsumedService { service }
            | DisableAssignedService { service }
            | UnlimitedSubordinates { service }
            | UnlimitedNotAllowed { service }
            | DisableClientInUse { service, .. }
            | ExceedsResellerHeadroom { service, .. }
            | BelowClientConsumption { service, .. } => Some(*service),
            SqlDatabasesDisabled
            | SqlUsersDisabled
            | SqlDatabasesUnavailable
            | SqlUsersUnavailable => None,
            InvalidMailQuota
            | MailQuotaExceedsDisk
            | MailQuotaUnlimited { .. }
            | MailQuotaBelowMailboxes { .. } => Some(Service::MailAccounts),
        }
    }
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LimitViolation::*;
        match self {
            Malformed { service } => write!(f, "Incorrect limit for {}.", service.label()),
            ConsumptionExceedsLimit { service, consumed } => write!(
                f,
                "{}: The clients consumption ({}) for this reseller is greater than the new limit.",
                service, consumed
            ),
            AssignedExceedsLimit { service, assigned } => write!(
                f,
                "{}: The total of items ({}) already assigned by the reseller is greater than the new limit.",
                service, assigned
            ),
            DisableConsumedService { service } => write!(
                f,
                "{}: You cannot disable a service already consumed by reseller's customers.",
                service
            ),
            DisableAssignedService { service } => write!(
                f,
                "{}: You cannot disable a service already sold to reseller's customers.",
                service
            ),
            UnlimitedSubordinates { service } => write!(
                f,
                "{}: This reseller has customer(s) with unlimited items. \
                 If you want to limit the reseller, you must first limit its customers.",
                service
            ),
            UnlimitedNotAllowed { service } => write!(
                f,
                "The {} limit for this customer cannot be unlimited because you are limited for this service.",
                service.label()
            ),
            DisableClientInUse { service, consumed } => write!(
                f,
                "The {} limit for this customer cannot be set to 'disabled' because the customer already has {} {}.",
                service.label(),
                consumed,
                service.label_for(*consumed)
            ),
            ExceedsResellerHeadroom { service, max } => write!(
                f,
                "The {} limit for this customer cannot be greater than {}, your calculated limit.",
                service.label(),
                max
            ),
            BelowClientConsumption { service, consumed } => write!(
                f,
                "The {} limit for this customer cannot be lower than {}, the total of {} already used.",
                service.label(),
                consumed,
                service.label_for(*consumed)
            ),
            SqlDatabasesDisabled => {
                write!(f, "SQL databases limit is disabled but SQL users limit is not.")
            }
            SqlUsersDisabled => {
                write!(f, "SQL users limit is disabled but SQL databases limit is not.")
            }
            SqlDatabasesUnavailable => write!(f, "SQL databases limit is disabled."),
            SqlUsersUnavailable => write!(f, "SQL users limit is disabled."),
            InvalidMailQuota => write!(f, "Wrong syntax for the mail quota value."),
            MailQuotaExceedsDisk => write!(f, "Mail quota cannot be bigger than disk space limit."),
            MailQuotaUnlimited { max } => write!(
                f,
                "Mail quota cannot be unlimited. Max value is {} MiB.",
                max
            ),
            MailQuotaBelowMailboxes { mailboxes } => write!(
                f,
                "Mail quota cannot be lower than {}. Each mail account must have at least 1 MiB quota.",
                mailboxes
            ),
        }
    }
}

impl std::error::Error for LimitViolation {}

/// Syntax check: `-1`, `0` or any positive value
pub fn validate_limit(new_limit: i64) -> bool {
    new_limit == -1 || new_limit >= 0
}

/// Syntax check that also refuses `-1` for services that cannot be disabled
pub fn validate_limit_for(service: Service, new_limit: i64) -> bool {
    match new_limit {
        -1 => service.can_be_disabled(),
        n => n >= 0,
    }
}

/// Check a new parent-level limit against what the subordinates already use
///
/// `assigned_by_parent` is the total the parent already handed out,
/// `consumed_by_subordinates` what is actually in use, and
/// `parent_service_unlimited` whether some subordinate relies on the service
/// being unlimited.
pub fn check_hierarchical_limit(
    new_limit: Limit,
    assigned_by_parent: u64,
    consumed_by_subordinates: u64,
    parent_service_unlimited: bool,
    service: Service,
) -> Result<(), LimitViolation> {
    match new_limit {
        Limit::Unlimited => Ok(()),
        _ if parent_service_unlimited => Err(LimitViolation::UnlimitedSubordinates { service }),
        Limit::Capped(n) if n < consumed_by_subordinates => {
            Err(LimitViolation::ConsumptionExceedsLimit {
                service,
                consumed: consumed_by_subordinates,
            })
        }
        Limit::Capped(n) if n < assigned_by_parent => Err(LimitViolation::AssignedExceedsLimit {
            service,
            assigned: assigned_by_parent,
        }),
        Limit::Disabled if consumed_by_subordinates > 0 => {
            Err(LimitViolation::DisableConsumedService { service })
        }
        Limit::Disabled if assigned_by_parent > 0 => {
            Err(LimitViolation::DisableAssignedService { service })
        }
        _ => Ok(()),
    }
}

/// Raw value widened so headroom sums cannot overflow
fn wide(limit: Limit) -> i128 {
    match limit {
        Limit::Disabled => -1,
        Limit::Unlimited => 0,
        Limit::Capped(n) => i128::from(n),
    }
}

/// Check a new client limit against the client's usage and the reseller's headroom
///
/// Rule order matters: later rules assume the earlier ones passed.
pub fn check_client_limit_against_reseller(
    new_client_limit: Limit,
    client_consumption: u64,
    client_limit: Limit,
    reseller_consumption: u64,
    reseller_limit: Limit,
    service: Service,
) -> Result<(), LimitViolation> {
    if reseller_limit.is_bounded() && new_client_limit.is_unlimited() {
        return Err(LimitViolation::UnlimitedNotAllowed { service });
    }

    if new_client_limit.is_disabled() && client_consumption > 0 {
        return Err(LimitViolation::DisableClientInUse {
            service,
            consumed: client_consumption,
        });
    }

    if reseller_limit.is_bounded() {
        let headroom =
            wide(reseller_limit) - i128::from(reseller_consumption) + wide(client_limit);
        if wide(new_client_limit) > headroom {
            return Err(LimitViolation::ExceedsResellerHeadroom {
                service,
                max: headroom.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            });
        }
    }

    if let Limit::Capped(n) = new_client_limit {
        if n < client_consumption {
            return Err(LimitViolation::BelowClientConsumption {
                service,
                consumed: client_consumption,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVC: Service = Service::Subdomains;

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(-1));
        assert!(validate_limit(0));
        assert!(validate_limit(1));
        assert!(validate_limit(i64::MAX));
        assert!(!validate_limit(-2));
        assert!(!validate_limit(i64::MIN));
    }

    #[test]
    fn test_validate_limit_for_services_without_disable() {
        assert!(!validate_limit_for(Service::Domains, -1));
        assert!(!validate_limit_for(Service::Traffic, -1));
        assert!(!validate_limit_for(Service::DiskSpace, -1));
        assert!(validate_limit_for(Service::DiskSpace, 0));
        assert!(validate_limit_for(Service::SqlUsers, -1));
        assert!(!validate_limit_for(Service::SqlUsers, -3));
    }

    #[test]
    fn test_unlimited_is_always_legal() {
        for unlimited in [false, true] {
            for (assigned, consumed) in [(0, 0), (10, 5), (100, 200)] {
                assert_eq!(
                    check_hierarchical_limit(Limit::Unlimited, assigned, consumed, unlimited, SVC),
                    Ok(())
                );
            }
        }
    }

    #[test]
    fn test_disable_untouched_service() {
        assert_eq!(check_hierarchical_limit(Limit::Disabled, 0, 0, false, SVC), Ok(()));
    }

    #[test]
    fn test_disable_consumed_service() {
        assert_eq!(
            check_hierarchical_limit(Limit::Disabled, 0, 5, false, SVC),
            Err(LimitViolation::DisableConsumedService { service: SVC })
        );
    }

    #[test]
    fn test_disable_assigned_service() {
        assert_eq!(
            check_hierarchical_limit(Limit::Disabled, 3, 0, false, SVC),
            Err(LimitViolation::DisableAssignedService { service: SVC })
        );
    }

    #[test]
    fn test_below_assigned() {
        assert_eq!(
            check_hierarchical_limit(Limit::Capped(10), 20, 5, false, SVC),
            Err(LimitViolation::AssignedExceedsLimit {
                service: SVC,
                assigned: 20
            })
        );
    }

    #[test]
    fn test_below_consumption_reported_first() {
        assert_eq!(
            check_hierarchical_limit(Limit::Capped(4), 20, 5, false, SVC),
            Err(LimitViolation::ConsumptionExceedsLimit {
                service: SVC,
                consumed: 5
            })
        );
    }

    #[test]
    fn test_bounded_with_unlimited_subordinates() {
        assert_eq!(
            check_hierarchical_limit(Limit::Capped(100), 0, 0, true, SVC),
            Err(LimitViolation::UnlimitedSubordinates { service: SVC })
        );
        assert_eq!(
            check_hierarchical_limit(Limit::Disabled, 0, 0, true, SVC),
            Err(LimitViolation::UnlimitedSubordinates { service: SVC })
        );
    }

    #[test]
    fn test_hierarchical_within_bounds() {
        assert_eq!(check_hierarchical_limit(Limit::Capped(20), 20, 5, false, SVC), Ok(()));
    }

    #[test]
    fn test_capped_reseller_cannot_grant_unlimited() {
        assert_eq!(
            check_client_limit_against_reseller(Limit::Unlimited, 0, Limit::Capped(5), 10, Limit::Capped(50), SVC),
            Err(LimitViolation::UnlimitedNotAllowed { service: SVC })
        );
        assert_eq!(
            check_client_limit_against_reseller(Limit::Unlimited, 0, Limit::Capped(5), 0, Limit::Disabled, SVC),
            Err(LimitViolation::UnlimitedNotAllowed { service: SVC })
        );
    }

    #[test]
    fn test_unlimited_reseller_can_grant_unlimited() {
        assert_eq!(
            check_client_limit_against_reseller(Limit::Unlimited, 7, Limit::Capped(10), 30, Limit::Unlimited, SVC),
            Ok(())
        );
    }

    #[test]
    fn test_cannot_disable_used_client_service() {
        assert_eq!(
            check_client_limit_against_reseller(Limit::Disabled, 2, Limit::Capped(5), 10, Limit::Unlimited, SVC),
            Err(LimitViolation::DisableClientInUse {
                service: SVC,
                consumed: 2
            })
        );
    }

    #[test]
    fn test_headroom_boundary() {
        // headroom = (50 - 40) + 20 = 30
        assert_eq!(
            check_client_limit_against_reseller(Limit::Capped(30), 10, Limit::Capped(20), 40, Limit::Capped(50), SVC),
            Ok(())
        );
        assert_eq!(
            check_client_limit_against_reseller(Limit::Capped(31), 10, Limit::Capped(20), 40, Limit::Capped(50), SVC),
            Err(LimitViolation::ExceedsResellerHeadroom {
                service: SVC,
                max: 30
            })
        );
    }

    #[test]
    fn test_headroom_with_largest_reseller_limit() {
        let max = Limit::Capped(i64::MAX as u64);
        assert_eq!(
            check_client_limit_against_reseller(Limit::Capped(10), 0, Limit::Capped(5), 0, max, SVC),
            Ok(())
        );
        assert_eq!(
            check_client_limit_against_reseller(max, 0, Limit::Capped(5), 0, max, SVC),
            Ok(())
        );

        // headroom = (MAX - MAX) + 5
        assert_eq!(
            check_client_limit_against_reseller(Limit::Capped(6), 0, Limit::Capped(5), i64::MAX as u64, max, SVC),
            Err(LimitViolation::ExceedsResellerHeadroom { service: SVC, max: 5 })
        );
    }

    #[test]
    fn test_hierarchical_with_largest_limit() {
        let max = Limit::Capped(i64::MAX as u64);
        assert!(check_hierarchical_limit(max, u64::MAX, 0, false, SVC).is_err());
        assert_eq!(check_hierarchical_limit(max, i64::MAX as u64, i64::MAX as u64, false, SVC), Ok(()));
    }

    #[test]
    fn test_cannot_shrink_below_client_usage() {
        assert_eq!(
            check_client_limit_against_reseller(Limit::Capped(3), 8, Limit::Capped(10), 10, Limit::Unlimited, SVC),
            Err(LimitViolation::BelowClientConsumption {
                service: SVC,
                consumed: 8
            })
        );
    }

    #[test]
    fn test_messages_name_the_service_and_quantity() {
        let violation = LimitViolation::ConsumptionExceedsLimit {
            service: Service::MailAccounts,
            consumed: 12,
        };
        assert_eq!(
            violation.to_string(),
            "Mail accounts: The clients consumption (12) for this reseller is greater than the new limit."
        );

        let violation = LimitViolation::DisableClientInUse {
            service: Service::FtpAccounts,
            consumed: 1,
        };
        assert!(violation.to_string().ends_with("already has 1 FTP account."));

        let violation = LimitViolation::UnlimitedSubordinates {
            service: Service::SqlDatabases,
        };
        assert!(violation.to_string().starts_with("SQL databases: This reseller has customer(s) with unlimited items."));
    }

    #[test]
    fn test_violation_service() {
        assert_eq!(
            LimitViolation::MailQuotaExceedsDisk.service(),
            Some(Service::MailAccounts)
        );
        assert_eq!(LimitViolation::SqlUsersDisabled.service(), None);
        assert_eq!(LimitViolation::SqlUsersUnavailable.service(), None);
    }
}
