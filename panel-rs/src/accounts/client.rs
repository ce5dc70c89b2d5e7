//! Reseller edits one of its clients

use crate::limits::{
    check_client_limit_against_reseller, validate_limit_for, Limit, LimitViolation, Service,
    ValidationReport, MAX_MAIL_QUOTA_MIB,
};

use super::types::{ChangeSet, ClientChange, ClientContext, LimitsChange, LimitsForm};

const MAIL_QUOTA_FIELD: &str = "mail_quota";

/// Validate a posted client form against the client and its reseller
///
/// Values posted for a service the reseller has disabled are ignored and the
/// current value is kept. The mail quota is only checked while mail stays
/// enabled; otherwise it is reset to 0.
pub fn validate_client_limits(
    ctx: &ClientContext,
    form: &LimitsForm,
) -> (ValidationReport, ClientChange) {
    let reseller = &ctx.reseller;
    let before = ctx.account.limits;
    let mut after = before;
    let mut report = ValidationReport::new();

    let proposed = |service: Service| -> Option<i64> {
        let current = before.get(service).raw();
        if reseller.limits.get(service).is_disabled() {
            return Some(current);
        }
        match form.get(service) {
            Some(value) => value.raw(),
            None => Some(current),
        }
    };

    for service in Service::CLIENT {
        let Some(field) = service.client_field() else {
            continue;
        };
        if reseller.limits.get(service).is_disabled() {
            continue;
        }

        let limit = match proposed(service)
            .filter(|raw| validate_limit_for(service, *raw))
            .and_then(Limit::from_raw)
        {
            Some(limit) => limit,
            None => {
                report.reject(field, LimitViolation::Malformed { service });
                continue;
            }
        };

        if let Err(violation) = check_client_limit_against_reseller(
            limit,
            ctx.usage.get(service),
            before.get(service),
            reseller.assigned.get(service),
            reseller.limits.get(service),
            service,
        ) {
            report.reject(field, violation);
            continue;
        }

        // SQL users without databases (or the reverse) are meaningless
        match service {
            Service::SqlDatabases if !limit.is_disabled() && proposed(Service::SqlUsers) == Some(-1) => {
                report.reject(field, LimitViolation::SqlUsersUnavailable);
                report.flag("domain_sqlu_limit");
                continue;
            }
            Service::SqlUsers if !limit.is_disabled() && proposed(Service::SqlDatabases) == Some(-1) => {
                report.reject(field, LimitViolation::SqlDatabasesUnavailable);
                report.flag("domain_sqld_limit");
                continue;
            }
            _ => {}
        }

        after.set(service, limit);
    }

    let mail_quota = validate_mail_quota(ctx, form, &after, &mut report);

    let change = ClientChange {
        limits: LimitsChange::new(before, after),
        mail_quota: ChangeSet::new(ctx.account.mail_quota, mail_quota),
    };
    (report, change)
}

/// Returns the quota to store, in MiB
fn validate_mail_quota(
    ctx: &ClientContext,
    form: &LimitsForm,
    after: &crate::limits::LimitSet,
    report: &mut ValidationReport,
) -> u64 {
    if after.mail_accounts.is_disabled() {
        return 0;
    }

    let current = ctx.account.mail_quota;
    let raw = if ctx.reseller.limits.mail_accounts.is_disabled() {
        Some(current as i64)
    } else {
        match &form.mail_quota {
            Some(value) => value.raw(),
            None => Some(current as i64),
        }
    };

    let quota = match raw.filter(|q| *q >= 0 && *q as u64 <= MAX_MAIL_QUOTA_MIB) {
        Some(q) => q as u64,
        None => {
            report.reject(MAIL_QUOTA_FIELD, LimitViolation::InvalidMailQuota);
            return current;
        }
    };

    let violation = match after.disk_space {
        Limit::Capped(disk) if quota > disk => Some(LimitViolation::MailQuotaExceedsDisk),
        Limit::Capped(disk) if quota == 0 => Some(LimitViolation::MailQuotaUnlimited { max: disk }),
        _ if quota != 0 && quota < ctx.mailboxes => Some(LimitViolation::MailQuotaBelowMailboxes {
            mailboxes: ctx.mailboxes,
        }),
        _ => None,
    };

    match violation {
        Some(violation) => {
            report.reject(MAIL_QUOTA_FIELD, violation);
            current
        }
        None => quota,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::{ClientAccount, RawLimit, ResellerProps};
    use crate::limits::{LimitSet, Usage};

    fn context(client: LimitSet, reseller: LimitSet, assigned: Usage) -> ClientContext {
        ClientContext {
            account: ClientAccount {
                domain_id: 10,
                domain_name: "example.org".to_string(),
                admin_id: 5,
                reseller_id: 2,
                status: "ok".to_string(),
                limits: client,
                mail_quota: 100,
            },
            usage: Usage::default(),
            reseller: ResellerProps {
                reseller_id: 2,
                name: "reseller1".to_string(),
                limits: reseller,
                assigned,
            },
            mailboxes: 0,
        }
    }

    fn capped(n: u64) -> LimitSet {
        LimitSet::uniform(Limit::Capped(n))
    }

    #[test]
    fn test_valid_edit_within_headroom() {
        let mut assigned = Usage::default();
        assigned.subdomains = 40;
        let mut client = capped(1000);
        client.subdomains = Limit::Capped(20);
        let mut reseller = capped(5000);
        reseller.subdomains = Limit::Capped(50);

        let ctx = context(client, reseller, assigned);
        let form = LimitsForm::default().with(Service::Subdomains, 30);
        let (report, change) = validate_client_limits(&ctx, &form);

        assert!(report.is_valid(), "{:?}", report.violations());
        assert_eq!(change.limits.after().subdomains, Limit::Capped(30));
        assert_eq!(change.limits.diff.len(), 1);
    }

    #[test]
    fn test_headroom_exceeded() {
        let mut assigned = Usage::default();
        assigned.subdomains = 40;
        let mut client = capped(1000);
        client.subdomains = Limit::Capped(20);
        let mut reseller = capped(5000);
        reseller.subdomains = Limit::Capped(50);

        let ctx = context(client, reseller, assigned);
        let form = LimitsForm::default().with(Service::Subdomains, 31);
        let (report, change) = validate_client_limits(&ctx, &form);

        assert_eq!(report.failed_fields(), &["domain_subd_limit"]);
        assert_eq!(change.limits.after().subdomains, Limit::Capped(20));
    }

    #[test]
    fn test_reseller_disabled_service_ignores_post() {
        let mut reseller = capped(5000);
        reseller.ftp_accounts = Limit::Disabled;
        let mut client = capped(100);
        client.ftp_accounts = Limit::Disabled;

        let ctx = context(client, reseller, Usage::default());
        let form = LimitsForm::default().with(Service::FtpAccounts, RawLimit::Text("junk".into()));
        let (report, change) = validate_client_limits(&ctx, &form);

        assert!(report.is_valid());
        assert_eq!(change.limits.after().ftp_accounts, Limit::Disabled);
    }

    #[test]
    fn test_sql_coupling_flags_both_fields() {
        let ctx = context(LimitSet::default(), LimitSet::default(), Usage::default());
        let form = LimitsForm::default()
            .with(Service::SqlDatabases, 5)
            .with(Service::SqlUsers, -1);
        let (report, _) = validate_client_limits(&ctx, &form);

        assert!(report.has_failed("domain_sqld_limit"));
        assert!(report.has_failed("domain_sqlu_limit"));
        assert_eq!(report.violations().len(), 1);
        assert_eq!(
            report.violations()[0].violation,
            LimitViolation::SqlUsersUnavailable
        );
        assert_eq!(
            report.violations()[0].violation.to_string(),
            "SQL users limit is disabled."
        );
    }

    #[test]
    fn test_sql_users_without_databases() {
        let ctx = context(LimitSet::default(), LimitSet::default(), Usage::default());
        let form = LimitsForm::default()
            .with(Service::SqlDatabases, -1)
            .with(Service::SqlUsers, 4);
        let (report, _) = validate_client_limits(&ctx, &form);

        assert!(report.has_failed("domain_sqld_limit"));
        assert!(report.has_failed("domain_sqlu_limit"));
        assert_eq!(
            report.violations()[0].violation.to_string(),
            "SQL databases limit is disabled."
        );
    }

    #[test]
    fn test_mail_quota_rules() {
        let mut client = LimitSet::default();
        client.disk_space = Limit::Capped(500);
        let mut ctx = context(client, LimitSet::default(), Usage::default());
        ctx.mailboxes = 3;

        let cases = [
            (RawLimit::Number(600), Some(LimitViolation::MailQuotaExceedsDisk)),
            (RawLimit::Number(0), Some(LimitViolation::MailQuotaUnlimited { max: 500 })),
            (
                RawLimit::Number(2),
                Some(LimitViolation::MailQuotaBelowMailboxes { mailboxes: 3 }),
            ),
            (RawLimit::Number(-4), Some(LimitViolation::InvalidMailQuota)),
            (RawLimit::Text("250".into()), None),
        ];

        for (quota, expected) in cases {
            let form = LimitsForm {
                mail_quota: Some(quota.clone()),
                ..Default::default()
            };
            let (report, change) = validate_client_limits(&ctx, &form);
            match expected {
                Some(violation) => {
                    assert_eq!(report.failed_fields(), &["mail_quota"], "{:?}", quota);
                    assert_eq!(report.violations()[0].violation, violation);
                    assert!(!change.mail_quota.is_changed());
                }
                None => {
                    assert!(report.is_valid(), "{:?}", quota);
                    assert_eq!(change.mail_quota.after, 250);
                }
            }
        }
    }

    #[test]
    fn test_mail_quota_must_fit_in_bytes() {
        let ctx = context(LimitSet::default(), LimitSet::default(), Usage::default());

        for (quota, valid) in [
            (MAX_MAIL_QUOTA_MIB as i64, true),
            (MAX_MAIL_QUOTA_MIB as i64 + 1, false),
            (1 << 43, false),
            (i64::MAX, false),
        ] {
            let form = LimitsForm {
                mail_quota: Some(RawLimit::Number(quota)),
                ..Default::default()
            };
            let (report, change) = validate_client_limits(&ctx, &form);
            if valid {
                assert!(report.is_valid(), "{}", quota);
                assert_eq!(change.mail_quota.after, quota as u64);
            } else {
                assert_eq!(
                    report.violations()[0].violation,
                    LimitViolation::InvalidMailQuota,
                    "{}",
                    quota
                );
                assert_eq!(change.mail_quota.after, 100);
            }
        }
    }

    #[test]
    fn test_disabling_mail_resets_quota() {
        let ctx = context(LimitSet::default(), LimitSet::default(), Usage::default());
        let form = LimitsForm {
            mail_accounts: Some(RawLimit::Number(-1)),
            mail_quota: Some(RawLimit::Number(-9)),
            ..Default::default()
        };
        let (report, change) = validate_client_limits(&ctx, &form);

        assert!(report.is_valid());
        assert_eq!(change.mail_quota.after, 0);
        assert!(change.needs_reconfiguration());
    }
}
