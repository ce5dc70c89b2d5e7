//! Admin edits a reseller's limits

use crate::limits::{
    check_hierarchical_limit, validate_limit_for, Limit, LimitViolation, Service, ValidationReport,
};

use super::types::{LimitsChange, LimitsForm, ResellerContext};

/// Validate a posted reseller form
///
/// Every service is checked, in form order, so the report lists all
/// failures at once. The returned change only carries the values that
/// passed; it must not be applied unless the report is valid.
pub fn validate_reseller_limits(
    ctx: &ResellerContext,
    form: &LimitsForm,
) -> (ValidationReport, LimitsChange) {
    let before = ctx.props.limits;
    let mut after = before;
    let mut report = ValidationReport::new();

    let proposed = |service: Service| -> Option<i64> {
        match form.get(service) {
            Some(value) => value.raw(),
            None => Some(before.get(service).raw()),
        }
    };

    for service in Service::ALL {
        let field = service.reseller_field();

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

        let coupling = match service {
            Service::SqlDatabases if limit.is_disabled() && proposed(Service::SqlUsers) != Some(-1) => {
                Some(LimitViolation::SqlDatabasesDisabled)
            }
            Service::SqlUsers if limit.is_disabled() && proposed(Service::SqlDatabases) != Some(-1) => {
                Some(LimitViolation::SqlUsersDisabled)
            }
            _ => None,
        };
        if let Some(violation) = coupling {
            report.reject(field, violation);
            continue;
        }

        if let Err(violation) = check_hierarchical_limit(
            limit,
            ctx.props.assigned.get(service),
            ctx.usage.get(service),
            ctx.unlimited.contains(&service),
            service,
        ) {
            report.reject(field, violation);
            continue;
        }

        after.set(service, limit);
    }

    (report, LimitsChange::new(before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::{RawLimit, ResellerProps};
    use crate::limits::{LimitSet, Usage};
    use std::collections::BTreeSet;

    fn context(limits: LimitSet, assigned: Usage, usage: Usage) -> ResellerContext {
        ResellerContext {
            props: ResellerProps {
                reseller_id: 2,
                name: "reseller1".to_string(),
                limits,
                assigned,
            },
            usage,
            unlimited: BTreeSet::new(),
        }
    }

    #[test]
    fn test_empty_form_keeps_current_limits() {
        let ctx = context(LimitSet::uniform(Limit::Capped(10)), Usage::default(), Usage::default());
        let (report, change) = validate_reseller_limits(&ctx, &LimitsForm::default());
        assert!(report.is_valid());
        assert!(change.is_empty());
    }

    #[test]
    fn test_reseller_below_consumption() {
        let mut usage = Usage::default();
        usage.subdomains = 12;
        let ctx = context(LimitSet::default(), usage, usage);

        let form = LimitsForm::default().with(Service::Subdomains, 10);
        let (report, _) = validate_reseller_limits(&ctx, &form);

        assert_eq!(report.failed_fields(), &["max_sub_cnt"]);
        assert_eq!(
            report.violations()[0].violation,
            LimitViolation::ConsumptionExceedsLimit {
                service: Service::Subdomains,
                consumed: 12
            }
        );
    }

    #[test]
    fn test_sql_coupling_on_reseller() {
        let ctx = context(LimitSet::default(), Usage::default(), Usage::default());

        let form = LimitsForm::default().with(Service::SqlDatabases, -1);
        let (report, _) = validate_reseller_limits(&ctx, &form);
        assert_eq!(report.failed_fields(), &["max_sql_db_cnt"]);

        let form = LimitsForm::default()
            .with(Service::SqlDatabases, -1)
            .with(Service::SqlUsers, -1);
        let (report, change) = validate_reseller_limits(&ctx, &form);
        assert!(report.is_valid());
        assert_eq!(change.after().sql_users, Limit::Disabled);
    }

    #[test]
    fn test_domains_traffic_and_disk_cannot_be_disabled() {
        let ctx = context(LimitSet::default(), Usage::default(), Usage::default());
        let form = LimitsForm::default()
            .with(Service::Domains, -1)
            .with(Service::Traffic, -1)
            .with(Service::DiskSpace, -1)
            .with(Service::FtpAccounts, RawLimit::Text("x".into()));
        let (report, _) = validate_reseller_limits(&ctx, &form);
        assert_eq!(
            report.failed_fields(),
            &["max_dmn_cnt", "max_ftp_cnt", "max_traff_amnt", "max_disk_amnt"]
        );
    }

    #[test]
    fn test_unlimited_client_blocks_capping() {
        let mut ctx = context(LimitSet::default(), Usage::default(), Usage::default());
        ctx.unlimited.insert(Service::MailAccounts);

        let form = LimitsForm::default().with(Service::MailAccounts, 50);
        let (report, _) = validate_reseller_limits(&ctx, &form);
        assert!(report.has_failed("max_mail_cnt"));

        let form = LimitsForm::default().with(Service::MailAccounts, 0);
        let (report, _) = validate_reseller_limits(&ctx, &form);
        assert!(report.is_valid());
    }
}
