//! Account types: principals, request contexts, forms and change sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{PanelError, Result};
use crate::limits::{Limit, LimitSet, Service, Usage};

/// Account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reseller,
    Client,
}

impl Role {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reseller => "reseller",
            Role::Client => "user",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "reseller" => Some(Role::Reseller),
            "user" => Some(Role::Client),
            _ => None,
        }
    }
}

/// Authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn require(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(PanelError::Forbidden(format!(
                "{} is not allowed to perform this action",
                self.username
            )))
        }
    }
}

/// Limit value as posted: a JSON number or form text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLimit {
    Number(i64),
    Text(String),
}

impl RawLimit {
    /// Raw integer, or `None` when the text is not a limit at all
    pub fn raw(&self) -> Option<i64> {
        match self {
            RawLimit::Number(n) => Some(*n),
            RawLimit::Text(s) => s.parse::<Limit>().ok().map(Limit::raw),
        }
    }
}

impl From<i64> for RawLimit {
    fn from(n: i64) -> Self {
        RawLimit::Number(n)
    }
}

/// Posted limits; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsForm {
    pub domains: Option<RawLimit>,
    pub subdomains: Option<RawLimit>,
    pub domain_aliases: Option<RawLimit>,
    pub mail_accounts: Option<RawLimit>,
    pub ftp_accounts: Option<RawLimit>,
    pub sql_databases: Option<RawLimit>,
    pub sql_users: Option<RawLimit>,
    pub traffic: Option<RawLimit>,
    pub disk_space: Option<RawLimit>,
    /// Mail quota in MiB, client form only
    pub mail_quota: Option<RawLimit>,
}

impl LimitsForm {
    pub fn get(&self, service: Service) -> Option<&RawLimit> {
        match service {
            Service::Domains => self.domains.as_ref(),
            Service::Subdomains => self.subdomains.as_ref(),
            Service::DomainAliases => self.domain_aliases.as_ref(),
            Service::MailAccounts => self.mail_accounts.as_ref(),
            Service::FtpAccounts => self.ftp_accounts.as_ref(),
            Service::SqlDatabases => self.sql_databases.as_ref(),
            Service::SqlUsers => self.sql_users.as_ref(),
            Service::Traffic => self.traffic.as_ref(),
            Service::DiskSpace => self.disk_space.as_ref(),
        }
    }

    /// Builder used by callers that post a single field
    pub fn with(mut self, service: Service, value: impl Into<RawLimit>) -> Self {
        let value = Some(value.into());
        match service {
            Service::Domains => self.domains = value,
            Service::Subdomains => self.subdomains = value,
            Service::DomainAliases => self.domain_aliases = value,
            Service::MailAccounts => self.mail_accounts = value,
            Service::FtpAccounts => self.ftp_accounts = value,
            Service::SqlDatabases => self.sql_databases = value,
            Service::SqlUsers => self.sql_users = value,
            Service::Traffic => self.traffic = value,
            Service::DiskSpace => self.disk_space = value,
        }
        self
    }
}

/// Reseller row: own limits and what was already handed out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResellerProps {
    pub reseller_id: i64,
    pub name: String,
    pub limits: LimitSet,
    /// `current_*` counters: totals assigned to the reseller's clients
    pub assigned: Usage,
}

/// Everything the reseller edit flow needs, loaded once per request
#[derive(Debug, Clone, Serialize)]
pub struct ResellerContext {
    pub props: ResellerProps,
    /// Consumption of all the reseller's clients
    pub usage: Usage,
    /// Services for which at least one client is unlimited
    pub unlimited: BTreeSet<Service>,
}

/// A client's primary domain and its limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientAccount {
    pub domain_id: i64,
    pub domain_name: String,
    pub admin_id: i64,
    pub reseller_id: i64,
    pub status: String,
    pub limits: LimitSet,
    /// Total mail quota in MiB, 0 = unlimited
    pub mail_quota: u64,
}

/// Everything the client edit flow needs, loaded once per request
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub account: ClientAccount,
    pub usage: Usage,
    pub reseller: ResellerProps,
    pub mailboxes: u64,
}

/// Original and edited value of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeSet<T> {
    pub before: T,
    pub after: T,
}

impl<T: PartialEq> ChangeSet<T> {
    pub fn new(before: T, after: T) -> Self {
        Self { before, after }
    }

    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }
}

/// One service whose limit changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitDiff {
    pub service: Service,
    pub before: Limit,
    pub after: Limit,
}

/// Before/after limit sets with the per-service diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitsChange {
    pub limits: ChangeSet<LimitSet>,
    pub diff: Vec<LimitDiff>,
}

impl LimitsChange {
    pub fn new(before: LimitSet, after: LimitSet) -> Self {
        let diff = Service::ALL
            .iter()
            .filter(|s| before.get(**s) != after.get(**s))
            .map(|s| LimitDiff {
                service: *s,
                before: before.get(*s),
                after: after.get(*s),
            })
            .collect();

        Self {
            limits: ChangeSet::new(before, after),
            diff,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }

    pub fn after(&self) -> &LimitSet {
        &self.limits.after
    }

    /// Whether the service went from disabled to enabled or back
    pub fn toggled(&self, service: Service) -> bool {
        self.diff
            .iter()
            .any(|d| d.service == service && d.before.is_disabled() != d.after.is_disabled())
    }
}

/// Edit of a client account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientChange {
    pub limits: LimitsChange,
    /// Mail quota in MiB
    pub mail_quota: ChangeSet<u64>,
}

impl ClientChange {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && !self.mail_quota.is_changed()
    }

    /// Enabling or disabling mail requires the domain to be reconfigured
    pub fn needs_reconfiguration(&self) -> bool {
        self.limits.toggled(Service::MailAccounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_limit_from_text_and_number() {
        assert_eq!(RawLimit::Number(-1).raw(), Some(-1));
        assert_eq!(RawLimit::Number(-7).raw(), Some(-7));
        assert_eq!(RawLimit::Text("15".into()).raw(), Some(15));
        assert_eq!(RawLimit::Text("015".into()).raw(), None);
        assert_eq!(RawLimit::Text("ten".into()).raw(), None);
    }

    #[test]
    fn test_form_deserializes_numbers_and_text() {
        let form: LimitsForm =
            serde_json::from_str(r#"{"subdomains": 5, "traffic": "2048"}"#).unwrap();
        assert_eq!(form.get(Service::Subdomains), Some(&RawLimit::Number(5)));
        assert_eq!(form.get(Service::Traffic).and_then(RawLimit::raw), Some(2048));
        assert!(form.get(Service::DiskSpace).is_none());
    }

    #[test]
    fn test_limits_change_diff() {
        let before = LimitSet::uniform(Limit::Capped(10));
        let mut after = before;
        after.set(Service::MailAccounts, Limit::Disabled);
        after.set(Service::Traffic, Limit::Capped(20));

        let change = LimitsChange::new(before, after);
        assert_eq!(change.diff.len(), 2);
        assert!(change.toggled(Service::MailAccounts));
        assert!(!change.toggled(Service::Traffic));
        assert!(!LimitsChange::new(before, before).limits.is_changed());
    }

    #[test]
    fn test_principal_require() {
        let admin = Principal::new(1, "admin", Role::Admin);
        assert!(admin.require(Role::Admin).is_ok());
        assert!(matches!(
            admin.require(Role::Reseller),
            Err(PanelError::Forbidden(_))
        ));
    }

    #[test]
    fn test_role_db_strings() {
        assert_eq!(Role::from_db_string("user"), Some(Role::Client));
        assert_eq!(Role::Reseller.to_db_string(), "reseller");
        assert_eq!(Role::from_db_string("root"), None);
    }
}
