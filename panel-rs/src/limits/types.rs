use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource limit with tri-state semantics
///
/// Stored and exchanged as a raw integer: `-1` disabled, `0` unlimited,
/// `n > 0` a hard cap of `n` units (objects, or MiB for traffic and disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    Disabled,
    Unlimited,
    Capped(u64),
}

impl Limit {
    /// Convert a raw value, rejecting anything below `-1`
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Limit::Disabled),
            0 => Some(Limit::Unlimited),
            n if n > 0 => Some(Limit::Capped(n as u64)),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            Limit::Disabled => -1,
            Limit::Unlimited => 0,
            Limit::Capped(n) => n as i64,
        }
    }

    pub fn is_disabled(self) -> bool {
        self == Limit::Disabled
    }

    pub fn is_unlimited(self) -> bool {
        self == Limit::Unlimited
    }

    /// Disabled or capped, i.e. anything but unlimited
    pub fn is_bounded(self) -> bool {
        !self.is_unlimited()
    }

    /// `used / limit` as shown in consumption columns
    pub fn describe_usage(self, used: u64) -> String {
        match self {
            Limit::Disabled => "Disabled".to_string(),
            Limit::Unlimited => format!("{} / ∞", used),
            Limit::Capped(n) => format!("{} / {}", used, n),
        }
    }
}

impl TryFrom<i64> for Limit {
    type Error = InvalidLimit;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Limit::from_raw(raw).ok_or_else(|| InvalidLimit(raw.to_string()))
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        limit.raw()
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// Form text that is not a valid limit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid limit value: {0:?}")]
pub struct InvalidLimit(pub String);

impl FromStr for Limit {
    type Err = InvalidLimit;

    /// Accepts `-1`, `0` or a decimal number without leading zeros
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || InvalidLimit(s.to_string());

        if s == "-1" {
            return Ok(Limit::Disabled);
        }
        if s == "0" {
            return Ok(Limit::Unlimited);
        }
        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let n: i64 = s.parse().map_err(|_| invalid())?;
        Ok(Limit::Capped(n as u64))
    }
}

/// Limited hosting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Domains,
    Subdomains,
    DomainAliases,
    MailAccounts,
    FtpAccounts,
    SqlDatabases,
    SqlUsers,
    Traffic,
    DiskSpace,
}

impl Service {
    /// Every service, in form order
    pub const ALL: [Service; 9] = [
        Service::Domains,
        Service::Subdomains,
        Service::DomainAliases,
        Service::MailAccounts,
        Service::FtpAccounts,
        Service::SqlDatabases,
        Service::SqlUsers,
        Service::Traffic,
        Service::DiskSpace,
    ];

    /// Services a reseller hands out to a client domain
    pub const CLIENT: [Service; 8] = [
        Service::Subdomains,
        Service::DomainAliases,
        Service::MailAccounts,
        Service::FtpAccounts,
        Service::SqlDatabases,
        Service::SqlUsers,
        Service::Traffic,
        Service::DiskSpace,
    ];

    /// Field name on the reseller form (and `reseller_props` column)
    pub fn reseller_field(self) -> &'static str {
        match self {
            Service::Domains => "max_dmn_cnt",
            Service::Subdomains => "max_sub_cnt",
            Service::DomainAliases => "max_als_cnt",
            Service::MailAccounts => "max_mail_cnt",
            Service::FtpAccounts => "max_ftp_cnt",
            Service::SqlDatabases => "max_sql_db_cnt",
            Service::SqlUsers => "max_sql_user_cnt",
            Service::Traffic => "max_traff_amnt",
            Service::DiskSpace => "max_disk_amnt",
        }
    }

    /// Column holding what the reseller already assigned to its clients
    pub fn assigned_field(self) -> &'static str {
        match self {
            Service::Domains => "current_dmn_cnt",
            Service::Subdomains => "current_sub_cnt",
            Service::DomainAliases => "current_als_cnt",
            Service::MailAccounts => "current_mail_cnt",
            Service::FtpAccounts => "current_ftp_cnt",
            Service::SqlDatabases => "current_sql_db_cnt",
            Service::SqlUsers => "current_sql_user_cnt",
            Service::Traffic => "current_traff_amnt",
            Service::DiskSpace => "current_disk_amnt",
        }
    }

    /// Field name on the client form (and `domain` column). Domains have none.
    pub fn client_field(self) -> Option<&'static str> {
        match self {
            Service::Domains => None,
            Service::Subdomains => Some("domain_subd_limit"),
            Service::DomainAliases => Some("domain_alias_limit"),
            Service::MailAccounts => Some("domain_mailacc_limit"),
            Service::FtpAccounts => Some("domain_ftpacc_limit"),
            Service::SqlDatabases => Some("domain_sqld_limit"),
            Service::SqlUsers => Some("domain_sqlu_limit"),
            Service::Traffic => Some("domain_traffic_limit"),
            Service::DiskSpace => Some("domain_disk_limit"),
        }
    }

    /// Whether `-1` is an accepted value
    pub fn can_be_disabled(self) -> bool {
        !matches!(self, Service::Domains | Service::Traffic | Service::DiskSpace)
    }

    pub fn label(self) -> &'static str {
        match self {
            Service::Domains => "domains",
            Service::Subdomains => "subdomains",
            Service::DomainAliases => "domain aliases",
            Service::MailAccounts => "mail accounts",
            Service::FtpAccounts => "FTP accounts",
            Service::SqlDatabases => "SQL databases",
            Service::SqlUsers => "SQL users",
            Service::Traffic => "traffic",
            Service::DiskSpace => "disk space",
        }
    }

    pub fn singular_label(self) -> &'static str {
        match self {
            Service::Domains => "domain",
            Service::Subdomains => "subdomain",
            Service::DomainAliases => "domain alias",
            Service::MailAccounts => "mail account",
            Service::FtpAccounts => "FTP account",
            Service::SqlDatabases => "SQL database",
            Service::SqlUsers => "SQL user",
            Service::Traffic => "traffic",
            Service::DiskSpace => "disk space",
        }
    }

    pub fn label_for(self, count: u64) -> &'static str {
        if count > 1 {
            self.label()
        } else {
            self.singular_label()
        }
    }
}

/// Capitalized label, used as message prefix
impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

/// One limit per service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSet {
    pub domains: Limit,
    pub subdomains: Limit,
    pub domain_aliases: Limit,
    pub mail_accounts: Limit,
    pub ftp_accounts: Limit,
    pub sql_databases: Limit,
    pub sql_users: Limit,
    pub traffic: Limit,
    pub disk_space: Limit,
}

impl LimitSet {
    /// Every service set to the same limit
    pub fn uniform(limit: Limit) -> Self {
        LimitSet {
            domains: limit,
            subdomains: limit,
            domain_aliases: limit,
            mail_accounts: limit,
            ftp_accounts: limit,
            sql_databases: limit,
            sql_users: limit,
            traffic: limit,
            disk_space: limit,
        }
    }

    pub fn get(&self, service: Service) -> Limit {
        match service {
            Service::Domains => self.domains,
            Service::Subdomains => self.subdomains,
            Service::DomainAliases => self.domain_aliases,
            Service::MailAccounts => self.mail_accounts,
            Service::FtpAccounts => self.ftp_accounts,
            Service::SqlDatabases => self.sql_databases,
            Service::SqlUsers => self.sql_users,
            Service::Traffic => self.traffic,
            Service::DiskSpace => self.disk_space,
        }
    }

    pub fn set(&mut self, service: Service, limit: Limit) {
        let slot = match service {
            Service::Domains => &mut self.domains,
            Service::Subdomains => &mut self.subdomains,
            Service::DomainAliases => &mut self.domain_aliases,
            Service::MailAccounts => &mut self.mail_accounts,
            Service::FtpAccounts => &mut self.ftp_accounts,
            Service::SqlDatabases => &mut self.sql_databases,
            Service::SqlUsers => &mut self.sql_users,
            Service::Traffic => &mut self.traffic,
            Service::DiskSpace => &mut self.disk_space,
        };
        *slot = limit;
    }
}

impl Default for LimitSet {
    fn default() -> Self {
        Self::uniform(Limit::Unlimited)
    }
}

/// Consumption per service. Traffic and disk space are in MiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub domains: u64,
    pub subdomains: u64,
    pub domain_aliases: u64,
    pub mail_accounts: u64,
    pub ftp_accounts: u64,
    pub sql_databases: u64,
    pub sql_users: u64,
    pub traffic: u64,
    pub disk_space: u64,
}

impl Usage {
    pub fn get(&self, service: Service) -> u64 {
        match service {
            Service::Domains => self.domains,
            Service::Subdomains => self.subdomains,
            Service::DomainAliases => self.domain_aliases,
            Service::MailAccounts => self.mail_accounts,
            Service::FtpAccounts => self.ftp_accounts,
            Service::SqlDatabases => self.sql_databases,
            Service::SqlUsers => self.sql_users,
            Service::Traffic => self.traffic,
            Service::DiskSpace => self.disk_space,
        }
    }

    pub fn set(&mut self, service: Service, value: u64) {
        let slot = match service {
            Service::Domains => &mut self.domains,
            Service::Subdomains => &mut self.subdomains,
            Service::DomainAliases => &mut self.domain_aliases,
            Service::MailAccounts => &mut self.mail_accounts,
            Service::FtpAccounts => &mut self.ftp_accounts,
            Service::SqlDatabases => &mut self.sql_databases,
            Service::SqlUsers => &mut self.sql_users,
            Service::Traffic => &mut self.traffic,
            Service::DiskSpace => &mut self.disk_space,
        };
        *slot = value;
    }
}

const MIB: u64 = 1024 * 1024;

/// Largest quota in MiB whose byte count still fits a signed 64-bit column
pub const MAX_MAIL_QUOTA_MIB: u64 = i64::MAX as u64 / MIB;

/// Bytes to MiB, counting a started MiB as used
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes.div_ceil(MIB)
}

pub fn mib_to_bytes(mib: u64) -> u64 {
    mib.saturating_mul(MIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_from_raw() {
        assert_eq!(Limit::from_raw(-1), Some(Limit::Disabled));
        assert_eq!(Limit::from_raw(0), Some(Limit::Unlimited));
        assert_eq!(Limit::from_raw(25), Some(Limit::Capped(25)));
        assert_eq!(Limit::from_raw(-2), None);
        assert_eq!(Limit::Capped(25).raw(), 25);
        assert_eq!(Limit::Disabled.raw(), -1);
    }

    #[test]
    fn test_limit_from_str() {
        assert_eq!("-1".parse::<Limit>(), Ok(Limit::Disabled));
        assert_eq!("0".parse::<Limit>(), Ok(Limit::Unlimited));
        assert_eq!(" 42 ".parse::<Limit>(), Ok(Limit::Capped(42)));
        assert!("01".parse::<Limit>().is_err());
        assert!("-2".parse::<Limit>().is_err());
        assert!("abc".parse::<Limit>().is_err());
        assert!("".parse::<Limit>().is_err());
        assert!("1.5".parse::<Limit>().is_err());
    }

    #[test]
    fn test_limit_serde_as_integer() {
        let json = serde_json::to_string(&Limit::Capped(10)).unwrap();
        assert_eq!(json, "10");

        let limit: Limit = serde_json::from_str("-1").unwrap();
        assert_eq!(limit, Limit::Disabled);

        assert!(serde_json::from_str::<Limit>("-5").is_err());
    }

    #[test]
    fn test_describe_usage() {
        assert_eq!(Limit::Capped(10).describe_usage(3), "3 / 10");
        assert_eq!(Limit::Unlimited.describe_usage(3), "3 / ∞");
        assert_eq!(Limit::Disabled.describe_usage(0), "Disabled");
    }

    #[test]
    fn test_service_fields() {
        assert_eq!(Service::SqlDatabases.reseller_field(), "max_sql_db_cnt");
        assert_eq!(Service::SqlDatabases.client_field(), Some("domain_sqld_limit"));
        assert_eq!(Service::Domains.client_field(), None);
        assert!(!Service::Traffic.can_be_disabled());
        assert!(Service::MailAccounts.can_be_disabled());
    }

    #[test]
    fn test_service_display() {
        assert_eq!(Service::DomainAliases.to_string(), "Domain aliases");
        assert_eq!(Service::SqlUsers.to_string(), "SQL users");
        assert_eq!(Service::MailAccounts.label_for(1), "mail account");
        assert_eq!(Service::MailAccounts.label_for(2), "mail accounts");
    }

    #[test]
    fn test_limit_set_get_set() {
        let mut limits = LimitSet::default();
        assert_eq!(limits.get(Service::Traffic), Limit::Unlimited);

        limits.set(Service::Traffic, Limit::Capped(2048));
        assert_eq!(limits.traffic, Limit::Capped(2048));
        assert_eq!(limits.get(Service::DiskSpace), Limit::Unlimited);
    }

    #[test]
    fn test_bytes_to_mib_rounds_up() {
        assert_eq!(bytes_to_mib(0), 0);
        assert_eq!(bytes_to_mib(1), 1);
        assert_eq!(bytes_to_mib(MIB), 1);
        assert_eq!(bytes_to_mib(MIB + 1), 2);
        assert_eq!(mib_to_bytes(3), 3 * MIB);
    }
}
