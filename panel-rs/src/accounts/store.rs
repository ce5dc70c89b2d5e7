//! SQLite persistence for reseller and client limits
//!
//! Consumption is always computed from the object tables; the `current_*`
//! counters of `reseller_props` are recomputed from the client limits
//! whenever those change.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use tracing::debug;

use super::types::{ClientAccount, ClientChange, ResellerProps, Role};
use crate::error::{PanelError, Result};
use crate::limits::{bytes_to_mib, mib_to_bytes, Limit, LimitSet, Service, Usage};

/// Which accounts a usage query covers
#[derive(Debug, Clone, Copy)]
enum Scope {
    /// Every client created by the reseller
    Reseller(i64),
    /// One client domain
    Domain(i64),
}

impl Scope {
    fn filter(self) -> (&'static str, i64) {
        match self {
            Scope::Reseller(id) => ("a.created_by", id),
            Scope::Domain(id) => ("d.domain_id", id),
        }
    }
}

/// Object count (or byte sum) for a service, before the scope filter
fn usage_query(service: Service) -> &'static str {
    match service {
        Service::Domains => {
            "SELECT COUNT(*) FROM domain d \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::Subdomains => {
            "SELECT COUNT(*) FROM subdomain x \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::DomainAliases => {
            "SELECT COUNT(*) FROM domain_aliases x \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::MailAccounts => {
            "SELECT COUNT(*) FROM mail_users x \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::FtpAccounts => {
            "SELECT COUNT(*) FROM ftp_users x \
             JOIN domain d ON d.domain_admin_id = x.admin_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::SqlDatabases => {
            "SELECT COUNT(*) FROM sql_database x \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::SqlUsers => {
            "SELECT COUNT(DISTINCT u.sqlu_name) FROM sql_user u \
             JOIN sql_database x ON x.sqld_id = u.sqld_id \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::Traffic => {
            "SELECT COALESCE(SUM(x.traffic_bytes), 0) FROM domain_traffic x \
             JOIN domain d ON d.domain_id = x.domain_id \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
        Service::DiskSpace => {
            "SELECT COALESCE(SUM(d.domain_disk_usage), 0) FROM domain d \
             JOIN admin a ON a.admin_id = d.domain_admin_id"
        }
    }
}

/// Start of the current calendar month, as a unix timestamp
fn month_start(now: DateTime<Utc>) -> i64 {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map(|start| start.timestamp())
        .unwrap_or(0)
}

fn decode_limit(row: &SqliteRow, column: &str) -> Result<Limit> {
    let raw: i64 = row.try_get(column)?;
    Limit::try_from(raw).map_err(|e| {
        PanelError::Database(sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
}

fn decode_count(row: &SqliteRow, column: &str) -> Result<u64> {
    let raw: i64 = row.try_get(column)?;
    Ok(raw.max(0) as u64)
}

/// Reseller and client rows
#[derive(Clone)]
pub struct AccountStore {
    db: SqlitePool,
}

impl AccountStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Initialize database tables
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS admin (
                admin_id INTEGER PRIMARY KEY AUTOINCREMENT,
                admin_name TEXT NOT NULL UNIQUE,
                admin_type TEXT NOT NULL,
                created_by INTEGER
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reseller_props (
                reseller_id INTEGER PRIMARY KEY,
                max_dmn_cnt INTEGER NOT NULL DEFAULT 0,
                current_dmn_cnt INTEGER NOT NULL DEFAULT 0,
                max_sub_cnt INTEGER NOT NULL DEFAULT 0,
                current_sub_cnt INTEGER NOT NULL DEFAULT 0,
                max_als_cnt INTEGER NOT NULL DEFAULT 0,
                current_als_cnt INTEGER NOT NULL DEFAULT 0,
                max_mail_cnt INTEGER NOT NULL DEFAULT 0,
                current_mail_cnt INTEGER NOT NULL DEFAULT 0,
                max_ftp_cnt INTEGER NOT NULL DEFAULT 0,
                current_ftp_cnt INTEGER NOT NULL DEFAULT 0,
                max_sql_db_cnt INTEGER NOT NULL DEFAULT 0,
                current_sql_db_cnt INTEGER NOT NULL DEFAULT 0,
                max_sql_user_cnt INTEGER NOT NULL DEFAULT 0,
                current_sql_user_cnt INTEGER NOT NULL DEFAULT 0,
                max_traff_amnt INTEGER NOT NULL DEFAULT 0,
                current_traff_amnt INTEGER NOT NULL DEFAULT 0,
                max_disk_amnt INTEGER NOT NULL DEFAULT 0,
                current_disk_amnt INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS domain (
                domain_id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_name TEXT NOT NULL UNIQUE,
                domain_admin_id INTEGER NOT NULL,
                domain_status TEXT NOT NULL DEFAULT 'ok',
                domain_subd_limit INTEGER NOT NULL DEFAULT 0,
                domain_alias_limit INTEGER NOT NULL DEFAULT 0,
                domain_mailacc_limit INTEGER NOT NULL DEFAULT 0,
                domain_ftpacc_limit INTEGER NOT NULL DEFAULT 0,
                domain_sqld_limit INTEGER NOT NULL DEFAULT 0,
                domain_sqlu_limit INTEGER NOT NULL DEFAULT 0,
                domain_traffic_limit INTEGER NOT NULL DEFAULT 0,
                domain_disk_limit INTEGER NOT NULL DEFAULT 0,
                domain_disk_usage INTEGER NOT NULL DEFAULT 0,
                mail_quota INTEGER NOT NULL DEFAULT 0,
                domain_last_modified TEXT
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        for ddl in [
            "CREATE TABLE IF NOT EXISTS subdomain (
                subdomain_id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL,
                subdomain_name TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS domain_aliases (
                alias_id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL,
                alias_name TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS mail_users (
                mail_id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL,
                mail_addr TEXT NOT NULL,
                quota INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE IF NOT EXISTS ftp_users (
                userid TEXT PRIMARY KEY,
                admin_id INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS sql_database (
                sqld_id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL,
                sqld_name TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS sql_user (
                sqlu_id INTEGER PRIMARY KEY AUTOINCREMENT,
                sqld_id INTEGER NOT NULL,
                sqlu_name TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS domain_traffic (
                domain_id INTEGER NOT NULL,
                traffic_time INTEGER NOT NULL,
                traffic_bytes INTEGER NOT NULL DEFAULT 0
            )",
        ] {
            sqlx::query(ddl).execute(&self.db).await?;
        }

        Ok(())
    }

    /// Create a reseller account with its limits
    pub async fn create_reseller(&self, name: &str, created_by: i64, limits: &LimitSet) -> Result<i64> {
        let mut tx = self.db.begin().await?;

        let reseller_id = sqlx::query(
            "INSERT INTO admin (admin_name, admin_type, created_by) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(Role::Reseller.to_db_string())
        .bind(created_by)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO reseller_props (reseller_id) VALUES (?)")
            .bind(reseller_id)
            .execute(&mut *tx)
            .await?;
        write_reseller_limits(&mut tx, reseller_id, limits).await?;

        tx.commit().await?;
        Ok(reseller_id)
    }

    /// Create a client with its primary domain; returns the domain id
    pub async fn create_client(
        &self,
        reseller_id: i64,
        name: &str,
        domain_name: &str,
        limits: &LimitSet,
        mail_quota_mib: u64,
    ) -> Result<i64> {
        let mut tx = self.db.begin().await?;

        let admin_id = sqlx::query(
            "INSERT INTO admin (admin_name, admin_type, created_by) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(Role::Client.to_db_string())
        .bind(reseller_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let domain_id = sqlx::query(
            "INSERT INTO domain (domain_name, domain_admin_id, domain_last_modified) VALUES (?, ?, ?)",
        )
        .bind(domain_name)
        .bind(admin_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        write_client_limits(&mut tx, domain_id, limits, mail_quota_mib).await?;
        refresh_reseller_counters(&mut tx, reseller_id).await?;

        tx.commit().await?;
        Ok(domain_id)
    }

    pub async fn add_subdomain(&self, domain_id: i64, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO subdomain (domain_id, subdomain_name) VALUES (?, ?)")
            .bind(domain_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn add_domain_alias(&self, domain_id: i64, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO domain_aliases (domain_id, alias_name) VALUES (?, ?)")
            .bind(domain_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn add_mail_user(&self, domain_id: i64, addr: &str, quota_bytes: u64) -> Result<()> {
        sqlx::query("INSERT INTO mail_users (domain_id, mail_addr, quota) VALUES (?, ?, ?)")
            .bind(domain_id)
            .bind(addr)
            .bind(bytes_column(quota_bytes)?)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn add_ftp_user(&self, admin_id: i64, userid: &str) -> Result<()> {
        sqlx::query("INSERT INTO ftp_users (userid, admin_id) VALUES (?, ?)")
            .bind(userid)
            .bind(admin_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Returns the database id
    pub async fn add_sql_database(&self, domain_id: i64, name: &str) -> Result<i64> {
        let id = sqlx::query("INSERT INTO sql_database (domain_id, sqld_name) VALUES (?, ?)")
            .bind(domain_id)
            .bind(name)
            .execute(&self.db)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn add_sql_user(&self, sqld_id: i64, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO sql_user (sqld_id, sqlu_name) VALUES (?, ?)")
            .bind(sqld_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn record_traffic(&self, domain_id: i64, at: DateTime<Utc>, bytes: u64) -> Result<()> {
        sqlx::query(
            "INSERT INTO domain_traffic (domain_id, traffic_time, traffic_bytes) VALUES (?, ?, ?)",
        )
        .bind(domain_id)
        .bind(at.timestamp())
        .bind(bytes as i64)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    pub async fn set_disk_usage(&self, domain_id: i64, bytes: u64) -> Result<()> {
        sqlx::query("UPDATE domain SET domain_disk_usage = ? WHERE domain_id = ?")
            .bind(bytes as i64)
            .bind(domain_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Reseller limits and assigned counters
    pub async fn reseller_props(&self, reseller_id: i64) -> Result<Option<ResellerProps>> {
        let columns: Vec<String> = Service::ALL
            .iter()
            .flat_map(|s| [s.reseller_field(), s.assigned_field()])
            .map(|c| format!("r.{}", c))
            .collect();
        let sql = format!(
            "SELECT a.admin_name, {} FROM reseller_props r \
             JOIN admin a ON a.admin_id = r.reseller_id \
             WHERE r.reseller_id = ? AND a.admin_type = ?",
            columns.join(", ")
        );

        let row = sqlx::query(&sql)
            .bind(reseller_id)
            .bind(Role::Reseller.to_db_string())
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut limits = LimitSet::default();
        let mut assigned = Usage::default();
        for service in Service::ALL {
            limits.set(service, decode_limit(&row, service.reseller_field())?);
            assigned.set(service, decode_count(&row, service.assigned_field())?);
        }

        Ok(Some(ResellerProps {
            reseller_id,
            name: row.try_get("admin_name")?,
            limits,
            assigned,
        }))
    }

    /// Consumption of all the reseller's clients
    pub async fn reseller_usage(&self, reseller_id: i64) -> Result<Usage> {
        self.usage(Scope::Reseller(reseller_id)).await
    }

    /// Consumption of one client domain
    pub async fn client_usage(&self, domain_id: i64) -> Result<Usage> {
        self.usage(Scope::Domain(domain_id)).await
    }

    async fn usage(&self, scope: Scope) -> Result<Usage> {
        let (column, id) = scope.filter();
        let since = month_start(Utc::now());
        let mut usage = Usage::default();

        for service in Service::ALL {
            let mut sql = format!("{} WHERE {} = ?", usage_query(service), column);
            if service == Service::Traffic {
                sql.push_str(" AND x.traffic_time >= ?");
            }

            let mut query = sqlx::query_as::<_, (i64,)>(&sql).bind(id);
            if service == Service::Traffic {
                query = query.bind(since);
            }
            let (value,) = query.fetch_one(&self.db).await?;
            let value = value.max(0) as u64;

            let value = match service {
                Service::Traffic | Service::DiskSpace => bytes_to_mib(value),
                _ => value,
            };
            usage.set(service, value);
        }

        debug!(?scope, ?usage, "Computed usage");
        Ok(usage)
    }

    /// Services for which at least one of the reseller's clients is unlimited
    pub async fn unlimited_services(&self, reseller_id: i64) -> Result<BTreeSet<Service>> {
        let mut unlimited = BTreeSet::new();

        for service in Service::CLIENT {
            let Some(column) = service.client_field() else {
                continue;
            };
            let sql = format!(
                "SELECT COUNT(*) FROM domain d \
                 JOIN admin a ON a.admin_id = d.domain_admin_id \
                 WHERE a.created_by = ? AND d.{} = 0",
                column
            );
            let (count,): (i64,) = sqlx::query_as(&sql)
                .bind(reseller_id)
                .fetch_one(&self.db)
                .await?;
            if count > 0 {
                unlimited.insert(service);
            }
        }

        Ok(unlimited)
    }

    /// Client domain, only if it belongs to the reseller
    pub async fn client_account(&self, domain_id: i64, reseller_id: i64) -> Result<Option<ClientAccount>> {
        let columns: Vec<String> = Service::CLIENT
            .iter()
            .filter_map(|s| s.client_field())
            .map(|c| format!("d.{}", c))
            .collect();
        let sql = format!(
            "SELECT d.domain_id, d.domain_name, d.domain_admin_id, a.created_by, \
             d.domain_status, d.mail_quota, {} FROM domain d \
             JOIN admin a ON a.admin_id = d.domain_admin_id \
             WHERE d.domain_id = ? AND a.created_by = ?",
            columns.join(", ")
        );

        let row = sqlx::query(&sql)
            .bind(domain_id)
            .bind(reseller_id)
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut limits = LimitSet::default();
        for service in Service::CLIENT {
            if let Some(column) = service.client_field() {
                limits.set(service, decode_limit(&row, column)?);
            }
        }

        Ok(Some(ClientAccount {
            domain_id: row.try_get("domain_id")?,
            domain_name: row.try_get("domain_name")?,
            admin_id: row.try_get("domain_admin_id")?,
            reseller_id: row.try_get("created_by")?,
            status: row.try_get("domain_status")?,
            limits,
            mail_quota: bytes_to_mib(decode_count(&row, "mail_quota")?),
        }))
    }

    pub async fn mailbox_count(&self, domain_id: i64) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM mail_users WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Store new reseller limits
    pub async fn update_reseller_limits(&self, reseller_id: i64, limits: &LimitSet) -> Result<()> {
        let mut tx = self.db.begin().await?;
        write_reseller_limits(&mut tx, reseller_id, limits).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Store a client edit and recompute the reseller's counters
    ///
    /// Runs in one transaction; nothing is written if any statement fails.
    pub async fn apply_client_change(&self, account: &ClientAccount, change: &ClientChange) -> Result<()> {
        let mut tx = self.db.begin().await?;

        write_client_limits(&mut tx, account.domain_id, change.limits.after(), change.mail_quota.after).await?;

        if change.mail_quota.is_changed() && change.mail_quota.after > 0 {
            sync_mailbox_quotas(&mut tx, account.domain_id, mib_to_bytes(change.mail_quota.after)).await?;
        }

        if change.needs_reconfiguration() {
            sqlx::query("UPDATE domain SET domain_status = 'tochange' WHERE domain_id = ? AND domain_status = 'ok'")
                .bind(account.domain_id)
                .execute(&mut *tx)
                .await?;
        }

        refresh_reseller_counters(&mut tx, account.reseller_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Per-mailbox quotas in bytes, in creation order
    pub async fn mailbox_quotas(&self, domain_id: i64) -> Result<Vec<u64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT quota FROM mail_users WHERE domain_id = ? ORDER BY mail_id")
                .bind(domain_id)
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(|(quota,)| quota.max(0) as u64).collect())
    }

    pub async fn domain_status(&self, domain_id: i64) -> Result<Option<String>> {
        let status = sqlx::query_as::<_, (String,)>("SELECT domain_status FROM domain WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_optional(&self.db)
            .await?
            .map(|(status,)| status);
        Ok(status)
    }
}

async fn write_reseller_limits(conn: &mut SqliteConnection, reseller_id: i64, limits: &LimitSet) -> Result<()> {
    let assignments: Vec<String> = Service::ALL
        .iter()
        .map(|s| format!("{} = ?", s.reseller_field()))
        .collect();
    let sql = format!(
        "UPDATE reseller_props SET {} WHERE reseller_id = ?",
        assignments.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for service in Service::ALL {
        query = query.bind(limits.get(service).raw());
    }
    let result = query.bind(reseller_id).execute(&mut *conn).await?;

    if result.rows_affected() == 0 {
        return Err(PanelError::NotFound(format!("Reseller {} not found", reseller_id)));
    }
    Ok(())
}

async fn write_client_limits(
    conn: &mut SqliteConnection,
    domain_id: i64,
    limits: &LimitSet,
    mail_quota_mib: u64,
) -> Result<()> {
    let columns: Vec<&str> = Service::CLIENT.iter().filter_map(|s| s.client_field()).collect();
    let assignments: Vec<String> = columns.iter().map(|c| format!("{} = ?", c)).collect();
    let sql = format!(
        "UPDATE domain SET {}, mail_quota = ?, domain_last_modified = ? WHERE domain_id = ?",
        assignments.join(", ")
    );

    let mut query = sqlx::query(&sql);
    for service in Service::CLIENT {
        if service.client_field().is_some() {
            query = query.bind(limits.get(service).raw());
        }
    }
    let result = query
        .bind(bytes_column(mib_to_bytes(mail_quota_mib))?)
        .bind(Utc::now().to_rfc3339())
        .bind(domain_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PanelError::NotFound(format!("Domain {} not found", domain_id)));
    }
    Ok(())
}

fn bytes_column(bytes: u64) -> Result<i64> {
    i64::try_from(bytes)
        .map_err(|_| PanelError::BadRequest(format!("Quota of {} bytes is out of range", bytes)))
}

/// Shrink the domain's mailbox quotas so their sum fits `total` bytes
///
/// A mailbox without quota counts as `total`. Quotas are scaled down
/// proportionally and rounded down to whole MiB, keeping at least 1 MiB.
async fn sync_mailbox_quotas(conn: &mut SqliteConnection, domain_id: i64, total: u64) -> Result<()> {
    let rows: Vec<(i64, i64)> =
        sqlx::query_as("SELECT mail_id, quota FROM mail_users WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_all(&mut *conn)
            .await?;

    let quotas: Vec<(i64, u64)> = rows
        .into_iter()
        .map(|(id, quota)| match quota {
            q if q > 0 => (id, q as u64),
            _ => (id, total),
        })
        .collect();
    let sum: u128 = quotas.iter().map(|(_, q)| u128::from(*q)).sum();
    if sum <= u128::from(total) {
        return Ok(());
    }

    for (mail_id, quota) in quotas {
        let scaled = (u128::from(quota) * u128::from(total) / sum) as u64;
        let scaled = mib_to_bytes((scaled / mib_to_bytes(1)).max(1));
        sqlx::query("UPDATE mail_users SET quota = ? WHERE mail_id = ?")
            .bind(bytes_column(scaled)?)
            .bind(mail_id)
            .execute(&mut *conn)
            .await?;
    }
    debug!("Mailbox quotas of domain {} scaled to fit {} bytes", domain_id, total);
    Ok(())
}

/// Recompute `current_*` from the limits of the reseller's clients
///
/// Only positive client limits count as assigned; the domain counter is the
/// number of client domains.
async fn refresh_reseller_counters(conn: &mut SqliteConnection, reseller_id: i64) -> Result<()> {
    let clients = "FROM domain d JOIN admin a ON a.admin_id = d.domain_admin_id WHERE a.created_by = ?1";

    let mut assignments = vec![format!(
        "{} = (SELECT COUNT(*) {})",
        Service::Domains.assigned_field(),
        clients
    )];
    for service in Service::CLIENT {
        if let Some(column) = service.client_field() {
            assignments.push(format!(
                "{} = (SELECT COALESCE(SUM(MAX(d.{}, 0)), 0) {})",
                service.assigned_field(),
                column,
                clients
            ));
        }
    }

    let sql = format!(
        "UPDATE reseller_props SET {} WHERE reseller_id = ?1",
        assignments.join(", ")
    );
    sqlx::query(&sql).bind(reseller_id).execute(&mut *conn).await?;

    Ok(())
}
