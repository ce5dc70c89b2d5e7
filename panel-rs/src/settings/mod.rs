//! Two-tier configuration store
//!
//! The durable tier is the SQLite `config` table; the memory tier mirrors
//! the values read or written through this store. Other processes may write
//! the durable tier at any time, so request handlers work on a
//! [`SettingsStore::scoped`] copy whose memory tier lives for one request.

use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Key of the cached language index
pub const AVAILABLE_LANGUAGES: &str = "AVAILABLE_LANGUAGES";
/// Default language for new users
pub const USER_INITIAL_LANG: &str = "USER_INITIAL_LANG";

#[derive(Clone)]
pub struct SettingsStore {
    db: SqlitePool,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl SettingsStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Same durable tier, empty memory tier
    pub fn scoped(&self) -> Self {
        Self::new(self.db.clone())
    }

    /// Initialize database tables
    pub async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS config (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Load every durable value into memory
    pub async fn warm(&self) -> Result<usize> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT name, value FROM config")
            .fetch_all(&self.db)
            .await?;

        let count = rows.len();
        let mut cache = self.cache.write().await;
        cache.extend(rows);
        debug!(count, "Settings loaded");
        Ok(count)
    }

    /// Memory first, then durable storage
    pub async fn get(&self, name: &str) -> Result<Option<String>> {
        if let Some(value) = self.cached(name).await {
            return Ok(Some(value));
        }

        let value = sqlx::query_as::<_, (String,)>("SELECT value FROM config WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.db)
            .await?
            .map(|(value,)| value);

        if let Some(value) = &value {
            self.cache.write().await.insert(name.to_string(), value.clone());
        }
        Ok(value)
    }

    /// Memory tier only
    pub async fn cached(&self, name: &str) -> Option<String> {
        self.cache.read().await.get(name).cloned()
    }

    /// Write durable storage, then memory
    pub async fn set(&self, name: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO config (name, value) VALUES (?, ?) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        )
        .bind(name)
        .bind(value)
        .execute(&self.db)
        .await?;

        self.cache.write().await.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Drop a value from memory; the durable value stays
    pub async fn invalidate(&self, name: &str) {
        self.cache.write().await.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn settings() -> SettingsStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let settings = SettingsStore::new(pool);
        settings.init_db().await.unwrap();
        settings
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers() {
        let settings = settings().await;
        settings.set(USER_INITIAL_LANG, "fr_FR").await.unwrap();

        assert_eq!(settings.cached(USER_INITIAL_LANG).await.as_deref(), Some("fr_FR"));

        settings.invalidate(USER_INITIAL_LANG).await;
        assert!(settings.cached(USER_INITIAL_LANG).await.is_none());
        assert_eq!(settings.get(USER_INITIAL_LANG).await.unwrap().as_deref(), Some("fr_FR"));
        assert!(settings.cached(USER_INITIAL_LANG).await.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_and_warm() {
        let settings = settings().await;
        settings.set("A", "1").await.unwrap();
        settings.set("A", "2").await.unwrap();
        settings.set("B", "3").await.unwrap();

        let fresh = SettingsStore::new(settings.db.clone());
        assert_eq!(fresh.warm().await.unwrap(), 2);
        assert_eq!(fresh.cached("A").await.as_deref(), Some("2"));
        assert!(fresh.get("missing").await.unwrap().is_none());
    }

    async fn file_settings(url: &str) -> SettingsStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .unwrap();
        let settings = SettingsStore::new(pool);
        settings.init_db().await.unwrap();
        settings
    }

    #[tokio::test]
    async fn test_scoped_store_sees_writes_from_another_pool() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("panel.db").display());

        let server = file_settings(&url).await;
        server.set(USER_INITIAL_LANG, "browser").await.unwrap();
        server.warm().await.unwrap();

        let cli = file_settings(&url).await;
        cli.set(USER_INITIAL_LANG, "fr_FR").await.unwrap();

        let request = server.scoped();
        assert!(request.cached(USER_INITIAL_LANG).await.is_none());
        assert_eq!(request.get(USER_INITIAL_LANG).await.unwrap().as_deref(), Some("fr_FR"));

        request.set(USER_INITIAL_LANG, "de_DE").await.unwrap();
        assert_eq!(
            cli.scoped().get(USER_INITIAL_LANG).await.unwrap().as_deref(),
            Some("de_DE")
        );
    }
}
