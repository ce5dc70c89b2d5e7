//! Wiring shared by the server and the CLI

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::accounts::{AccountService, AccountStore};
use crate::config::Config;
use crate::error::Result;
use crate::events::EventManager;
use crate::i18n::{LanguageIndexer, RunMode};
use crate::settings::SettingsStore;

/// Open the database; in-memory databases get a single connection so every
/// query sees the same data
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Initialized services
#[derive(Clone)]
pub struct Panel {
    pub accounts: AccountService,
    pub settings: SettingsStore,
    pub languages: LanguageIndexer,
    pub events: Arc<EventManager>,
}

impl Panel {
    pub async fn open(config: &Config, mode: RunMode, events: EventManager) -> Result<Self> {
        let pool = connect(&config.storage.database_url).await?;
        Self::with_pool(pool, config, mode, events).await
    }

    pub async fn with_pool(pool: SqlitePool, config: &Config, mode: RunMode, events: EventManager) -> Result<Self> {
        let store = AccountStore::new(pool.clone());
        store.init_db().await?;

        let settings = SettingsStore::new(pool);
        settings.init_db().await?;
        let loaded = settings.warm().await?;
        info!("Database ready ({} setting(s) loaded)", loaded);

        let events = Arc::new(events);
        let languages = LanguageIndexer::new(config.i18n.locales_dir.clone(), settings.clone(), mode)
            .with_fallback_language(config.i18n.default_language.clone());

        Ok(Self {
            accounts: AccountService::new(store, events.clone()),
            settings,
            languages,
            events,
        })
    }
}
