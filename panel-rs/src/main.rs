use panel_rs::api::{ApiServer, AppState};
use panel_rs::api::auth::JwtConfig;
use panel_rs::config::Config;
use panel_rs::events::EventManager;
use panel_rs::i18n::RunMode;
use panel_rs::{logging, Panel};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.logging);

    info!("Starting panel-rs");
    info!("  API listening on: {}", config.server.listen_addr);
    info!("  Database: {}", config.storage.database_url);
    info!("  Locales: {}", config.i18n.locales_dir.display());

    if config.server.jwt_secret == Config::default().server.jwt_secret {
        warn!("Using the default JWT secret; set server.jwt_secret");
    }

    let panel = Panel::open(&config, RunMode::Interactive, EventManager::new()).await?;

    let state = AppState {
        accounts: panel.accounts,
        languages: panel.languages,
        events: panel.events,
        jwt_config: JwtConfig::new(config.server.jwt_secret.clone(), 24),
        password_length: config.i18n.password_length,
    };

    let server = ApiServer::new(state, config.server.listen_addr.clone());
    server.run().await?;

    Ok(())
}
