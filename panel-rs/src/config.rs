use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// HS256 secret shared with the login service that issues bearer tokens
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    /// Root of the compiled catalogs tree (`<locale>/LC_MESSAGES/<locale>.mo`)
    pub locales_dir: PathBuf,
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Generated password length advertised to the panel's scripts
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

fn default_language() -> String {
    "browser".to_string()
}

fn default_password_length() -> usize {
    6
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PanelError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| PanelError::Config(e.to_string()))
    }

    /// Load the file named by `PANEL_CONFIG`, then `panel.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("PANEL_CONFIG") {
            return Self::from_file(path);
        }

        if Path::new("panel.toml").exists() {
            Self::from_file("panel.toml")
        } else {
            Ok(Self::default())
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "127.0.0.1:8080".to_string(),
                jwt_secret: "change-me-in-production".to_string(),
            },
            storage: StorageConfig {
                database_url: "sqlite://panel.db?mode=rwc".to_string(),
            },
            i18n: I18nConfig {
                locales_dir: PathBuf::from("i18n/locales"),
                default_language: default_language(),
                password_length: default_password_length(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
