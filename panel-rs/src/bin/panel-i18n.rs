//! CLI tool for managing translation catalogs
//!
//! # Usage
//!
//! ```bash
//! # Rebuild the languages index
//! panel-i18n rebuild
//!
//! # List installed languages (or only their locales)
//! panel-i18n list
//! panel-i18n list --locales-only
//!
//! # Install a compiled catalog
//! panel-i18n import fr_FR.mo
//!
//! # Change the default language for new users
//! panel-i18n set-default fr_FR
//! ```

use clap::{Parser, Subcommand};
use panel_rs::config::Config;
use panel_rs::events::EventManager;
use panel_rs::i18n::RunMode;
use panel_rs::messages::PageMessages;
use panel_rs::{logging, Panel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "panel-i18n")]
#[command(about = "Manage translation catalogs", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "PANEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the languages index from the catalogs tree
    Rebuild,
    /// List installed languages
    List {
        /// Print locale names only
        #[arg(long)]
        locales_only: bool,
    },
    /// Validate and install a `.mo` file
    Import {
        /// Catalog file
        file: PathBuf,
    },
    /// Set the default language for new users
    SetDefault {
        /// Locale, or `browser`
        locale: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    logging::init(&config.logging);

    let panel = Panel::open(&config, RunMode::Batch, EventManager::new()).await?;
    let languages = &panel.languages;
    let mut messages = PageMessages::new();

    match cli.command {
        Commands::Rebuild => {
            let index = languages.rebuild(&mut messages).await?;
            println!("✓ Languages index rebuilt: {} catalog(s)", index.len());
        }
        Commands::List { locales_only } => {
            if locales_only {
                for locale in languages.available_locales(&mut messages).await? {
                    println!("{}", locale);
                }
            } else {
                let entries = languages.available_languages(&mut messages).await?;

                println!(
                    "{:<12} {:<28} {:<18} {:>8}  {}",
                    "Locale", "Language", "Created", "Strings", "Last translator"
                );
                println!("{:-<100}", "");

                for entry in &entries {
                    println!(
                        "{:<12} {:<28} {:<18} {:>8}  {}",
                        entry.locale,
                        entry.language,
                        entry.creation,
                        entry.translated_strings,
                        entry.last_translator
                    );
                }

                println!("\nTotal: {} language(s)", entries.len().saturating_sub(1));
            }
        }
        Commands::Import { file } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            match languages.import_catalog(&file, &name, &mut messages).await {
                Ok(locale) => println!("✓ {} installed as {}", name, locale),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::SetDefault { locale } => {
            match languages.change_default_language(&locale, &mut messages).await {
                Ok(()) => println!("✓ Default language set to {}", locale),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
