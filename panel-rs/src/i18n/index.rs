//! Index of the installed translation catalogs
//!
//! The index is rebuilt from the catalogs tree and cached as one JSON blob
//! under [`AVAILABLE_LANGUAGES`] in the settings store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::mo::{CatalogError, MoCatalog};
use super::translator::catalog_path;
use super::BROWSER_LOCALE;
use crate::error::{PanelError, Result};
use crate::messages::PageMessages;
use crate::settings::{SettingsStore, AVAILABLE_LANGUAGES, USER_INITIAL_LANG};

const NOT_AVAILABLE: &str = "N/A";

/// One installed catalog
///
/// Field order is the sort order of the index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub locale: String,
    /// `POT-Creation-Date` rendered as `%Y-%m-%d %H:%M`
    pub creation: String,
    pub translated_strings: usize,
    pub last_translator: String,
    /// Name of the language in the language itself
    pub language: String,
    /// File name of the catalog
    pub catalog: String,
}

impl LanguageEntry {
    /// Let the browser pick the language
    pub fn browser() -> Self {
        Self {
            locale: BROWSER_LOCALE.to_string(),
            creation: NOT_AVAILABLE.to_string(),
            translated_strings: 0,
            last_translator: NOT_AVAILABLE.to_string(),
            language: "Auto (Browser language)".to_string(),
            catalog: String::new(),
        }
    }

    fn from_catalog(catalog: &MoCatalog, file_name: String) -> std::result::Result<Self, String> {
        let creation = catalog
            .creation_date()
            .ok_or_else(|| format!("invalid POT-Creation-Date {:?}", catalog.pot_creation_date()))?;

        Ok(Self {
            locale: catalog.language().unwrap_or_default().to_string(),
            creation: creation.format("%Y-%m-%d %H:%M").to_string(),
            translated_strings: catalog.translated_strings(),
            last_translator: catalog.last_translator().unwrap_or_default().to_string(),
            language: catalog.localised_language().unwrap_or("Unknown").to_string(),
            catalog: file_name,
        })
    }
}

/// Sorted list of installed catalogs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageIndex {
    entries: Vec<LanguageEntry>,
}

impl LanguageIndex {
    pub fn new(mut entries: Vec<LanguageEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.entries.iter().any(|e| e.locale == locale)
    }
}

/// Whether the caller can show page messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP request: warnings reach the user
    Interactive,
    /// CLI: warnings are only logged
    Batch,
}

/// Locale names become directory names; keep them to a safe alphabet
pub(crate) fn is_safe_locale(locale: &str) -> bool {
    !locale.is_empty()
        && !locale.starts_with('.')
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '@' | '.'))
}

/// Builds and serves the language index
#[derive(Clone)]
pub struct LanguageIndexer {
    root: PathBuf,
    settings: SettingsStore,
    mode: RunMode,
    fallback_language: String,
}

impl LanguageIndexer {
    pub fn new(root: impl Into<PathBuf>, settings: SettingsStore, mode: RunMode) -> Self {
        Self {
            root: root.into(),
            settings,
            mode,
            fallback_language: BROWSER_LOCALE.to_string(),
        }
    }

    /// Language used when `USER_INITIAL_LANG` was never set
    pub fn with_fallback_language(mut self, locale: impl Into<String>) -> Self {
        self.fallback_language = locale.into();
        self
    }

    /// Indexer whose settings memory tier lasts for one request
    pub fn for_request(&self) -> Self {
        Self {
            settings: self.settings.scoped(),
            ..self.clone()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Scan the catalogs tree and replace the cached index
    pub async fn rebuild(&self, messages: &mut PageMessages) -> Result<LanguageIndex> {
        let mut found: BTreeMap<String, LanguageEntry> = BTreeMap::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path in {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let catalog = match MoCatalog::open(entry.path()) {
                Ok(catalog) => catalog,
                Err(CatalogError::Io(e)) => {
                    debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
                Err(e) => {
                    self.ignore(&file_name, &e, messages);
                    continue;
                }
            };

            if catalog.is_empty() {
                self.ignore(&file_name, &"Translation table is empty.", messages);
                continue;
            }

            match LanguageEntry::from_catalog(&catalog, file_name.clone()) {
                Ok(language) => {
                    found.insert(file_name, language);
                }
                Err(e) => self.ignore(&file_name, &e, messages),
            }
        }

        let index = LanguageIndex::new(found.into_values().collect());
        let blob = serde_json::to_string(&index)?;
        self.settings.set(AVAILABLE_LANGUAGES, &blob).await?;

        info!("Languages index rebuilt: {} catalog(s)", index.len());
        Ok(index)
    }

    fn ignore(&self, file_name: &str, reason: &dyn std::fmt::Display, messages: &mut PageMessages) {
        let message = format!("The {} translation file has been ignored: {}", file_name, reason);
        warn!("{}", message);
        if self.mode == RunMode::Interactive {
            messages.warning(message);
        }
    }

    /// Cached index, if present and readable
    pub async fn cached_index(&self) -> Result<Option<LanguageIndex>> {
        let Some(blob) = self.settings.get(AVAILABLE_LANGUAGES).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&blob) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                warn!("Cached languages index is unreadable, rebuilding: {}", e);
                Ok(None)
            }
        }
    }

    /// Cached index, rebuilt when missing or unreadable
    pub async fn index(&self, messages: &mut PageMessages) -> Result<LanguageIndex> {
        match self.cached_index().await? {
            Some(index) => Ok(index),
            None => self.rebuild(messages).await,
        }
    }

    /// Installed languages, led by the browser-default entry
    pub async fn available_languages(&self, messages: &mut PageMessages) -> Result<Vec<LanguageEntry>> {
        let index = self.index(messages).await?;

        let mut languages = Vec::with_capacity(index.len() + 1);
        languages.push(LanguageEntry::browser());
        languages.extend(index.entries);
        Ok(languages)
    }

    /// `"browser"` followed by every installed locale
    pub async fn available_locales(&self, messages: &mut PageMessages) -> Result<Vec<String>> {
        let index = self.index(messages).await?;

        let mut locales = Vec::with_capacity(index.len() + 1);
        locales.push(BROWSER_LOCALE.to_string());
        locales.extend(index.entries.into_iter().map(|e| e.locale));
        Ok(locales)
    }

    /// Validate and install an uploaded catalog, then rebuild the index
    ///
    /// `name` is the client-side file name, used in messages only. Returns
    /// the installed locale.
    pub async fn import_catalog(&self, path: &Path, name: &str, messages: &mut PageMessages) -> Result<String> {
        let catalog = match MoCatalog::open(path) {
            Ok(catalog) => catalog,
            Err(CatalogError::Io(e)) => return Err(PanelError::Io(e)),
            Err(e) => {
                debug!("Rejected upload {}: {}", name, e);
                return Err(PanelError::BadRequest(
                    "Only gettext Machine Object files (MO files) are accepted.".to_string(),
                ));
            }
        };

        let complete = catalog.content_type().is_some()
            && catalog.pot_creation_date().is_some()
            && catalog.last_translator().is_some()
            && catalog.localised_language().is_some();
        let locale = match catalog.language() {
            Some(locale) if complete && is_safe_locale(locale) => locale.to_string(),
            _ => {
                return Err(PanelError::BadRequest(format!(
                    "{} is not a valid language file.",
                    name
                )))
            }
        };

        let target = catalog_path(&self.root, &locale);
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(path, &target)?;
        info!("Catalog {} installed as {}", name, target.display());

        self.rebuild(messages).await?;
        Ok(locale)
    }

    /// Make `locale` the default for new users; it must be indexed or `"browser"`
    pub async fn change_default_language(&self, locale: &str, messages: &mut PageMessages) -> Result<()> {
        let known = self
            .available_languages(messages)
            .await?
            .iter()
            .any(|l| l.locale == locale);
        if !known {
            return Err(PanelError::BadRequest(format!("Unknown language: {}", locale)));
        }

        self.settings.set(USER_INITIAL_LANG, locale).await?;
        info!("Default language set to {}", locale);
        Ok(())
    }

    /// `USER_INITIAL_LANG`, or the configured fallback
    pub async fn default_language(&self) -> Result<String> {
        Ok(self
            .settings
            .get(USER_INITIAL_LANG)
            .await?
            .unwrap_or_else(|| self.fallback_language.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_sort_by_locale_first() {
        let entry = |locale: &str, creation: &str| LanguageEntry {
            locale: locale.to_string(),
            creation: creation.to_string(),
            translated_strings: 1,
            last_translator: "x".to_string(),
            language: "y".to_string(),
            catalog: format!("{}.mo", locale),
        };

        let index = LanguageIndex::new(vec![
            entry("fr_FR", "2015-01-01 00:00"),
            entry("de_DE", "2016-01-01 00:00"),
            entry("en_GB", "2014-01-01 00:00"),
        ]);
        let locales: Vec<_> = index.entries().iter().map(|e| e.locale.as_str()).collect();
        assert_eq!(locales, ["de_DE", "en_GB", "fr_FR"]);
        assert!(index.contains_locale("en_GB"));
    }

    #[test]
    fn test_browser_entry() {
        let browser = LanguageEntry::browser();
        assert_eq!(browser.locale, "browser");
        assert_eq!(browser.creation, "N/A");
        assert_eq!(browser.last_translator, "N/A");
        assert_eq!(browser.language, "Auto (Browser language)");
    }

    #[test]
    fn test_safe_locale() {
        assert!(is_safe_locale("pt_BR"));
        assert!(is_safe_locale("sr@latin"));
        assert!(!is_safe_locale("../etc"));
        assert!(!is_safe_locale("a/b"));
        assert!(!is_safe_locale(""));
    }
}
