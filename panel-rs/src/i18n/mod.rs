/// Internationalization
///
/// This module provides:
/// - A reader for gettext `.mo` catalogs
/// - The cached index of installed languages
/// - Message translation and the JS string table

pub mod index;
pub mod js;
pub mod mo;
pub mod translator;

/// Pseudo-locale: let the browser choose
pub const BROWSER_LOCALE: &str = "browser";

pub use index::{LanguageEntry, LanguageIndex, LanguageIndexer, RunMode};
pub use js::js_translations;
pub use mo::{CatalogError, MoCatalog};
pub use translator::{catalog_path, Translator};
