//! Message translation for the active locale

use std::collections::BTreeMap;
use std::fmt::{Display, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::index::is_safe_locale;
use super::mo::MoCatalog;
use super::BROWSER_LOCALE;

/// Path of a locale's catalog below the locales root
pub fn catalog_path(root: &Path, locale: &str) -> PathBuf {
    root.join(locale)
        .join("LC_MESSAGES")
        .join(format!("{}.mo", locale))
}

/// Translations of one locale; unknown messages fall back to the msgid
#[derive(Debug, Clone, Default)]
pub struct Translator {
    locale: Option<String>,
    table: BTreeMap<String, String>,
}

impl Translator {
    /// Returns every message untranslated
    pub fn untranslated() -> Self {
        Self::default()
    }

    /// Load `<root>/<locale>/LC_MESSAGES/<locale>.mo`
    ///
    /// A missing or unreadable catalog is logged and yields an untranslated
    /// translator; the panel keeps working in the source language.
    pub fn load(root: &Path, locale: &str) -> Self {
        if locale == BROWSER_LOCALE || !is_safe_locale(locale) {
            return Self::untranslated();
        }

        let path = catalog_path(root, locale);
        match MoCatalog::open(&path) {
            Ok(catalog) => {
                debug!(locale, strings = catalog.translated_strings(), "Catalog loaded");
                Self {
                    locale: Some(locale.to_string()),
                    table: catalog.into_translations(),
                }
            }
            Err(e) => {
                warn!("Unable to load catalog {}: {}", path.display(), e);
                Self::untranslated()
            }
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn translate<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.table.get(msgid).map(String::as_str).unwrap_or(msgid)
    }

    /// Translate, then substitute `%s`/`%d` placeholders in order
    pub fn tr(&self, msgid: &str, args: &[&dyn Display]) -> String {
        substitute(self.translate(msgid), args)
    }
}

/// printf-style substitution of `%s` and `%d`; `%%` is a literal percent
fn substitute(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                out.push('%');
                chars.next();
            }
            Some('s') | Some('d') => {
                chars.next();
                if let Some(arg) = args.next() {
                    let _ = write!(out, "{}", arg);
                }
            }
            _ => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::mo::build_mo;

    #[test]
    fn test_substitute() {
        assert_eq!(substitute("%s has %d files", &[&"alice", &3]), "alice has 3 files");
        assert_eq!(substitute("100%% done", &[]), "100% done");
        assert_eq!(substitute("missing %s", &[]), "missing ");
        assert_eq!(substitute("trailing %", &[]), "trailing %");
    }

    #[test]
    fn test_load_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = catalog_path(dir.path(), "de_DE");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            build_mo(&[("", "Language: de_DE\n"), ("Yes", "Ja"), ("Hello %s", "Hallo %s")], false),
        )
        .unwrap();

        let translator = Translator::load(dir.path(), "de_DE");
        assert_eq!(translator.locale(), Some("de_DE"));
        assert_eq!(translator.translate("Yes"), "Ja");
        assert_eq!(translator.translate("No"), "No");
        assert_eq!(translator.tr("Hello %s", &[&"Welt"]), "Hallo Welt");

        assert_eq!(Translator::load(dir.path(), "../de_DE").locale(), None);

        let missing = Translator::load(dir.path(), "it_IT");
        assert_eq!(missing.locale(), None);
        assert_eq!(missing.translate("Yes"), "Yes");
    }
}
