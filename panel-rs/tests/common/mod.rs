//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;

use panel_rs::config::Config;
use panel_rs::events::EventManager;
use panel_rs::i18n::RunMode;
use panel_rs::Panel;

const MAGIC: u32 = 0x9504_12de;

/// Compile `(msgid, msgstr)` pairs into little-endian `.mo` bytes
pub fn mo_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let n = entries.len() as u32;
    let originals = 28u32;
    let translations = originals + 8 * n;
    let mut offset = translations + 8 * n;

    let mut header = Vec::new();
    for v in [MAGIC, 0, n, originals, translations, 0, 0] {
        header.extend_from_slice(&v.to_le_bytes());
    }

    let (mut ids, mut strs, mut data) = (Vec::new(), Vec::new(), Vec::new());
    for (msgid, msgstr) in entries {
        for (s, table) in [(msgid, &mut ids), (msgstr, &mut strs)] {
            table.extend_from_slice(&(s.len() as u32).to_le_bytes());
            table.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(s.as_bytes());
            data.push(0);
            offset += s.len() as u32 + 1;
        }
    }

    [header, ids, strs, data].concat()
}

/// Header entry of a complete catalog
pub fn header(locale: &str, created: &str) -> String {
    format!(
        "Content-Type: text/plain; charset=UTF-8\n\
         Language: {}\n\
         POT-Creation-Date: {}\n\
         Last-Translator: Translator <tr@example.org>\n",
        locale, created
    )
}

/// Write `<root>/<locale>/LC_MESSAGES/<locale>.mo` with a name and one string
pub fn write_catalog(root: &Path, locale: &str, name: &str) {
    let head = header(locale, "2016-01-05 13:32+0100");
    let data = mo_bytes(&[("", head.as_str()), ("_: Localised language", name), ("Yes", "Oui")]);
    write_raw(root, locale, &data);
}

pub fn write_raw(root: &Path, locale: &str, data: &[u8]) {
    let dir = root.join(locale).join("LC_MESSAGES");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.mo", locale)), data).unwrap();
}

pub fn test_config(locales_dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.database_url = "sqlite::memory:".to_string();
    config.i18n.locales_dir = locales_dir.to_path_buf();
    config.server.jwt_secret = "test-secret".to_string();
    config
}

pub async fn open_panel(locales_dir: &Path, mode: RunMode, events: EventManager) -> Panel {
    Panel::open(&test_config(locales_dir), mode, events).await.unwrap()
}
