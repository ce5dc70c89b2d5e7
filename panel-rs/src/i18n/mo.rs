//! GNU gettext machine object (`.mo`) reader
//!
//! Layout: a 28-byte header (magic, revision, string count, offsets of the
//! original and translation tables), then two tables of `(length, offset)`
//! pairs pointing at NUL-terminated strings. Files may be written in either
//! byte order; the magic number tells which.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const MAGIC: u32 = 0x9504_12de;
const HEADER_LEN: usize = 28;

/// msgid of the entry carrying the language's own name
pub const LOCALISED_LANGUAGE_KEY: &str = "_: Localised language";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too short to be a catalog ({0} bytes)")]
    TooShort(usize),

    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),

    #[error("unsupported revision {major}.{minor}")]
    UnsupportedRevision { major: u32, minor: u32 },

    #[error("{table} table entry {index} points outside the file")]
    OutOfBounds { table: &'static str, index: usize },

    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
}

#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

struct Reader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn u32_at(&self, pos: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(pos..pos.checked_add(4)?)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    /// String `index` of the table starting at `table_offset`
    fn string(&self, table: &'static str, table_offset: usize, index: usize) -> Result<&'a str, CatalogError> {
        let out_of_bounds = || CatalogError::OutOfBounds { table, index };

        let entry = index
            .checked_mul(8)
            .and_then(|o| o.checked_add(table_offset))
            .ok_or_else(out_of_bounds)?;
        let len = self.u32_at(entry).ok_or_else(out_of_bounds)? as usize;
        let offset = self.u32_at(entry + 4).ok_or_else(out_of_bounds)? as usize;

        let end = offset.checked_add(len).ok_or_else(out_of_bounds)?;
        let bytes = self.data.get(offset..end).ok_or_else(out_of_bounds)?;
        std::str::from_utf8(bytes).map_err(|_| CatalogError::InvalidUtf8 { index })
    }
}

/// A parsed catalog
#[derive(Debug, Clone, Default)]
pub struct MoCatalog {
    headers: BTreeMap<String, String>,
    /// msgid -> first translation, translated entries only
    translations: BTreeMap<String, String>,
}

impl MoCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self, CatalogError> {
        if data.len() < HEADER_LEN {
            return Err(CatalogError::TooShort(data.len()));
        }

        let order = {
            let raw: [u8; 4] = [data[0], data[1], data[2], data[3]];
            if u32::from_le_bytes(raw) == MAGIC {
                ByteOrder::Little
            } else if u32::from_be_bytes(raw) == MAGIC {
                ByteOrder::Big
            } else {
                return Err(CatalogError::BadMagic(u32::from_le_bytes(raw)));
            }
        };
        let reader = Reader { data, order };
        let header = |pos| reader.u32_at(pos).ok_or(CatalogError::TooShort(data.len()));

        let revision = header(4)?;
        let (major, minor) = (revision >> 16, revision & 0xffff);
        if major > 1 {
            return Err(CatalogError::UnsupportedRevision { major, minor });
        }

        let count = header(8)? as usize;
        let originals = header(12)? as usize;
        let translated = header(16)? as usize;

        let mut catalog = MoCatalog::default();
        for index in 0..count {
            let msgid = reader.string("original", originals, index)?;
            let msgstr = reader.string("translation", translated, index)?;

            if msgid.is_empty() {
                catalog.headers = parse_headers(msgstr);
                continue;
            }

            // Plural entries hold `singular\0plural`; keep the singular forms
            let msgid = msgid.split('\0').next().unwrap_or_default();
            let first = msgstr.split('\0').next().unwrap_or_default();
            if !first.is_empty() {
                catalog.translations.insert(msgid.to_string(), first.to_string());
            }
        }

        Ok(catalog)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn language(&self) -> Option<&str> {
        self.header("Language")
    }

    pub fn pot_creation_date(&self) -> Option<&str> {
        self.header("POT-Creation-Date")
    }

    pub fn last_translator(&self) -> Option<&str> {
        self.header("Last-Translator")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// `POT-Creation-Date` as a timestamp, e.g. `2016-01-05 13:32+0100`
    pub fn creation_date(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.pot_creation_date()?;
        DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M%z")
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M %z"))
            .ok()
    }

    /// Name of the language in the language itself
    pub fn localised_language(&self) -> Option<&str> {
        self.translate(LOCALISED_LANGUAGE_KEY)
    }

    pub fn translate(&self, msgid: &str) -> Option<&str> {
        self.translations.get(msgid).map(String::as_str)
    }

    pub fn translations(&self) -> &BTreeMap<String, String> {
        &self.translations
    }

    pub fn translated_strings(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    pub fn into_translations(self) -> BTreeMap<String, String> {
        self.translations
    }
}

fn parse_headers(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Compile entries into `.mo` bytes; `(msgid, msgstr)` pairs, header first
#[cfg(test)]
pub(crate) fn build_mo(entries: &[(&str, &str)], big_endian: bool) -> Vec<u8> {
    let put = |out: &mut Vec<u8>, v: u32| {
        if big_endian {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    };

    let n = entries.len() as u32;
    let originals = HEADER_LEN as u32;
    let translated = originals + 8 * n;
    let mut strings_at = translated + 8 * n;

    let mut out = Vec::new();
    put(&mut out, MAGIC);
    put(&mut out, 0);
    put(&mut out, n);
    put(&mut out, originals);
    put(&mut out, translated);
    put(&mut out, 0);
    put(&mut out, 0);

    let mut strings = Vec::new();
    let mut tables = (Vec::new(), Vec::new());
    for (msgid, msgstr) in entries {
        for (s, table) in [(msgid, &mut tables.0), (msgstr, &mut tables.1)] {
            put(table, s.len() as u32);
            put(table, strings_at);
            strings.extend_from_slice(s.as_bytes());
            strings.push(0);
            strings_at += s.len() as u32 + 1;
        }
    }

    out.extend(tables.0);
    out.extend(tables.1);
    out.extend(strings);
    out
}
