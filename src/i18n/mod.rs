//! # Translation
//!
//! Text goes through a [`Translator`] before it is measured or drawn. The
//! report does not care where translations come from; [`Catalog`] is the
//! stock implementation, reading one `<locale>.csv` file per locale with
//! `"source","translation"` rows.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ReportError, Result};

/// Locale used when nothing better is available.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Two-letter language → the locale the report falls back to for it.
const LANGUAGE_FALLBACKS: [(&str, &str); 3] = [("en", "en_US"), ("es", "es_ES"), ("fr", "fr_FR")];

/// Looks up the translation of a piece of report text.
pub trait Translator {
    /// Translate `text` into `locale`, or return it unchanged.
    fn translate(&self, text: &str, locale: &str) -> String;

    /// Locale identifiers this translator has data for.
    fn available_locales(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A translator that returns every text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    fn translate(&self, text: &str, _locale: &str) -> String {
        text.to_string()
    }
}

/// In-memory translation tables keyed by locale.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, HashMap<String, String>>,
    /// First five characters of every catalog file name, in directory order.
    available: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.csv` file in `dir`. The file stem is the locale.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Catalog::new();
        let entries = std::fs::read_dir(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReportError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            catalog.available.push(file_name.chars().take(5).collect());

            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let locale = locale.to_string();
            let reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&path)
                .map_err(|source| ReportError::Translations {
                    path: path.clone(),
                    source,
                })?;
            let count = catalog.load_rows(&locale, reader, &path)?;
            debug!(locale = %locale, rows = count, "loaded translation catalog");
        }

        Ok(catalog)
    }

    fn load_rows<R: std::io::Read>(
        &mut self,
        locale: &str,
        mut reader: csv::Reader<R>,
        path: &Path,
    ) -> Result<usize> {
        let mut count = 0;
        for record in reader.records() {
            let record = record.map_err(|source| ReportError::Translations {
                path: path.to_path_buf(),
                source,
            })?;
            match (record.get(0), record.get(1)) {
                (Some(source), Some(translation)) => {
                    self.insert(locale, source, translation);
                    count += 1;
                }
                _ => warn!(
                    path = %path.display(),
                    line = record.position().map(|p| p.line()).unwrap_or(0),
                    "skipping translation row without two columns"
                ),
            }
        }
        Ok(count)
    }

    /// Add a single translation.
    pub fn insert(&mut self, locale: &str, source: &str, translation: &str) {
        self.tables
            .entry(locale.to_string())
            .or_default()
            .insert(source.to_string(), translation.to_string());
        let prefix: String = locale.chars().take(5).collect();
        if !self.available.contains(&prefix) {
            self.available.push(prefix);
        }
    }
}

impl Translator for Catalog {
    fn translate(&self, text: &str, locale: &str) -> String {
        self.tables
            .get(locale)
            .and_then(|table| table.get(text))
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }

    fn available_locales(&self) -> Vec<String> {
        self.available.clone()
    }
}

/// Pick the locale a report is rendered in.
///
/// An exact match among `available` wins; otherwise the two-letter language
/// is looked up in the fallback table; otherwise [`DEFAULT_LOCALE`].
pub fn resolve_locale(requested: &str, available: &[String]) -> String {
    if available.iter().any(|l| l == requested) {
        return requested.to_string();
    }
    let language: String = requested.chars().take(2).collect();
    LANGUAGE_FALLBACKS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, locale)| locale.to_string())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}
