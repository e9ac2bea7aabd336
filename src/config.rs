//! # Report Configuration
//!
//! Everything about a report that is not the result tree itself. All
//! fields have defaults, so `{}` is a valid config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::layout::DEFAULT_LEFT_MARGIN;
use crate::style::Color;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Footer text on every page, cover heading and PDF title.
    pub title: String,
    /// Header logo: a file path or a `data:image/...;base64,` URI.
    pub logo: Option<String>,
    /// File name handed to the output sink.
    pub output_name: String,
    /// Default x of body text.
    pub left_margin: f64,
    /// Color of the general text style.
    pub text_color: Color,
    /// Start the report with a summary page.
    pub cover_page: bool,
    /// Directory of `<locale>.csv` translation catalogs.
    pub translations: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Audit Report".to_string(),
            logo: None,
            output_name: "audit.pdf".to_string(),
            left_margin: DEFAULT_LEFT_MARGIN,
            text_color: Color::BLACK,
            cover_page: true,
            translations: None,
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
