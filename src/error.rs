//! Structured error types for the audit report generator.
//!
//! Layout, measurement and PDF serialization cannot fail. Everything that
//! can fail is either input decoding, a section tag nobody knows how to
//! render, or I/O at the edges (translations, logo, output sink).

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public functions of this crate.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input (result tree or config) failed to parse.
    #[error("failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// An entry carries a `specificSections` tag with no registered renderer.
    #[error("no renderer registered for section tag `{tag}` (entry `{entry}`)")]
    UnknownSection { tag: String, entry: String },

    /// A registered renderer was handed data it cannot lay out.
    #[error("invalid data for section `{tag}`: {reason}")]
    SectionData { tag: String, reason: String },

    /// A translation catalog could not be read.
    #[error("failed to load translations from {}: {source}", .path.display())]
    Translations {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Reading a config file or writing the finished report failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The logo could not be read or decoded.
    #[error("image error: {0}")]
    Image(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape (type → section → subsection → result).".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
