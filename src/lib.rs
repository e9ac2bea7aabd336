//! # Audit PDF
//!
//! Turns the nested results of a code audit into a paginated PDF report.
//!
//! The input is a tree of `type → section → subsection → result`, where a
//! result lists errors, warnings and suggestions. Every section with
//! something to report starts on its own page; everything below flows down
//! the page and breaks to the next one using fixed thresholds and small
//! size estimates, so a title is never left alone at the bottom of a page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]     Result tree: types, sections, entries, files
//!       ↓
//!   [report]    Walks the tree, decides what gets drawn
//!       ↓         ↘ [sections]  per-entry renderers, by tag
//!   [layout]    Cursor, styles, page breaks, header/footer
//!       ↓         ↘ [i18n]  translation before wrapping
//!   [pdf]       Serialize to PDF bytes
//!       ↓
//!   [output]    Persist through a sink
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod i18n;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod output;
pub mod pdf;
pub mod report;
pub mod sections;
pub mod style;
pub mod text;

use std::path::PathBuf;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use i18n::{Catalog, NoTranslation, Translator};
pub use model::{parse_result_tree, ResultTree};
pub use output::{DirectorySink, OutputSink};
pub use report::ReportAssembler;
pub use sections::{SectionRegistry, SpecificSection};

/// Generate a report with the built-in section renderers and hand it to
/// `sink`. Translations are read from `config.translations` when set.
///
/// This is the primary entry point.
pub fn generate(
    tree: &ResultTree,
    locale: &str,
    config: &ReportConfig,
    sink: &dyn OutputSink,
) -> Result<PathBuf> {
    let translator = load_translator(config)?;
    let sections = SectionRegistry::with_defaults();
    ReportAssembler::new(config, translator.as_ref(), &sections).generate(tree, locale, sink)
}

/// Render a result tree described as JSON to PDF bytes.
pub fn render_json(json: &str, locale: &str, config: &ReportConfig) -> Result<Vec<u8>> {
    let tree = parse_result_tree(json)?;
    let translator = load_translator(config)?;
    let sections = SectionRegistry::with_defaults();
    ReportAssembler::new(config, translator.as_ref(), &sections).render_pdf(&tree, locale)
}

fn load_translator(config: &ReportConfig) -> Result<Box<dyn Translator>> {
    Ok(match &config.translations {
        Some(dir) => Box::new(Catalog::from_dir(dir)?),
        None => Box::new(NoTranslation),
    })
}
