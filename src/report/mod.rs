//! # Report Assembly
//!
//! Walks the result tree in input order and drives the layout engine:
//! one fresh page and title per section that has anything to show, one
//! section title per actionable subsection, then the errors, warnings and
//! suggestions blocks of that subsection.
//!
//! Tags are checked against the section registry before anything is laid
//! out, and the sink is only called once the whole PDF exists, so a failed
//! report never leaves a partial file behind.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::ReportConfig;
use crate::error::Result;
use crate::i18n::{resolve_locale, Translator};
use crate::image_loader::load_logo;
use crate::layout::size::{self, Block};
use crate::layout::{
    Document, LayoutEngine, LayoutOptions, BLOCK_LABEL_ADVANCE, SECTION_BREAK_BASE,
};
use crate::model::{Entry, ResultTree, SectionResults, Severity, SubResult, TypeResults};
use crate::output::OutputSink;
use crate::pdf::PdfWriter;
use crate::sections::generic::render_file_list;
use crate::sections::SectionRegistry;

/// x of the top-level section title.
const SECTION_TITLE_X: f64 = 40.0;
const BLOCK_LABEL_SIZE: f64 = 14.0;

/// Builds reports. Holds only read-only collaborators; every call to
/// [`render`](Self::render) gets its own [`LayoutEngine`].
pub struct ReportAssembler<'a> {
    config: &'a ReportConfig,
    translator: &'a dyn Translator,
    sections: &'a SectionRegistry,
    created_at: Option<NaiveDateTime>,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(
        config: &'a ReportConfig,
        translator: &'a dyn Translator,
        sections: &'a SectionRegistry,
    ) -> Self {
        Self {
            config,
            translator,
            sections,
            created_at: None,
        }
    }

    /// Stamp reports with a fixed time instead of the current local time.
    pub fn with_timestamp(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Lay out, serialize and persist a report. Returns where it was written.
    pub fn generate(&self, tree: &ResultTree, locale: &str, sink: &dyn OutputSink) -> Result<PathBuf> {
        let bytes = self.render_pdf(tree, locale)?;
        sink.write_output(&bytes, &self.config.output_name)
    }

    /// Lay out and serialize a report without persisting it.
    pub fn render_pdf(&self, tree: &ResultTree, locale: &str) -> Result<Vec<u8>> {
        let document = self.render(tree, locale)?;
        let bytes = PdfWriter::new().write(&document);
        info!(pages = document.pages.len(), bytes = bytes.len(), "report serialized");
        Ok(bytes)
    }

    /// Lay out a report.
    pub fn render(&self, tree: &ResultTree, locale: &str) -> Result<Document> {
        self.sections.validate(tree)?;

        let locale = resolve_locale(locale, &self.translator.available_locales());
        info!(locale = %locale, types = tree.len(), "rendering audit report");

        let options = LayoutOptions {
            title: self.config.title.clone(),
            logo: self.config.logo.as_deref().and_then(load_logo),
            left_margin: self.config.left_margin,
            text_color: self.config.text_color,
            created_at: self
                .created_at
                .unwrap_or_else(|| chrono::Local::now().naive_local()),
        };
        let mut layout = LayoutEngine::new(options, self.translator, locale);

        if self.config.cover_page {
            self.write_summary(&mut layout, tree);
        }

        for sections in tree.values() {
            for (section, subsections) in sections.iter() {
                self.write_section(&mut layout, section, subsections)?;
            }
        }

        Ok(layout.finish())
    }

    fn write_section(
        &self,
        layout: &mut LayoutEngine<'_>,
        section: &str,
        subsections: &SectionResults,
    ) -> Result<()> {
        let mut is_first = true;
        for (subsection, sub) in subsections.iter() {
            if !sub.is_actionable() {
                continue;
            }
            if is_first {
                layout.add_page();
                layout.write_title(section, Some(SECTION_TITLE_X));
                is_first = false;
            }
            layout.break_if_below(
                SECTION_BREAK_BASE + size::title_plus_first_subsection(Block::SubResult(sub)),
                "subsection",
            );
            layout.write_section_title(subsection);
            self.write_sub_result(layout, sub)?;
        }
        Ok(())
    }

    fn write_sub_result(&self, layout: &mut LayoutEngine<'_>, sub: &SubResult) -> Result<()> {
        for severity in Severity::ALL {
            let entries = sub.entries(severity);
            if entries.is_empty() {
                continue;
            }

            let needed = size::title_plus_first_subsection(Block::Entries(entries));
            let broke = layout.break_if_below(needed, severity.label());
            if !broke && severity != Severity::Error {
                layout.advance(BLOCK_LABEL_ADVANCE);
            }

            match severity {
                Severity::Error => layout.set_error_style(BLOCK_LABEL_SIZE),
                Severity::Warning => layout.set_warning_style(BLOCK_LABEL_SIZE),
                Severity::Suggestion => {
                    layout.set_general_style(BLOCK_LABEL_SIZE, self.config.text_color)
                }
            }
            layout.write_block_label(severity.label());

            for (name, entry) in entries.iter() {
                match entry {
                    Entry::Generic(generic) => render_file_list(generic, layout),
                    Entry::Tagged(tagged) => {
                        self.sections
                            .get(&tagged.tag, name)?
                            .render(&tagged.data, layout)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Cover page: the report title, then per type the number of entries
    /// of each severity across its actionable subsections.
    fn write_summary(&self, layout: &mut LayoutEngine<'_>, tree: &ResultTree) {
        layout.write_title(&self.config.title, None);

        let mut any = false;
        for (type_name, sections) in tree.iter() {
            let Some(counts) = count_entries(sections) else {
                continue;
            };
            any = true;
            layout.write_section_title(type_name);
            for (severity, count) in Severity::ALL.iter().zip(counts) {
                let label = layout.translate(severity.label());
                layout.write_line(&format!("{}: {}", label, count));
            }
        }
        if !any {
            layout.write_line("No issues found.");
        }
    }
}

/// Entry counts per severity over the actionable subsections of a type, or
/// `None` when the type has no actionable subsection.
fn count_entries(sections: &TypeResults) -> Option<[usize; 3]> {
    let mut counts = [0; 3];
    let mut actionable = false;
    for sub in sections
        .values()
        .flat_map(|subsections| subsections.values())
        .filter(|sub| sub.is_actionable())
    {
        actionable = true;
        for (i, severity) in Severity::ALL.iter().enumerate() {
            counts[i] += sub.entries(*severity).len();
        }
    }
    actionable.then_some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::NoTranslation;
    use crate::layout::DrawOp;
    use crate::model::parse_result_tree;

    fn render(tree: &str, config: &ReportConfig) -> Document {
        let translator = NoTranslation;
        let sections = SectionRegistry::with_defaults();
        let tree = parse_result_tree(tree).unwrap();
        ReportAssembler::new(config, &translator, &sections)
            .render(&tree, "en_US")
            .unwrap()
    }

    fn y_of(doc: &Document, needle: &str) -> (usize, f64) {
        for (i, page) in doc.pages.iter().enumerate() {
            for op in &page.ops {
                if let DrawOp::Text { text, y, .. } = op {
                    if text == needle {
                        return (i, *y);
                    }
                }
            }
        }
        panic!("{:?} not drawn", needle)
    }

    fn no_cover() -> ReportConfig {
        ReportConfig {
            cover_page: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_count_entries_only_counts_actionable() {
        let tree = parse_result_tree(
            r#"{"t": {"s": {
                "a": {"hasErrors": true, "errors": {"e1": {}, "e2": {}}, "suggestions": {"s1": {}}},
                "b": {"hasErrors": false, "warnings": {"w1": {}}}
            }}}"#,
        )
        .unwrap();
        assert_eq!(count_entries(tree.get("t").unwrap()), Some([2, 0, 1]));

        let quiet = parse_result_tree(r#"{"t": {"s": {"b": {"hasErrors": false}}}}"#).unwrap();
        assert_eq!(count_entries(quiet.get("t").unwrap()), None);
    }

    #[test]
    fn test_section_starts_on_fresh_page_with_title_at_forty() {
        let doc = render(
            r#"{"php": {"Code quality": {"helpers": {"hasErrors": true,
                "errors": {"e": {"title": "T", "files": ["a.php"]}}}}}}"#,
            &no_cover(),
        );
        assert_eq!(doc.pages.len(), 1);
        let (page, y) = y_of(&doc, "CODE QUALITY");
        assert_eq!((page, y), (0, 775.0));
        // title leaves y at 745; subsection title is drawn 15 below
        assert_eq!(y_of(&doc, "HELPERS").1, 730.0);
        // block label sits where the subsection title left the cursor
        assert_eq!(y_of(&doc, "Errors").1, 710.0);
    }

    #[test]
    fn test_warnings_get_spacing_when_no_break() {
        let doc = render(
            r#"{"php": {"s": {"sub": {"hasErrors": true,
                "errors": {"e": {"files": ["a.php"]}},
                "warnings": {"w": {"files": ["b.php"]}}}}}}"#,
            &no_cover(),
        );
        // errors label at 710, "Files:" 710 -> 699, "-a.php" 699 -> 688,
        // then 15 of spacing before the warnings label
        assert_eq!(y_of(&doc, "Errors").1, 710.0);
        assert_eq!(y_of(&doc, "-a.php").1, 699.0);
        assert_eq!(y_of(&doc, "Warnings").1, 673.0);
    }

    #[test]
    fn test_sub_result_without_room_opens_a_page_before_its_title() {
        let mut files = String::new();
        for i in 0..50 {
            files.push_str(&format!("\"f{}.php\",", i));
        }
        files.pop();
        let tree = format!(
            r#"{{"php": {{"s": {{
                "first": {{"hasErrors": true, "errors": {{"e": {{"files": [{files}]}}}}}},
                "second": {{"hasErrors": true, "errors": {{"e": {{"title": "t", "files": ["x.php"]}}}}}}
            }}}}}}"#
        );
        let doc = render(&tree, &no_cover());
        let (page, y) = y_of(&doc, "SECOND");
        assert_eq!(page, 1);
        assert_eq!(y, 785.0);
        // exactly one break between the two subsections
        assert_eq!(doc.pages.len(), 2);
    }

    #[test]
    fn test_cover_page_summarizes_types() {
        let doc = render(
            r#"{"php": {"s": {"sub": {"hasErrors": true,
                "errors": {"e": {"files": ["a.php"]}},
                "suggestions": {"x": {"files": ["b.php"]}}}}},
               "xml": {"s": {"sub": {"hasErrors": false}}}}"#,
            &ReportConfig::default(),
        );
        assert_eq!(doc.pages.len(), 2);
        let cover: Vec<&str> = doc.pages[0].texts().collect();
        assert!(cover.contains(&"AUDIT REPORT"));
        assert!(cover.contains(&"PHP"));
        assert!(!cover.contains(&"XML"));
        assert!(cover.contains(&"Errors: 1"));
        assert!(cover.contains(&"Warnings: 0"));
        assert!(cover.contains(&"Suggestions: 1"));
    }

    #[test]
    fn test_cover_page_for_clean_report() {
        let doc = render(r#"{"php": {"s": {"sub": {"hasErrors": false}}}}"#, &ReportConfig::default());
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.texts().any(|t| t == "No issues found."));
    }
}
