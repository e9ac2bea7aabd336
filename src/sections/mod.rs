//! # Section Renderers
//!
//! Most entries are a title, an explanation and a list of files, and the
//! [`generic`] renderer handles them. Entries that need their own layout
//! carry a `specificSections` tag; the tag selects a [`SpecificSection`]
//! from the [`SectionRegistry`].
//!
//! A renderer draws through the same [`LayoutEngine`] as everything else,
//! so it shares the cursor and style and must respect the same break rules:
//! go through `write_sub_section_intro` and `write_line` rather than placing
//! text by hand.

pub mod generic;
pub mod module_list;
pub mod module_ratio;

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{ReportError, Result};
use crate::layout::LayoutEngine;
use crate::model::{Entry, ResultTree, Severity};

pub use module_list::ModuleList;
pub use module_ratio::ModuleRatio;

/// A renderer for entries with custom layout needs.
pub trait SpecificSection {
    /// Draw one entry. `data` is the entry with its tag removed.
    fn render(&self, data: &Map<String, Value>, layout: &mut LayoutEngine<'_>) -> Result<()>;
}

/// Tag → renderer table, built once before a report is generated.
pub struct SectionRegistry {
    renderers: HashMap<String, Box<dyn SpecificSection>>,
}

impl SectionRegistry {
    /// A registry with no renderers at all.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// A registry with the built-in renderers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(module_ratio::TAG, ModuleRatio::default());
        registry.register(module_list::TAG, ModuleList);
        registry
    }

    pub fn register(&mut self, tag: impl Into<String>, renderer: impl SpecificSection + 'static) {
        self.renderers.insert(tag.into(), Box::new(renderer));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    /// Look up the renderer for `tag`. `entry` only feeds the error message.
    pub fn get(&self, tag: &str, entry: &str) -> Result<&dyn SpecificSection> {
        self.renderers
            .get(tag)
            .map(|r| r.as_ref())
            .ok_or_else(|| ReportError::UnknownSection {
                tag: tag.to_string(),
                entry: entry.to_string(),
            })
    }

    /// Fail on the first tag, in render order, that has no renderer.
    /// Only subsections that will actually be rendered are checked.
    pub fn validate(&self, tree: &ResultTree) -> Result<()> {
        for sections in tree.values() {
            for subsections in sections.values() {
                for sub in subsections.values().filter(|s| s.is_actionable()) {
                    for severity in Severity::ALL {
                        for (name, entry) in sub.entries(severity).iter() {
                            if let Entry::Tagged(tagged) = entry {
                                self.get(&tagged.tag, name)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
