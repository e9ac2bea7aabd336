//! # Size Estimation
//!
//! Pure estimates of the vertical space a block needs before it is drawn.
//! They only answer "would this title be orphaned at the bottom of the
//! page": each estimate covers a block's heading plus its first line of
//! content and the bottom margin below it, never the full wrapped height.

use crate::model::{Entry, Intro, OrderedMap, Severity, SubResult};
use crate::style::TextStyle;

use super::{
    line_advance, BLOCK_LABEL_ADVANCE, BOTTOM_MARGIN, CAUTION_SIZE, EXPLANATION_GAP,
    SECTION_TITLE_ADVANCE, SUB_TITLE_GAP,
};

/// What is about to be opened.
#[derive(Debug, Clone, Copy)]
pub enum Block<'a> {
    /// A subsection: its title, then its first non-empty severity block.
    SubResult(&'a SubResult),
    /// One severity block: its label, then its first drawable entry.
    Entries(&'a OrderedMap<Entry>),
}

/// Space needed for a block's heading plus its first subsection.
pub fn title_plus_first_subsection(block: Block<'_>) -> f64 {
    match block {
        Block::SubResult(sub) => {
            let first_block = Severity::ALL
                .iter()
                .map(|&severity| sub.entries(severity))
                .find(|entries| !entries.is_empty());
            SECTION_TITLE_ADVANCE
                + first_block
                    .map(|entries| title_plus_first_subsection(Block::Entries(entries)))
                    .unwrap_or(BOTTOM_MARGIN)
        }
        Block::Entries(entries) => {
            let first = entries.values().find(|entry| entry.is_renderable());
            BLOCK_LABEL_ADVANCE
                + first
                    .map(|entry| intro_size(&entry.intro()))
                    .unwrap_or(BOTTOM_MARGIN)
        }
    }
}

/// Space needed for an entry's intro plus the first line that follows it.
pub fn intro_size(intro: &Intro<'_>) -> f64 {
    let mut size = BOTTOM_MARGIN + line_advance(TextStyle::GENERAL_SIZE);
    if intro.title.is_some() {
        size += SUB_TITLE_GAP;
    }
    if intro.explanation.is_some() {
        size += EXPLANATION_GAP + line_advance(TextStyle::GENERAL_SIZE);
    }
    if intro.caution.is_some() {
        size += line_advance(CAUTION_SIZE);
    }
    size
}
