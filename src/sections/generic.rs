//! The default renderer: an intro followed by the offending files.

use crate::layout::LayoutEngine;
use crate::model::{FileItem, GenericEntry};
use crate::style::Color;

const GROUPED_FILE_SIZE: f64 = 8.0;

/// Draw a generic entry. Entries without files draw nothing at all.
pub fn render_file_list(entry: &GenericEntry, layout: &mut LayoutEngine<'_>) {
    if entry.files.is_empty() {
        return;
    }
    layout.write_sub_section_intro(&entry.intro());
    layout.write_line("Files:");
    for item in &entry.files.items {
        match item {
            FileItem::Group { name, files } => {
                layout.write_line(name);
                for file in files {
                    layout.write_line_styled(&format!("-{}", file), GROUPED_FILE_SIZE, Color::GRAY);
                }
            }
            FileItem::File(file) => layout.write_line(&format!("-{}", file)),
        }
    }
}
