//! Compact module listing: every module name on one wrapped line instead of
//! one line each. Expects `files` to be an array of module names.

use serde_json::{Map, Value};

use super::SpecificSection;
use crate::error::{ReportError, Result};
use crate::layout::LayoutEngine;
use crate::model::Intro;

pub const TAG: &str = "manageSpecificModules";

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleList;

impl SpecificSection for ModuleList {
    fn render(&self, data: &Map<String, Value>, layout: &mut LayoutEngine<'_>) -> Result<()> {
        let modules: Vec<&str> = match data.get("files") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| ReportError::SectionData {
                        tag: TAG.to_string(),
                        reason: format!("module names must be strings, found {}", item),
                    })
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(ReportError::SectionData {
                    tag: TAG.to_string(),
                    reason: format!("`files` must be an array of module names, found {}", other),
                })
            }
        };
        if modules.is_empty() {
            return Ok(());
        }

        layout.write_sub_section_intro(&Intro::from_data(data));
        layout.write_line("Modules:");
        layout.write_line(&modules.join(", "));
        Ok(())
    }
}
