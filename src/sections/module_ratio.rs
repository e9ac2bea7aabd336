//! Per-module ratio listing, e.g. the share of blocks that should be view
//! models. Expects `files` to map module name → ratio in `0.0..=1.0`.

use serde_json::{Map, Value};

use super::SpecificSection;
use crate::error::{ReportError, Result};
use crate::layout::LayoutEngine;
use crate::model::Intro;
use crate::style::{Color, TextStyle};

pub const TAG: &str = "manageBlockVMRatio";

#[derive(Debug, Clone, Copy)]
pub struct ModuleRatio {
    /// Ratios above this are drawn in red.
    pub alert_above: f64,
}

impl Default for ModuleRatio {
    fn default() -> Self {
        Self { alert_above: 0.5 }
    }
}

impl SpecificSection for ModuleRatio {
    fn render(&self, data: &Map<String, Value>, layout: &mut LayoutEngine<'_>) -> Result<()> {
        let ratios = match data.get("files") {
            Some(Value::Object(ratios)) => ratios,
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(items)) if items.is_empty() => return Ok(()),
            Some(other) => {
                return Err(ReportError::SectionData {
                    tag: TAG.to_string(),
                    reason: format!("`files` must map module names to ratios, found {}", other),
                })
            }
        };
        if ratios.is_empty() {
            return Ok(());
        }

        layout.write_sub_section_intro(&Intro::from_data(data));
        layout.write_line("Modules:");
        for (module, ratio) in ratios {
            let ratio = ratio.as_f64().ok_or_else(|| ReportError::SectionData {
                tag: TAG.to_string(),
                reason: format!("ratio of `{}` is not a number", module),
            })?;
            let line = format!("-{} : {:.0}%", module, ratio * 100.0);
            if ratio > self.alert_above {
                layout.write_line_styled(&line, TextStyle::GENERAL_SIZE, Color::RED);
            } else {
                layout.write_line(&line);
            }
        }
        Ok(())
    }
}
