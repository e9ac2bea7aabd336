//! # Text Styles
//!
//! Every draw call uses whatever style was last applied. The report has five
//! named styles; each fixes a font, a point size and a fill color.

use serde::{Deserialize, Serialize};

use crate::font::StandardFont;

/// An RGB color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// Top-level and section titles.
    pub const DARK_BLUE: Color = Color::rgb(0.0, 0.0, 0.85);
    /// Entry titles.
    pub const MEDIUM_BLUE: Color = Color::rgb(0.0, 0.45, 0.85);
    /// Error labels and cautions.
    pub const RED: Color = Color::rgb(0.85, 0.0, 0.0);
    pub const ORANGE: Color = Color::rgb(0.85, 0.45, 0.0);
    /// Files listed under a group.
    pub const GRAY: Color = Color::rgb(0.2, 0.2, 0.2);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Font, size and color applied to a text draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f64,
    pub color: Color,
}

impl TextStyle {
    pub const GENERAL_SIZE: f64 = 9.0;
    pub const TITLE_SIZE: f64 = 20.0;
    pub const SUB_TITLE_SIZE: f64 = 12.0;

    pub fn general(size: f64, color: Color) -> Self {
        Self {
            font: StandardFont::TimesRoman,
            size,
            color,
        }
    }

    pub fn title(size: f64) -> Self {
        Self {
            font: StandardFont::TimesRoman,
            size,
            color: Color::DARK_BLUE,
        }
    }

    pub fn sub_title(size: f64) -> Self {
        Self {
            font: StandardFont::TimesRoman,
            size,
            color: Color::MEDIUM_BLUE,
        }
    }

    pub fn error(size: f64) -> Self {
        Self {
            font: StandardFont::TimesRoman,
            size,
            color: Color::RED,
        }
    }

    pub fn warning(size: f64) -> Self {
        Self {
            font: StandardFont::TimesRoman,
            size,
            color: Color::ORANGE,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::general(Self::GENERAL_SIZE, Color::BLACK)
    }
}
