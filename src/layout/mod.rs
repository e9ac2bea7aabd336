//! # Report Layout Engine
//!
//! Owns everything that moves while a report is being written: the page
//! stack, the vertical cursor and the active text style. Callers never touch
//! coordinates directly; they ask for a title, a section title, an entry
//! intro or a line, and the engine decides where it lands and when a new
//! page is needed.
//!
//! Coordinates are PDF-native: the origin is the bottom-left corner and the
//! cursor `y` starts near the top and decreases as content is written.
//!
//! ## Page breaks
//!
//! Breaks are decided with fixed thresholds, checked at two moments:
//!
//! - *before* a block: titles break when the cursor sits below
//!   [`TITLE_BREAK`]; intros and severity blocks break when the estimate from
//!   [`size`] does not fit.
//! - *after* a line: whenever a line or section title leaves the cursor
//!   below [`BOTTOM_MARGIN`], the next page is opened right away, so the
//!   next block always starts on a page with room.
//!
//! Every page is born with its header and footer already drawn.

pub mod size;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::i18n::Translator;
use crate::image_loader::LoadedImage;
use crate::model::Intro;
use crate::style::{Color, TextStyle};
use crate::text::{normalize_whitespace, wrap, WRAP_COLUMNS};

/// A4 in points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// Height the cursor arithmetic is based on.
pub const PAGE_TOP: f64 = 850.0;
pub const BOTTOM_MARGIN: f64 = 50.0;
/// A title is never started below this.
pub const TITLE_BREAK: f64 = 130.0;
/// Extra room required before a subsection title.
pub const SECTION_BREAK_BASE: f64 = 140.0;
pub const DEFAULT_LEFT_MARGIN: f64 = 50.0;

/// Cursor movement of a section title (15 before, 20 after).
pub const SECTION_TITLE_ADVANCE: f64 = 35.0;
/// Spacing before a severity block that does not open a page.
pub const BLOCK_LABEL_ADVANCE: f64 = 15.0;
pub const SUB_TITLE_GAP: f64 = 20.0;
pub const EXPLANATION_GAP: f64 = 10.0;
pub const CAUTION_SIZE: f64 = 8.0;

const TITLE_GAP: f64 = 10.0;
const TITLE_LINE: f64 = 15.0;
const TITLE_TRAILING: f64 = 30.0;
const SECTION_TITLE_SIZE: f64 = 15.0;
const SECTION_TITLE_X: f64 = 43.0;
const SUB_TITLE_X: f64 = 48.0;
const LABEL_X: f64 = 44.0;

const FOOTER_Y: f64 = 20.0;
const FOOTER_TITLE_X: f64 = 20.0;
const FOOTER_DATE_X: f64 = 420.0;
const LOGO_BOX: (f64, f64, f64, f64) = (500.0, 800.0, 550.0, 820.0);

/// Vertical advance of one line of text at `size` points.
pub fn line_advance(size: f64) -> f64 {
    (size * 1.3).floor()
}

/// A laid-out report, ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub created_at: NaiveDateTime,
    pub pages: Vec<Page>,
    /// Images referenced by [`DrawOp::Image`], by index.
    pub images: Vec<LoadedImage>,
}

impl Document {
    /// All drawn text, page by page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| page.texts())
    }
}

/// One page: its size and the ordered draw operations on it.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Image { .. } => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Text with its baseline starting at (x, y).
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    /// An image stretched into the box (left, bottom)-(right, top).
    Image {
        image: usize,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    },
}

/// Per-report settings the engine needs.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Footer text, also the document title.
    pub title: String,
    pub logo: Option<LoadedImage>,
    pub left_margin: f64,
    pub text_color: Color,
    pub created_at: NaiveDateTime,
}

/// The page writer. One instance per report; never shared.
pub struct LayoutEngine<'a> {
    translator: &'a dyn Translator,
    locale: String,
    document: Document,
    logo: Option<usize>,
    text_color: Color,
    style: TextStyle,
    x: f64,
    y: f64,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(options: LayoutOptions, translator: &'a dyn Translator, locale: impl Into<String>) -> Self {
        let mut images = Vec::new();
        let logo = options.logo.map(|image| {
            images.push(image);
            images.len() - 1
        });
        Self {
            translator,
            locale: locale.into(),
            document: Document {
                title: options.title,
                created_at: options.created_at,
                pages: Vec::new(),
                images,
            },
            logo,
            text_color: options.text_color,
            style: TextStyle::general(TextStyle::GENERAL_SIZE, options.text_color),
            x: options.left_margin,
            y: PAGE_TOP - BOTTOM_MARGIN,
        }
    }

    /// Current cursor height.
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Hand over the finished document.
    pub fn finish(self) -> Document {
        self.document
    }

    pub fn translate(&self, text: &str) -> String {
        self.translator.translate(text, &self.locale)
    }

    /// Open a new page, reset the style and cursor, and draw the page chrome.
    pub fn add_page(&mut self) {
        self.document.pages.push(Page {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            ops: Vec::new(),
        });
        self.set_general_style(TextStyle::GENERAL_SIZE, self.text_color);
        self.y = PAGE_TOP - BOTTOM_MARGIN;
        self.draw_header_and_footer();
    }

    /// Open a new page if the cursor sits below `needed`. Returns whether a
    /// page was added.
    pub fn break_if_below(&mut self, needed: f64, reason: &str) -> bool {
        if self.y < needed {
            debug!(reason, y = self.y, needed, page = self.page_count() + 1, "page break");
            self.add_page();
            true
        } else {
            false
        }
    }

    /// Move the cursor down by `dy` without drawing.
    pub fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    /// Top-level title: uppercased, title style, at `x` or the left margin.
    pub fn write_title(&mut self, text: &str, x: Option<f64>) {
        self.ensure_page();
        let text = self.translate(text);
        self.y -= TITLE_GAP;
        self.break_if_below(TITLE_BREAK, "title");
        self.set_title_style(TextStyle::TITLE_SIZE);
        self.y -= TITLE_LINE;
        let x = x.unwrap_or(self.x);
        self.draw_text(&text.to_uppercase(), x, self.y);
        self.y -= TITLE_TRAILING;
        self.set_general_style(TextStyle::GENERAL_SIZE, self.text_color);
    }

    /// Subsection title. Breaks *after* drawing when little room is left.
    pub fn write_section_title(&mut self, text: &str) {
        self.ensure_page();
        let text = self.translate(text);
        self.set_title_style(SECTION_TITLE_SIZE);
        self.y -= TITLE_LINE;
        self.draw_text(&text.to_uppercase(), SECTION_TITLE_X, self.y);
        self.y -= SECTION_TITLE_ADVANCE - TITLE_LINE;
        self.break_if_below(BOTTOM_MARGIN, "section title trailing space");
        self.set_general_style(TextStyle::GENERAL_SIZE, self.text_color);
    }

    /// Draw a severity block label at the current cursor, in the current
    /// style, without moving the cursor.
    pub fn write_block_label(&mut self, text: &str) {
        self.ensure_page();
        let text = self.translate(text);
        self.draw_text(&text, LABEL_X, self.y);
    }

    /// Title, explanation and caution of an entry, each only when present.
    pub fn write_sub_section_intro(&mut self, intro: &Intro<'_>) {
        self.ensure_page();
        self.break_if_below(size::intro_size(intro), "entry intro");

        if let Some(title) = intro.title {
            self.y -= SUB_TITLE_GAP;
            self.set_sub_title_style(TextStyle::SUB_TITLE_SIZE);
            let title = self.translate(title);
            self.draw_text(&title, SUB_TITLE_X, self.y);
        }
        if let Some(explanation) = intro.explanation {
            self.y -= EXPLANATION_GAP;
            self.write_line(&normalize_whitespace(explanation));
        }
        if let Some(caution) = intro.caution {
            self.write_line_styled(&normalize_whitespace(caution), CAUTION_SIZE, Color::RED);
        }
    }

    /// One line in the general style.
    pub fn write_line(&mut self, text: &str) {
        self.write_line_styled(text, TextStyle::GENERAL_SIZE, self.text_color);
    }

    /// One line at `size` in `color`. Text longer than the column budget
    /// (after translation) is wrapped, and every fragment is written as a
    /// general line: default size and color, translated again.
    pub fn write_line_styled(&mut self, text: &str, size: f64, color: Color) {
        self.ensure_page();
        let text = self.translate(text);
        if text.chars().count() > WRAP_COLUMNS {
            for fragment in wrap(&text, WRAP_COLUMNS) {
                self.write_line(&fragment);
            }
        } else {
            self.put_line(&text, size, color);
        }
    }

    fn put_line(&mut self, text: &str, size: f64, color: Color) {
        // Re-applied per line: a break between fragments resets the style.
        self.set_general_style(size, color);
        self.draw_text(text, self.x, self.y);
        self.y -= line_advance(size);
        self.break_if_below(BOTTOM_MARGIN, "line trailing space");
    }

    pub fn set_general_style(&mut self, size: f64, color: Color) {
        self.style = TextStyle::general(size, color);
    }

    pub fn set_title_style(&mut self, size: f64) {
        self.style = TextStyle::title(size);
    }

    pub fn set_sub_title_style(&mut self, size: f64) {
        self.style = TextStyle::sub_title(size);
    }

    pub fn set_error_style(&mut self, size: f64) {
        self.style = TextStyle::error(size);
    }

    pub fn set_warning_style(&mut self, size: f64) {
        self.style = TextStyle::warning(size);
    }

    /// The first page is created on the first write, not up front.
    fn ensure_page(&mut self) {
        if self.document.pages.is_empty() {
            self.add_page();
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        let style = self.style;
        if let Some(page) = self.document.pages.last_mut() {
            page.ops.push(DrawOp::Text {
                text: text.to_string(),
                x,
                y,
                style,
            });
        }
    }

    fn draw_header_and_footer(&mut self) {
        let title = self.document.title.clone();
        self.draw_text(&title, FOOTER_TITLE_X, FOOTER_Y);

        if let (Some(image), Some(page)) = (self.logo, self.document.pages.last_mut()) {
            let (left, bottom, right, top) = LOGO_BOX;
            page.ops.push(DrawOp::Image {
                image,
                left,
                bottom,
                right,
                top,
            });
        }

        let created = format!(
            "Created on : {}",
            self.document.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        self.draw_text(&created, FOOTER_DATE_X, FOOTER_Y);
    }
}
