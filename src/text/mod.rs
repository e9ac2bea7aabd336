//! # Text Preparation
//!
//! Pure helpers applied to text before it is drawn: collapsing whitespace in
//! free-form explanations, and splitting long lines into fragments that fit
//! the fixed column width. The report never measures glyphs; the column
//! budget is counted in characters.

/// Column width at which lines are wrapped.
pub const WRAP_COLUMNS: usize = 130;

/// Collapse every run of whitespace (spaces, tabs, newlines) to one space.
///
/// Leading and trailing runs collapse too but are not removed, so the
/// function is idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Word-wrap `text` into fragments of at most `width` characters.
///
/// Breaks happen at spaces; the space a line is broken at is consumed. A
/// word longer than `width` is cut hard into `width`-sized pieces.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for word in text.split(' ') {
        let mut rest = word;
        let mut was_cut = false;
        while rest.chars().count() > width {
            if let Some(line) = current.take() {
                lines.push(line);
            }
            let cut = byte_offset(rest, width);
            lines.push(rest[..cut].to_string());
            rest = &rest[cut..];
            was_cut = true;
        }
        if was_cut && rest.is_empty() {
            continue;
        }

        let rest_len = rest.chars().count();
        current = match current.take() {
            Some(mut line) if line.chars().count() + 1 + rest_len <= width => {
                line.push(' ');
                line.push_str(rest);
                Some(line)
            }
            Some(line) => {
                lines.push(line);
                Some(rest.to_string())
            }
            None => Some(rest.to_string()),
        };
    }

    if let Some(line) = current {
        lines.push(line);
    }
    lines
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}
