//! # Fonts
//!
//! The report draws everything in standard Times-Roman, which every viewer
//! ships with, so nothing is embedded. Emphasis comes from size and color.

/// A standard PDF font used by the report styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    TimesRoman,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::TimesRoman => "Times-Roman",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_names() {
        assert_eq!(StandardFont::TimesRoman.pdf_name(), "Times-Roman");
    }
}
