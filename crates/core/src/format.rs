//! Plain-text listing of a slide deck.
//!
//! Each slide is printed as a header line followed by its content, with a
//! blank line between slides:
//!
//! ```text
//! --- Slide 3: Results ---
//! - first finding
//! - second finding
//! ```

use crate::types::SlideUnit;

/// Formatter for the plain-text slide listing.
#[derive(Debug, Clone, Default)]
pub struct SlideListingFormatter {
    /// Append a rule under each slide's content.
    with_rule: bool,
}

impl SlideListingFormatter {
    /// Create a formatter without content rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a dashed rule closes each slide.
    pub fn with_rule(mut self, with_rule: bool) -> Self {
        self.with_rule = with_rule;
        self
    }

    /// Header line for one slide.
    pub fn header(&self, slide: &SlideUnit) -> String {
        if slide.is_continuation {
            format!("--- Slide {}: {} {} ---", slide.ordinal, slide.title, crate::CONTINUATION_MARKER)
        } else {
            format!("--- Slide {}: {} ---", slide.ordinal, slide.title)
        }
    }

    /// Format one slide.
    pub fn format_slide(&self, slide: &SlideUnit) -> String {
        let header = self.header(slide);
        let mut block = format!("{}\n{}", header, slide.content);
        if self.with_rule {
            block.push('\n');
            block.push_str(&"-".repeat(header.chars().count()));
        }
        block
    }

    /// Format all slides, separated by blank lines.
    pub fn format(&self, slides: &[SlideUnit]) -> String {
        slides
            .iter()
            .map(|s| self.format_slide(s))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Format and add a trailing newline.
    pub fn format_with_newline(&self, slides: &[SlideUnit]) -> String {
        let formatted = self.format(slides);
        if formatted.is_empty() {
            formatted
        } else {
            format!("{}\n", formatted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides() -> Vec<SlideUnit> {
        vec![
            SlideUnit::new(1, "Deck", "Title: Deck\nAuthor: Ana"),
            SlideUnit::new(2, "Results", "- a"),
            SlideUnit::new(3, "Results", "- b").into_continuation(),
        ]
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(SlideListingFormatter::new().format(&[]), "");
        assert_eq!(SlideListingFormatter::new().format_with_newline(&[]), "");
    }

    #[test]
    fn test_format_slides() {
        let out = SlideListingFormatter::new().format(&slides());
        let expected = "--- Slide 1: Deck ---\nTitle: Deck\nAuthor: Ana\n\n\
                        --- Slide 2: Results ---\n- a\n\n\
                        --- Slide 3: Results (continued) ---\n(continued)\n- b";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_format_with_rule() {
        let slide = SlideUnit::new(2, "Ab", "x");
        let out = SlideListingFormatter::new().with_rule(true).format_slide(&slide);
        assert_eq!(out, "--- Slide 2: Ab ---\nx\n-------------------");
    }

    #[test]
    fn test_trailing_newline() {
        assert!(SlideListingFormatter::new()
            .format_with_newline(&slides())
            .ends_with('\n'));
    }
}
