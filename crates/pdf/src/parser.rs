//! Slide units from rendered page text, for decks without a source.

use beamer_core::normalize::{clean_lines, is_heading_candidate, is_page_number_line};
use beamer_core::outline::is_outline_heading;
use beamer_core::{
    DocumentMetadata, Error, PageTextSource, RecoveryKind, ResolvedPageCount, Result, RunReport,
    SlideDeck, SlideUnit, SourceFormat, OUTLINE_TITLE,
};
use std::path::Path;

/// Lines at the top of a page searched for its heading.
const HEADING_WINDOW: usize = 3;

/// Content of an Outline unit made up when page 2 is not an outline.
const SYNTHESIZED_OUTLINE: &str = "Overview of the topics covered in this presentation.";

/// Parser for rendered PDF decks.
pub struct PdfTextParser {
    source: Box<dyn PageTextSource>,
    synthesize_outline: bool,
}

impl PdfTextParser {
    /// Create a parser reading page text from `source`.
    pub fn new(source: Box<dyn PageTextSource>) -> Self {
        Self {
            source,
            synthesize_outline: false,
        }
    }

    /// When page 2 is not an outline, insert a made-up Outline unit before
    /// it. The deck then has one unit more than the document has pages.
    pub fn with_synthesized_outline(mut self, enabled: bool) -> Self {
        self.synthesize_outline = enabled;
        self
    }

    /// Parse a rendered document. Text extraction failure is fatal.
    pub fn parse(&self, path: &Path) -> Result<SlideDeck> {
        let pages = self.source.page_texts(path)?;
        if pages.is_empty() {
            return Err(Error::EmptyDocument(path.to_path_buf()));
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        let mut report = RunReport::new();
        let (metadata, slides) = self.parse_pages(&pages, &mut report);

        Ok(SlideDeck {
            filename: filename.to_string(),
            format: SourceFormat::Pdf,
            metadata,
            page_count: ResolvedPageCount::rendered(pages.len(), path),
            slides,
            notices: report.into_notices(),
        })
    }

    /// Turn per-page text into units: page 1 is the Title unit, page 2 the
    /// Outline unit when it reads as one, every other page a content unit.
    ///
    /// A page 2 that is not an outline stays a content unit, keeping one
    /// unit per page; an Outline unit is only made up when
    /// [`with_synthesized_outline`](Self::with_synthesized_outline) is set.
    /// A page whose heading repeats the previous unit's title (an overlay
    /// step) becomes a continuation of it.
    pub fn parse_pages(
        &self,
        pages: &[String],
        report: &mut RunReport,
    ) -> (DocumentMetadata, Vec<SlideUnit>) {
        let paged: Vec<Vec<String>> = pages.iter().map(|p| page_lines(p)).collect();

        let metadata = match paged.first() {
            Some(lines) => DocumentMetadata::new(
                lines.first().cloned().unwrap_or_default(),
                lines.get(1).cloned().unwrap_or_default(),
            ),
            None => DocumentMetadata::default(),
        };

        let mut slides = vec![metadata.title_unit()];
        let mut rest = paged.get(1..).unwrap_or_default();

        if let Some(lines) = rest.first() {
            if let Some(pos) = outline_heading(lines) {
                slides.push(SlideUnit::new(2, lines[pos].as_str(), without(lines, pos)));
                rest = &rest[1..];
            } else if self.synthesize_outline {
                report.note(
                    RecoveryKind::SpanCountMismatch,
                    "page 2 is not an outline; synthesized one ahead of it",
                );
                slides.push(SlideUnit::new(2, OUTLINE_TITLE, SYNTHESIZED_OUTLINE));
            }
        }

        for lines in rest {
            let ordinal = slides.len() + 1;
            let mut unit = content_unit(ordinal, lines, report);
            if slides.last().is_some_and(|prev| prev.title == unit.title) {
                log::debug!("page {} repeats \"{}\"; continuation", ordinal, unit.title);
                unit = unit.into_continuation();
            }
            slides.push(unit);
        }
        (metadata, slides)
    }
}

/// Cleaned lines of one page, footer page numbers removed.
fn page_lines(page: &str) -> Vec<String> {
    clean_lines(page)
        .lines()
        .filter(|l| !is_page_number_line(l))
        .map(str::to_string)
        .collect()
}

fn outline_heading(lines: &[String]) -> Option<usize> {
    lines
        .iter()
        .take(HEADING_WINDOW)
        .position(|l| is_outline_heading(l))
}

/// All lines except the one at `skip`, joined.
fn without(lines: &[String], skip: usize) -> String {
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, l)| l.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn content_unit(ordinal: usize, lines: &[String], report: &mut RunReport) -> SlideUnit {
    let heading = lines
        .iter()
        .take(HEADING_WINDOW)
        .position(|l| is_heading_candidate(l));

    let (title, content) = match heading {
        Some(pos) => (lines[pos].clone(), without(lines, pos)),
        None => {
            report.note(
                RecoveryKind::TitleExtractionFailure,
                format!("page {} has no heading line", ordinal),
            );
            (String::new(), lines.join("\n"))
        }
    };
    if content.is_empty() {
        report.note(
            RecoveryKind::EmptyExtraction,
            format!("page {} has no body text; using placeholder", ordinal),
        );
    }
    SlideUnit::new(ordinal, title, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamer_core::{continuation_content, placeholder_content, UNKNOWN_AUTHOR, UNTITLED_FRAME};

    struct FixedPages(Vec<&'static str>);

    impl PageTextSource for FixedPages {
        fn page_texts(&self, _artifact: &Path) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    fn parser(pages: Vec<&'static str>) -> PdfTextParser {
        PdfTextParser::new(Box::new(FixedPages(pages)))
    }

    #[test]
    fn test_title_outline_and_content_pages() {
        let deck = parser(vec![
            "Heat Transfer\n\nAda Lovelace\n",
            "Sumário\n• Conduction\n• Convection\n2 / 4",
            "Conduction\n• Fourier's law\n• q = -k ∇T\n3",
            "Convection\nNewton's law of cooling\n4 / 4",
        ])
        .parse(Path::new("/tmp/heat.pdf"))
        .unwrap();

        assert_eq!(deck.len(), 4);
        assert_eq!(deck.page_count.get(), 4);
        assert_eq!(deck.format, SourceFormat::Pdf);
        assert_eq!(deck.filename, "heat.pdf");
        assert_eq!(deck.metadata.title, "Heat Transfer");
        assert_eq!(deck.metadata.author, "Ada Lovelace");

        assert_eq!(deck.slides[1].title, "Sumário");
        assert_eq!(deck.slides[1].content, "• Conduction\n• Convection");
        assert_eq!(deck.slides[2].title, "Conduction");
        assert_eq!(deck.slides[2].content, "• Fourier's law\n• q = -k ∇T");
        assert_eq!(deck.slides[3].content, "Newton's law of cooling");
        for (i, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.ordinal, i + 1);
        }
    }

    #[test]
    fn test_non_outline_page_two_is_content() {
        let deck = parser(vec!["Deck\nMe", "Motivation\nWhy it matters", "Results\nIt works"])
            .parse(Path::new("deck.pdf"))
            .unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.slides[1].title, "Motivation");
        assert_eq!(deck.slides[2].ordinal, 3);
    }

    #[test]
    fn test_synthesized_outline_is_opt_in() {
        let deck = parser(vec!["Deck\nMe", "Motivation\nWhy it matters"])
            .with_synthesized_outline(true)
            .parse(Path::new("deck.pdf"))
            .unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.slides[1].title, OUTLINE_TITLE);
        assert_eq!(deck.slides[2].title, "Motivation");
        assert_eq!(deck.notices[0].kind, RecoveryKind::SpanCountMismatch);
    }

    #[test]
    fn test_overlay_pages_become_continuations() {
        let deck = parser(vec![
            "Deck\nMe",
            "Outline\n- a",
            "Results\n- first",
            "Results\n- first\n- second",
            "Summary\nDone",
        ])
        .parse(Path::new("deck.pdf"))
        .unwrap();

        assert_eq!(deck.len(), 5);
        assert!(!deck.slides[2].is_continuation);
        assert_eq!(deck.slides[3].title, "Results");
        assert!(deck.slides[3].is_continuation);
        assert_eq!(deck.slides[3].content, "(continued)\n- first\n- second");
        assert!(!deck.slides[4].is_continuation);
        for pair in deck.slides.windows(2) {
            assert!(pair[1].is_continuation || pair[0].title != pair[1].title);
        }
    }

    #[test]
    fn test_title_skips_leading_bullets() {
        let deck = parser(vec!["Deck", "Outline", "- first\nHeading\nbody"])
            .parse(Path::new("deck.pdf"))
            .unwrap();
        assert_eq!(deck.slides[2].title, "Heading");
        assert_eq!(deck.slides[2].content, "- first\nbody");
    }

    #[test]
    fn test_blank_pages_get_placeholders() {
        let deck = parser(vec!["", "", "  \n 5 "])
            .parse(Path::new("deck.pdf"))
            .unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.metadata.author, UNKNOWN_AUTHOR);
        assert_eq!(deck.slides[1].title, UNTITLED_FRAME);
        assert!(!deck.slides[1].is_continuation);
        assert!(deck.slides[2].is_continuation);
        assert_eq!(
            deck.slides[2].content,
            continuation_content(&placeholder_content(UNTITLED_FRAME))
        );
        assert!(deck.slides.iter().all(|s| !s.content.trim().is_empty()));
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let err = parser(vec![]).parse(Path::new("empty.pdf")).unwrap_err();
        assert!(matches!(err, Error::EmptyDocument(_)));
    }
}
