//! Slide title extraction with tiered fallbacks.

use crate::markup::{find_command, parse_frame_opening, FRAME_BEGIN};
use crate::normalize::ContentNormalizer;
use beamer_core::normalize::is_heading_candidate;
use beamer_core::UNTITLED_FRAME;
use regex::Regex;
use std::sync::LazyLock;

/// Single-pass title marker match, tolerant of overlay and short-title
/// groups and of a missing closing brace. Stops at the first inner brace.
static SIMPLE_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\frametitle\s*(?:<[^>]*>)?\s*(?:\[[^\]]*\])?\s*\{([^{}\n]*)").unwrap()
});

/// Which tier produced a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleTier {
    /// A title marker with a balanced brace argument.
    Balanced,
    /// The simple regex over a marker the balanced scan could not close.
    Simple,
    /// First plausible line of the normalized content.
    ContentLine,
    /// Nothing found; the sentinel.
    Default,
}

/// Extracts human-readable titles from raw spans.
#[derive(Debug, Clone, Default)]
pub struct TitleExtractor {
    normalizer: ContentNormalizer,
}

impl TitleExtractor {
    /// Create a new title extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a title, never returning an empty string.
    pub fn extract_title(&self, raw: &str) -> String {
        self.extract_with_tier(raw).0
    }

    /// Extract a title and report which tier produced it.
    pub fn extract_with_tier(&self, raw: &str) -> (String, TitleTier) {
        if let Some(title) = balanced_title(raw) {
            return (title, TitleTier::Balanced);
        }

        if let Some(title) = SIMPLE_TITLE_REGEX
            .captures(raw)
            .map(|caps| clean_title(&caps[1]))
            .filter(|t| !t.is_empty())
        {
            return (title, TitleTier::Simple);
        }

        let content = self.normalizer.normalize(raw);
        if let Some(line) = content.lines().find(|l| is_heading_candidate(l)) {
            return (clean_title(line), TitleTier::ContentLine);
        }

        (UNTITLED_FRAME.to_string(), TitleTier::Default)
    }
}

/// Tier 1: title markers whose argument closes with balanced braces.
///
/// Markers, in order: `\frametitle{..}`, an inline `\begin{frame}{..}`
/// title, and `\section{..}`.
fn balanced_title(raw: &str) -> Option<String> {
    let from_frametitle = find_command(raw, "frametitle", 0).map(|m| m.arg(raw, 0).to_string());

    let from_inline = || {
        let begin = raw.find(FRAME_BEGIN)?;
        let opening = parse_frame_opening(raw, begin + FRAME_BEGIN.len());
        opening.title.map(|(s, e)| raw[s..e].to_string())
    };

    let from_section = || find_command(raw, "section", 0).map(|m| m.arg(raw, 0).to_string());

    [from_frametitle, from_inline(), from_section()]
        .into_iter()
        .flatten()
        .map(|t| clean_title(&t))
        .find(|t| !t.is_empty())
}

/// Collapse whitespace inside a title.
fn clean_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
