//! Domain types for representing extracted slide decks.

use crate::pages::ResolvedPageCount;
use crate::report::Notice;
use serde::{Deserialize, Serialize};

/// Title used when no title could be extracted from a frame.
pub const UNTITLED_FRAME: &str = "Untitled Frame";

/// Presentation title used when the source declares none.
pub const UNTITLED_PRESENTATION: &str = "Untitled Presentation";

/// Author used when the source declares none.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Title of a synthesized outline unit.
pub const OUTLINE_TITLE: &str = "Outline";

/// Annotation line placed at the top of continuation content.
pub const CONTINUATION_MARKER: &str = "(continued)";

/// Prefix of section unit titles.
pub const SECTION_PREFIX: &str = "Section: ";

/// Placeholder content for a unit whose extraction produced nothing.
pub fn placeholder_content(title: &str) -> String {
    format!("This slide presents information about {}.", title)
}

/// Title of a synthesized unit that has nothing but its position.
pub fn ordinal_title(ordinal: usize) -> String {
    format!("Slide {}", ordinal)
}

/// Prefix `content` with the continuation annotation.
pub fn continuation_content(content: &str) -> String {
    if content.starts_with(CONTINUATION_MARKER) {
        return content.to_string();
    }
    format!("{}\n{}", CONTINUATION_MARKER, content)
}

/// One rendered page's worth of narrated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideUnit {
    /// 1-based position, contiguous within a deck.
    pub ordinal: usize,

    /// Human readable title, never empty.
    pub title: String,

    /// Linearized content, never empty. May carry math commands and
    /// `[Image: path]` tokens.
    pub content: String,

    /// True when this unit is an overflow page of the previous logical frame.
    pub is_continuation: bool,
}

impl SlideUnit {
    /// Create a unit, substituting sentinels for empty title or content.
    pub fn new(ordinal: usize, title: impl Into<String>, content: impl Into<String>) -> Self {
        let mut title = title.into().trim().to_string();
        if title.is_empty() {
            title = UNTITLED_FRAME.to_string();
        }
        let mut content = content.into().trim().to_string();
        if content.is_empty() {
            content = placeholder_content(&title);
        }
        Self {
            ordinal,
            title,
            content,
            is_continuation: false,
        }
    }

    /// Mark this unit as an overflow page, annotating its content.
    pub fn into_continuation(mut self) -> Self {
        self.content = continuation_content(&self.content);
        self.is_continuation = true;
        self
    }

    /// Non-empty content lines.
    pub fn content_lines(&self) -> Vec<&str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Presentation-level metadata feeding the Title unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subtitle: Option<String>,
    pub institute: Option<String>,
    pub date: Option<String>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: UNTITLED_PRESENTATION.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            subtitle: None,
            institute: None,
            date: None,
        }
    }
}

impl DocumentMetadata {
    /// Create metadata from a title and author, defaulting blanks.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let mut meta = Self::default();
        let title = title.into();
        if !title.trim().is_empty() {
            meta.title = title.trim().to_string();
        }
        let author = author.into();
        if !author.trim().is_empty() {
            meta.author = author.trim().to_string();
        }
        meta
    }

    /// Build the Title unit (always ordinal 1).
    pub fn title_unit(&self) -> SlideUnit {
        let mut lines = vec![format!("Title: {}", self.title)];
        if let Some(subtitle) = &self.subtitle {
            lines.push(format!("Subtitle: {}", subtitle));
        }
        lines.push(format!("Author: {}", self.author));
        if let Some(institute) = &self.institute {
            lines.push(format!("Institute: {}", institute));
        }
        if let Some(date) = &self.date {
            lines.push(format!("Date: {}", date));
        }
        SlideUnit::new(1, self.title.clone(), lines.join("\n"))
    }
}

/// The format of the source file handed to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Structured LaTeX Beamer markup.
    Latex,
    /// An already rendered PDF with no structured source.
    Pdf,
}

impl SourceFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "tex" | "latex" | "ltx" => Some(Self::Latex),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect format from file magic bytes. Only PDF has a signature.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }
        None
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: SourceFormat,

    /// Metadata feeding the Title unit.
    pub metadata: DocumentMetadata,

    /// Target cardinality the slides were aligned to.
    pub page_count: ResolvedPageCount,

    /// Slides in presentation order.
    pub slides: Vec<SlideUnit>,

    /// Conditions the run recovered from.
    pub notices: Vec<Notice>,
}

impl SlideDeck {
    /// Number of slides in the deck.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
