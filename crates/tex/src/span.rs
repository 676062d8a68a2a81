//! Frame and section span detection.
//!
//! Beamer sources declare frames in several ways, and old decks mix them.
//! Each way is a [`SpanDetector`]; the [`SpanScanner`] runs them in a fixed
//! order over the comment-masked document body and merges their hits.

use crate::markup::{
    document_body, find_command, mask_comments, parse_frame_opening, FRAME_BEGIN, FRAME_END,
};
use beamer_core::delimit::find_balanced;
use regex::Regex;
use std::sync::LazyLock;

/// Tolerant frame tags for the positional fallback (`\begin {frame}`).
static LOOSE_FRAME_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(begin|end)\s*\{\s*frame\s*\}").unwrap());

/// What a span declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A section boundary.
    Section,
    /// One logical slide body.
    Frame,
}

/// A declaration found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    /// Byte offset where the declaration starts.
    pub start: usize,
    /// Byte offset just past the declaration.
    pub end: usize,
    /// The declaration's text, comments blanked.
    pub raw_text: String,
}

impl Span {
    fn new(kind: SpanKind, source: &str, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            raw_text: source[start..end].to_string(),
        }
    }

    /// Whether the two spans share any byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    fn shifted(mut self, base: usize) -> Self {
        self.start += base;
        self.end += base;
        self
    }
}

/// One strategy for finding spans.
pub trait SpanDetector {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return every span this strategy recognizes in `source`.
    fn detect(&self, source: &str) -> Vec<Span>;
}

/// The form of `\begin{frame}` a [`FrameBlockDetector`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameForm {
    /// No options and no inline title.
    Canonical,
    /// A `[...]` option group after the tag.
    WithOptions,
    /// An inline `{title}` after the tag (options allowed before it).
    InlineTitle,
}

/// Detects `\begin{frame} ... \end{frame}` blocks of one opening form.
#[derive(Debug, Clone, Copy)]
pub struct FrameBlockDetector {
    form: FrameForm,
}

impl FrameBlockDetector {
    pub fn new(form: FrameForm) -> Self {
        Self { form }
    }

    fn accepts(&self, source: &str, after_begin: usize) -> bool {
        let opening = parse_frame_opening(source, after_begin);
        match self.form {
            FrameForm::Canonical => !opening.has_options && opening.title.is_none(),
            FrameForm::WithOptions => opening.has_options,
            FrameForm::InlineTitle => opening.title.is_some(),
        }
    }
}

impl SpanDetector for FrameBlockDetector {
    fn name(&self) -> &'static str {
        match self.form {
            FrameForm::Canonical => "frame block",
            FrameForm::WithOptions => "frame block with options",
            FrameForm::InlineTitle => "frame block with inline title",
        }
    }

    fn detect(&self, source: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (start, _) in source.match_indices(FRAME_BEGIN) {
            let after_begin = start + FRAME_BEGIN.len();
            if !self.accepts(source, after_begin) {
                continue;
            }
            match find_balanced(source, after_begin, FRAME_BEGIN, FRAME_END) {
                Some(close) => {
                    spans.push(Span::new(SpanKind::Frame, source, start, close + FRAME_END.len()))
                }
                None => log::debug!("unterminated frame at byte {}", start),
            }
        }
        spans
    }
}

/// Detects the legacy `\frame{...}` command form.
///
/// The body is delimited by brace counting since it routinely contains
/// nested groups. `\frametitle` shares the prefix and must not match; the
/// command finder rejects names that continue with letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFrameDetector;

impl SpanDetector for LegacyFrameDetector {
    fn name(&self) -> &'static str {
        "legacy frame command"
    }

    fn detect(&self, source: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut from = 0;
        while let Some(m) = find_command(source, "frame", from) {
            spans.push(Span::new(SpanKind::Frame, source, m.start, m.end));
            from = m.end;
        }
        spans
    }
}

/// Detects `\section{Label}` declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionDetector;

impl SpanDetector for SectionDetector {
    fn name(&self) -> &'static str {
        "section marker"
    }

    fn detect(&self, source: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut from = 0;
        while let Some(m) = find_command(source, "section", from) {
            spans.push(Span::new(SpanKind::Section, source, m.start, m.end));
            from = m.end;
        }
        spans
    }
}

/// Pairs frame begin/end tags by textual order, tolerating stray spacing
/// inside the tags and a missing final `\end{frame}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalFrameDetector;

impl SpanDetector for PositionalFrameDetector {
    fn name(&self) -> &'static str {
        "positional frame pairing"
    }

    fn detect(&self, source: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for caps in LOOSE_FRAME_TAG_REGEX.captures_iter(source) {
            let Some(tag) = caps.get(0) else { continue };
            if &caps[1] == "begin" {
                open.push(tag.start());
                continue;
            }
            // Only the outermost pair becomes a span.
            if let Some(start) = open.pop() {
                if open.is_empty() {
                    spans.push(Span::new(SpanKind::Frame, source, start, tag.end()));
                }
            }
        }

        if let Some(&start) = open.first() {
            log::debug!("frame at byte {} never closed; running to end of text", start);
            spans.push(Span::new(SpanKind::Frame, source, start, source.len()));
        }
        spans
    }
}

/// Runs the detectors in order and merges their hits.
pub struct SpanScanner {
    detectors: Vec<Box<dyn SpanDetector>>,
    fallback: Box<dyn SpanDetector>,
}

impl Default for SpanScanner {
    fn default() -> Self {
        Self {
            detectors: vec![
                Box::new(FrameBlockDetector::new(FrameForm::Canonical)),
                Box::new(FrameBlockDetector::new(FrameForm::WithOptions)),
                Box::new(LegacyFrameDetector),
                Box::new(FrameBlockDetector::new(FrameForm::InlineTitle)),
                Box::new(SectionDetector),
            ],
            fallback: Box::new(PositionalFrameDetector),
        }
    }
}

impl SpanScanner {
    /// Create a scanner with the standard detector order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom detectors and fallback.
    pub fn with_detectors(
        detectors: Vec<Box<dyn SpanDetector>>,
        fallback: Box<dyn SpanDetector>,
    ) -> Self {
        Self {
            detectors,
            fallback,
        }
    }

    /// Scan `source` and return non-overlapping spans sorted by position.
    ///
    /// Offsets refer to `source`. A hit overlapping an earlier hit is
    /// dropped, so the first detector to claim a region wins.
    pub fn scan(&self, source: &str) -> Vec<Span> {
        let masked = mask_comments(source);
        let (base, body_end) = document_body(&masked);
        let body = &masked[base..body_end];

        let mut spans: Vec<Span> = Vec::new();
        for detector in &self.detectors {
            let hits = detector.detect(body);
            let found = hits.len();
            let mut kept = 0;
            for hit in hits {
                if spans.iter().any(|s| s.overlaps(&hit)) {
                    continue;
                }
                spans.push(hit);
                kept += 1;
            }
            log::debug!("{}: {} hit(s), {} kept", detector.name(), found, kept);
        }

        if spans.is_empty() {
            spans = self.fallback.detect(body);
            log::debug!("{}: {} hit(s)", self.fallback.name(), spans.len());
        }

        let mut spans: Vec<Span> = spans.into_iter().map(|s| s.shifted(base)).collect();
        spans.sort_by_key(|s| s.start);
        spans
    }
}
