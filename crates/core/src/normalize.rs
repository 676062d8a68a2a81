//! Plain-text line handling shared by the source and rendered pipelines.
//!
//! Handles whitespace collapsing, blank-line removal, bullet recognition and
//! Unicode composition of extracted text.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::types::CONTINUATION_MARKER;

/// Regex to collapse multiple whitespace characters into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Footer lines that only carry a page number ("7" or "7 / 12").
static PAGE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}(\s*/\s*\d{1,4})?$").unwrap());

/// Bullet glyphs emitted by the normalizer and by PDF text extraction.
const BULLET_CHARS: &[char] = &['-', '•', '◦', '▪', '▸', '▶', '►', '‣', '–', '*', '∙'];

/// Prefix of the image placeholder token.
pub const IMAGE_TOKEN_PREFIX: &str = "[Image: ";

/// Build the placeholder token for an included image.
pub fn image_token(path: &str) -> String {
    format!("{}{}]", IMAGE_TOKEN_PREFIX, path.trim())
}

/// Collapse inline whitespace, trim every line and drop blank lines.
pub fn clean_lines(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.lines()
        .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compose decomposed characters (NFC) and normalize line endings.
pub fn compose(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .replace("\r\n", "\n")
        .replace('\u{0000}', "")
}

/// Whether a line is a bullet item.
pub fn is_bullet_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(c) if BULLET_CHARS.contains(&c) => {
            matches!(chars.next(), Some(n) if n.is_whitespace())
        }
        _ => false,
    }
}

/// Whether a line is the continuation annotation.
pub fn is_continuation_line(line: &str) -> bool {
    line.trim().starts_with(CONTINUATION_MARKER)
}

/// Whether a line is an image placeholder token.
pub fn is_image_line(line: &str) -> bool {
    line.trim().starts_with(IMAGE_TOKEN_PREFIX)
}

/// Whether a line only carries a page number.
pub fn is_page_number_line(line: &str) -> bool {
    PAGE_NUMBER_REGEX.is_match(line.trim())
}

/// Whether a line could serve as a heading.
pub fn is_heading_candidate(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty()
        && !is_bullet_line(line)
        && !is_continuation_line(line)
        && !is_image_line(line)
        && !is_page_number_line(line)
}
