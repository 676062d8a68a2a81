//! Balanced delimiter scanning.
//!
//! Regex cannot pair nested braces, and a non-greedy `\{(.*?)\}` stops at the
//! first inner closing brace. Everything that needs a matched pair (titles,
//! command arguments, math delimiters, environments) goes through
//! [`find_balanced`].

/// Find the closing token matching an already consumed opening token.
///
/// `start` is the byte offset just past the opening token, so the scan begins
/// at depth 1. Returns the byte offset where the matching `close` begins.
///
/// A backslash escapes the following character unless the tokens themselves
/// start with a backslash and match at that position (`\(`, `\]`, ...). When
/// `open == close` (as with `$`) there is no nesting and the first unescaped
/// occurrence closes the group.
pub fn find_balanced(text: &str, start: usize, open: &str, close: &str) -> Option<usize> {
    if start > text.len() || !text.is_char_boundary(start) || open.is_empty() || close.is_empty()
    {
        return None;
    }

    let mut depth = 1usize;
    let mut i = start;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(close) {
            depth -= 1;
            if depth == 0 || open == close {
                return Some(i);
            }
            i += close.len();
            continue;
        }
        if rest.starts_with(open) {
            depth += 1;
            i += open.len();
            continue;
        }

        let ch = rest.chars().next()?;
        i += ch.len_utf8();
        if ch == '\\' {
            // Escaped character: `\{`, `\$`, `\\`.
            if let Some(next) = text[i..].chars().next() {
                i += next.len_utf8();
            }
        }
    }
    None
}

/// Locate the brace group opening at `open_idx` (which must hold `{`).
///
/// Returns `(content_start, content_end)`; the closing brace sits at
/// `content_end`.
pub fn brace_group(text: &str, open_idx: usize) -> Option<(usize, usize)> {
    if text.as_bytes().get(open_idx) != Some(&b'{') {
        return None;
    }
    let content_start = open_idx + 1;
    find_balanced(text, content_start, "{", "}").map(|end| (content_start, end))
}

/// Skip spaces and tabs (not newlines) starting at `idx`.
pub fn skip_inline_space(text: &str, idx: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = idx;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// Skip an optional `open ... close` group (e.g. `[fragile]`, `<2->`) at `idx`.
///
/// Returns the offset after the group, or `idx` unchanged if none starts there.
pub fn skip_optional_group(text: &str, idx: usize, open: char, close: char) -> usize {
    let i = skip_inline_space(text, idx);
    if !text[i..].starts_with(open) {
        return idx;
    }
    let mut open_buf = [0u8; 4];
    let mut close_buf = [0u8; 4];
    let open = open.encode_utf8(&mut open_buf);
    let close = close.encode_utf8(&mut close_buf);
    match find_balanced(text, i + open.len(), open, close) {
        Some(end) => end + close.len(),
        None => idx,
    }
}

/// Replace every `open ... close` pair with its inner content.
///
/// Pairs are matched left to right with [`find_balanced`]; an opening token
/// without a partner is left untouched.
pub fn unwrap_delimited(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(open) && !is_escaped(text, i) {
            let inner_start = i + open.len();
            if let Some(end) = find_balanced(text, inner_start, open, close) {
                out.push_str(&text[inner_start..end]);
                i = end + close.len();
                continue;
            }
        }
        let Some(ch) = rest.chars().next() else { break };
        out.push(ch);
        i += ch.len_utf8();
        if ch == '\\' {
            // Copy escaped character verbatim so `\$` is never an opener.
            if let Some(next) = text[i..].chars().next() {
                out.push(next);
                i += next.len_utf8();
            }
        }
    }
    out
}

/// Whether the character at `idx` is preceded by an odd run of backslashes.
pub fn is_escaped(text: &str, idx: usize) -> bool {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = idx;
    while i > 0 && bytes[i - 1] == b'\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}
