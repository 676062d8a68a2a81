//! Low-level LaTeX markup helpers: comments, frame openings and commands
//! with balanced brace arguments.

use beamer_core::delimit::{brace_group, is_escaped, skip_inline_space, skip_optional_group};

/// Opening tag of a frame environment.
pub const FRAME_BEGIN: &str = "\\begin{frame}";

/// Closing tag of a frame environment.
pub const FRAME_END: &str = "\\end{frame}";

const DOCUMENT_BEGIN: &str = "\\begin{document}";
const DOCUMENT_END: &str = "\\end{document}";

/// Byte offset of the first unescaped `%` in a line.
pub fn comment_start(line: &str) -> Option<usize> {
    line.match_indices('%')
        .map(|(i, _)| i)
        .find(|&i| !is_escaped(line, i))
}

/// Blank out comments, keeping every byte offset of the source intact.
pub fn mask_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        match comment_start(body) {
            Some(idx) => {
                out.push_str(&body[..idx]);
                out.extend(std::iter::repeat(' ').take(body.len() - idx));
            }
            None => out.push_str(body),
        }
        out.push_str(newline);
    }
    out
}

/// Remove comments, keeping line structure.
pub fn strip_comments(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| match comment_start(line) {
            Some(idx) if line.ends_with('\n') => format!("{}\n", &line[..idx]),
            Some(idx) => line[..idx].to_string(),
            None => line.to_string(),
        })
        .collect()
}

/// Byte range of the document body, or the whole text when there is no
/// `document` environment.
pub fn document_body(source: &str) -> (usize, usize) {
    let Some(begin) = source.find(DOCUMENT_BEGIN) else {
        return (0, source.len());
    };
    let start = begin + DOCUMENT_BEGIN.len();
    let end = source[start..]
        .find(DOCUMENT_END)
        .map(|rel| start + rel)
        .unwrap_or(source.len());
    (start, end)
}

/// What follows `\begin{frame}`: overlay, options, inline title/subtitle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOpening {
    /// Offset just past the whole opening (options and inline groups).
    pub end: usize,
    /// Whether a `[...]` option group is present.
    pub has_options: bool,
    /// Content range of an inline `{title}`.
    pub title: Option<(usize, usize)>,
    /// Content range of an inline `{subtitle}` following the title.
    pub subtitle: Option<(usize, usize)>,
}

/// Parse the frame opening starting right after `\begin{frame}`.
///
/// Inline groups must start on the same line; a brace group on the next line
/// belongs to the body.
pub fn parse_frame_opening(text: &str, after_begin: usize) -> FrameOpening {
    let mut i = skip_optional_group(text, after_begin, '<', '>');
    let options_end = skip_optional_group(text, i, '[', ']');
    let has_options = options_end != i;
    i = skip_optional_group(text, options_end, '<', '>');

    let mut opening = FrameOpening {
        end: i,
        has_options,
        title: None,
        subtitle: None,
    };

    let title_idx = skip_inline_space(text, i);
    if let Some(title) = brace_group(text, title_idx) {
        opening.title = Some(title);
        opening.end = title.1 + 1;
        let subtitle_idx = skip_inline_space(text, opening.end);
        if let Some(subtitle) = brace_group(text, subtitle_idx) {
            opening.subtitle = Some(subtitle);
            opening.end = subtitle.1 + 1;
        }
    }
    opening
}

/// A command occurrence with its brace arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// Offset of the backslash.
    pub start: usize,
    /// Offset just past the last argument's closing brace.
    pub end: usize,
    /// Content ranges of the brace arguments.
    pub args: Vec<(usize, usize)>,
}

impl CommandMatch {
    /// Text of argument `n`.
    pub fn arg<'a>(&self, text: &'a str, n: usize) -> &'a str {
        self.args
            .get(n)
            .map(|&(s, e)| &text[s..e])
            .unwrap_or("")
    }
}

/// Find `\name{...}` at or after `from`, with a balanced argument.
pub fn find_command(text: &str, name: &str, from: usize) -> Option<CommandMatch> {
    find_command_args(text, name, from, 1)
}

/// Find `\name{..}{..}` taking `nargs` brace arguments.
///
/// A star, an overlay (`<2->`) and one `[...]` option group may sit
/// between the name and the first argument. Occurrences whose name continues
/// with more letters are a different command and are skipped, so searching
/// for `frame` never lands on `\frametitle`. Occurrences without balanced
/// arguments are skipped as well.
pub fn find_command_args(
    text: &str,
    name: &str,
    from: usize,
    nargs: usize,
) -> Option<CommandMatch> {
    let needle = format!("\\{}", name);
    let mut search = from;
    while search <= text.len() {
        let rel = text.get(search..)?.find(&needle)?;
        let start = search + rel;
        let after = start + needle.len();
        search = after;

        if is_escaped(text, start) {
            continue;
        }
        if text[after..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }

        let mut i = after;
        if text[i..].starts_with('*') {
            i += 1;
        }
        i = skip_optional_group(text, i, '<', '>');
        i = skip_optional_group(text, i, '[', ']');
        i = skip_optional_group(text, i, '<', '>');

        let mut args = Vec::with_capacity(nargs);
        for _ in 0..nargs {
            let idx = skip_inline_space(text, i);
            match brace_group(text, idx) {
                Some(group) => {
                    i = group.1 + 1;
                    args.push(group);
                }
                None => break,
            }
        }
        if args.len() == nargs {
            return Some(CommandMatch {
                start,
                end: i,
                args,
            });
        }
    }
    None
}

/// Replace every `\name{..}` (with `nargs` arguments) by `replace(match)`.
///
/// Replacement restarts at the splice point, so nested occurrences of the
/// same command are handled too.
pub fn rewrite_command<F>(text: &str, name: &str, nargs: usize, mut replace: F) -> String
where
    F: FnMut(&str, &CommandMatch) -> String,
{
    let mut text = text.to_string();
    let mut from = 0;
    while let Some(m) = find_command_args(&text, name, from, nargs) {
        let replacement = replace(&text, &m);
        text.replace_range(m.start..m.end, &replacement);
        from = m.start;
    }
    text
}
