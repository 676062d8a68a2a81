//! Linearization of frame markup into narration-friendly text.
//!
//! The output keeps two kinds of tokens the narration stage special-cases:
//! math commands from [`MATH_COMMANDS`] (with their brace arguments) and
//! `[Image: path]` placeholders. Everything else is reduced to plain lines,
//! with list items as `- ` bullets.
//!
//! Normalizing already-normalized text returns it unchanged.

use crate::markup::{parse_frame_opening, rewrite_command, strip_comments, FRAME_BEGIN, FRAME_END};
use beamer_core::delimit::{is_escaped, unwrap_delimited};
use beamer_core::normalize::{clean_lines, compose, image_token};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Commands that survive normalization so math can still be spoken.
pub const MATH_COMMANDS: &[&str] = &[
    // Greek letters
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "varpi", "rho", "varrho",
    "sigma", "varsigma", "tau", "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma",
    "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
    // Calculus and operators
    "frac", "dfrac", "tfrac", "sqrt", "sum", "prod", "int", "iint", "iiint", "oint", "lim",
    "limsup", "liminf", "partial", "nabla", "infty", "times", "cdot", "div", "pm", "mp", "leq",
    "geq", "le", "ge", "neq", "ne", "approx", "equiv", "sim", "propto", "to", "rightarrow",
    "leftarrow", "Rightarrow", "Leftarrow", "Leftrightarrow", "mapsto", "in", "notin", "subset",
    "subseteq", "cup", "cap", "forall", "exists", "cdots", "ldots", "dots", "vec", "hat", "bar",
    "dot", "ddot", "tilde", "overline", "mathbb", "mathcal",
    // Function names
    "sin", "cos", "tan", "sec", "csc", "cot", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "log", "ln", "exp", "max", "min", "det", "dim",
];

/// Text formatting commands whose single argument is kept.
const FORMATTING_COMMANDS: &[&str] = &[
    "textbf", "textit", "emph", "underline", "textsl", "textsc", "texttt", "textrm", "textsf",
    "textup", "textmd", "alert", "structure", "mbox", "text", "url", "footnote",
];

/// Two-argument commands whose second argument is kept.
const SECOND_ARG_COMMANDS: &[&str] = &["textcolor", "colorbox", "href"];

/// Commands dropped together with their argument(s).
const DROPPED_COMMANDS: &[(&str, usize)] = &[
    ("label", 1),
    ("ref", 1),
    ("eqref", 1),
    ("cite", 1),
    ("vspace", 1),
    ("hspace", 1),
    ("inst", 1),
    ("thanks", 1),
    ("setlength", 2),
];

/// Commands that declare titles or structure rather than content.
const TITLE_COMMANDS: &[&str] = &["frametitle", "framesubtitle", "section", "subsection"];

static STRUCTURE_COMMAND_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:titlepage|maketitle|tableofcontents)\b(?:\[[^\]]*\])?").unwrap()
});

static LIST_BEGIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(?:itemize|enumerate|description)\}(?:\s*<[^>]*>)?(?:\s*\[[^\]]*\])?")
        .unwrap()
});

static LIST_END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\{(?:itemize|enumerate|description)\}").unwrap());

static ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\item\b(?:\s*<[^>]*>)?(?:\s*\[([^\]]*)\])?[ \t]*").unwrap()
});

/// Marks the end of a list so trailing prose is not folded into the last item.
const LIST_END_MARK: char = '\u{1}';

static MATH_ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:begin|end)\{(?:equation|align|alignat|gather|multline|flalign|eqnarray|displaymath|math|split)\*?\}(?:\{\d+\})?",
    )
    .unwrap()
});

static MATRIX_ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\begin\{array\}\{[^{}]*\}|\\(?:begin|end)\{(?:matrix|pmatrix|bmatrix|Bmatrix|vmatrix|Vmatrix|smallmatrix|array|cases)\*?\}",
    )
    .unwrap()
});

static IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\includegraphics\*?(?:\s*<[^>]*>)?(?:\s*\[[^\]]*\])?\s*\{([^{}]*)\}").unwrap()
});

static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\\\*?(?:\[[^\]]*\])?").unwrap());

static BLOCK_ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(?:block|alertblock|exampleblock)\}(?:<[^>]*>)?\s*\{([^{}]*)\}").unwrap()
});

static SIZED_ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\begin\{(?:column|minipage|tabular\*?|tabularx)\}(?:\[[^\]]*\])?(?:[ \t]*\{(?:[^{}]|\{[^{}]*\})*\}){1,2}",
    )
    .unwrap()
});

static ENV_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:begin|end)\{[A-Za-z*]+\}(?:<[^>]*>)?(?:\[[^\]]*\])?").unwrap()
});

static DOTLESS_I_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\i\b").unwrap());

static SYMBOL_ACCENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\\(['"`^~=.])\s*(?:\{([A-Za-z])\}|([A-Za-z]))"#).unwrap()
});

static LETTER_ACCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([cuvH])\s*\{([A-Za-z])\}").unwrap());

static SPACING_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\[,;:! ]|~").unwrap());

/// A command with an optional overlay spec (`<2->`, `<1,3>`, `<+->`).
/// Overlays hold only slide numbers, so `\hbar<1` stays plain text.
static COMMAND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([A-Za-z]+)\*?(?:<[0-9+\-,.| ]*>)?").unwrap());

static ESCAPED_DELIMITER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([{}\[\]()$])").unwrap());

static ANY_COMMAND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[A-Za-z]+\*?").unwrap());

/// Whether `name` is a math command kept through normalization.
pub fn is_math_command(name: &str) -> bool {
    MATH_COMMANDS.contains(&name)
}

/// Turns raw frame markup into plain lines.
#[derive(Debug, Clone, Default)]
pub struct ContentNormalizer;

impl ContentNormalizer {
    /// Create a new content normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw span. May return an empty string; callers substitute
    /// a placeholder in that case.
    pub fn normalize(&self, raw: &str) -> String {
        let text = strip_comments(raw);
        let text = strip_title_constructs(&text);

        let result = linearize(&text);
        if !result.is_empty() {
            return result;
        }
        permissive(&text)
    }

    /// Normalize a short inline fragment (a title or author field) to a
    /// single line.
    pub fn normalize_inline(&self, raw: &str) -> String {
        self.normalize(raw)
            .lines()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Steps 3 to 10 of the pipeline.
fn linearize(text: &str) -> String {
    let text = linearize_lists(text);
    let text = MATH_ENV_REGEX.replace_all(&text, "\n");
    let text = MATRIX_ENV_REGEX.replace_all(&text, " ");
    let text = strip_math_delimiters(&text);
    let text = replace_images(&text);
    let text = unwrap_formatting(&text);
    let text = strip_commands(&text);
    clean_lines(&text)
}

/// Remove frame wrappers, title declarations and structure-only commands.
fn strip_title_constructs(text: &str) -> String {
    let mut text = text.to_string();

    if let Some(begin) = text.find(FRAME_BEGIN) {
        let opening = parse_frame_opening(&text, begin + FRAME_BEGIN.len());
        text.replace_range(begin..opening.end, "\n");
    }
    text = text.replace(FRAME_END, "\n");

    // Legacy `\frame{body}`: keep the body.
    text = rewrite_command(&text, "frame", 1, |t, m| format!("\n{}\n", m.arg(t, 0)));

    for name in TITLE_COMMANDS {
        text = rewrite_command(&text, name, 1, |_, _| String::new());
    }

    STRUCTURE_COMMAND_REGEX.replace_all(&text, "").into_owned()
}

/// One bullet line per list item, environment wrappers dropped.
fn linearize_lists(text: &str) -> String {
    let text = LIST_BEGIN_REGEX.replace_all(text, "\n");
    let end_mark = format!("\n{}\n", LIST_END_MARK);
    let text = LIST_END_REGEX.replace_all(&text, end_mark.as_str());

    let items: Vec<Captures> = ITEM_REGEX.captures_iter(&text).collect();
    if items.is_empty() {
        return text.replace(LIST_END_MARK, "");
    }

    let mut out = String::with_capacity(text.len());
    let Some(first) = items.first().and_then(|c| c.get(0)) else {
        return text.replace(LIST_END_MARK, "");
    };
    out.push_str(&text[..first.start()]);

    for (idx, caps) in items.iter().enumerate() {
        let Some(marker) = caps.get(0) else { continue };
        let body_end = items
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let body = &text[marker.end()..body_end];
        let (item, rest) = match body.find(LIST_END_MARK) {
            Some(pos) => (&body[..pos], &body[pos + LIST_END_MARK.len_utf8()..]),
            None => (body, ""),
        };

        let item = item.split_whitespace().collect::<Vec<_>>().join(" ");
        out.push_str("\n- ");
        if let Some(label) = caps.get(1) {
            let label = label.as_str().trim();
            if !label.is_empty() {
                out.push_str(label);
                out.push_str(": ");
            }
        }
        out.push_str(&item);
        out.push('\n');
        out.push_str(rest);
    }

    out.replace(LIST_END_MARK, "")
}

/// Remove math delimiters, keeping the formulas.
///
/// Display `$$` pairs go first so their dollars are never paired as inline
/// math.
fn strip_math_delimiters(text: &str) -> String {
    let text = unwrap_delimited(text, "$$", "$$");
    let text = unwrap_delimited(&text, "\\[", "\\]");
    let text = unwrap_delimited(&text, "\\(", "\\)");
    unwrap_delimited(&text, "$", "$")
}

fn replace_images(text: &str) -> String {
    IMAGE_REGEX
        .replace_all(text, |caps: &Captures| format!("\n{}\n", image_token(&caps[1])))
        .into_owned()
}

/// Unwrap formatting commands, keeping the formatted text.
fn unwrap_formatting(text: &str) -> String {
    let mut text = text.to_string();
    for name in FORMATTING_COMMANDS {
        text = rewrite_command(&text, name, 1, |t, m| m.arg(t, 0).to_string());
    }
    for name in SECOND_ARG_COMMANDS {
        text = rewrite_command(&text, name, 2, |t, m| m.arg(t, 1).to_string());
    }
    text
}

/// Strip the remaining markup, keeping math commands.
fn strip_commands(text: &str) -> String {
    let mut text = LINE_BREAK_REGEX.replace_all(text, "\n").into_owned();

    for (name, nargs) in DROPPED_COMMANDS {
        text = rewrite_command(&text, name, *nargs, |_, _| String::new());
    }

    let text = BLOCK_ENV_REGEX.replace_all(&text, "\n$1\n");
    let text = SIZED_ENV_REGEX.replace_all(&text, "\n");
    let text = ENV_TAG_REGEX.replace_all(&text, "\n");

    let text = compose_accents(&text);
    let text = SPACING_REGEX.replace_all(&text, " ");

    let text = COMMAND_REGEX.replace_all(&text, |caps: &Captures| {
        if is_math_command(&caps[1]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    drop_grouping_braces(&text)
}

/// Turn accent commands (`\'e`, `\c{c}`, `\~{n}`) into composed characters.
fn compose_accents(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let text = DOTLESS_I_REGEX.replace_all(text, "i");
    let text = SYMBOL_ACCENT_REGEX.replace_all(&text, |caps: &Captures| {
        let letter = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let mark = match &caps[1] {
            "'" => '\u{0301}',
            "`" => '\u{0300}',
            "^" => '\u{0302}',
            "~" => '\u{0303}',
            "\"" => '\u{0308}',
            "=" => '\u{0304}',
            _ => '\u{0307}',
        };
        format!("{}{}", letter, mark)
    });
    let text = LETTER_ACCENT_REGEX.replace_all(&text, |caps: &Captures| {
        let mark = match &caps[1] {
            "c" => '\u{0327}',
            "u" => '\u{0306}',
            "v" => '\u{030C}',
            _ => '\u{030B}',
        };
        format!("{}{}", &caps[2], mark)
    });
    compose(&text)
}

/// Drop grouping braces, keeping argument braces of math commands, of
/// `^`/`_` scripts, and of a group directly following a kept group.
fn drop_grouping_braces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut kept: Vec<bool> = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(&next) = chars.peek() {
                    if next == '{' || next == '}' {
                        out.push(next);
                        chars.next();
                    }
                }
            }
            '{' => {
                let keep = opens_math_argument(&out);
                kept.push(keep);
                if keep {
                    out.push('{');
                }
            }
            '}' => {
                if kept.pop() == Some(true) {
                    out.push('}');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Whether a `{` appended to `out` starts a math argument.
fn opens_math_argument(out: &str) -> bool {
    let Some(last) = out.chars().last() else {
        return false;
    };
    match last {
        '^' | '_' => true,
        '}' => !out.ends_with("\\}"),
        ']' => out
            .rfind('[')
            .and_then(|open| trailing_command(&out[..open]))
            .is_some_and(is_math_command),
        c if c.is_ascii_alphabetic() || c == '*' => {
            trailing_command(out).is_some_and(is_math_command)
        }
        _ => false,
    }
}

/// Name of the command `text` ends with, if any.
fn trailing_command(text: &str) -> Option<&str> {
    let text = text.strip_suffix('*').unwrap_or(text);
    let prefix = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let name = &text[prefix.len()..];
    if name.is_empty() || !prefix.ends_with('\\') || is_escaped(prefix, prefix.len() - 1) {
        return None;
    }
    Some(name)
}

/// Last resort: drop every command, brace and math delimiter. Line breaks,
/// accents and spacing are rewritten as in the main pipeline so the result
/// is stable under another pass.
fn permissive(text: &str) -> String {
    let text = LINE_BREAK_REGEX.replace_all(text, "\n");
    let text = compose_accents(&text);
    let text = SPACING_REGEX.replace_all(&text, " ");
    let text = ESCAPED_DELIMITER_REGEX.replace_all(&text, "$1");
    let text = ANY_COMMAND_REGEX.replace_all(&text, " ");
    let text: String = text
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '[' | ']' | '$'))
        .collect();
    clean_lines(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        ContentNormalizer::new().normalize(raw)
    }

    #[test]
    fn test_strips_comments_and_title() {
        let raw = "\\begin{frame}\n\\frametitle{Intro {x}} % note\nHello world\n\\end{frame}";
        assert_eq!(normalize(raw), "Hello world");
    }

    #[test]
    fn test_inline_title_and_options_removed() {
        let raw = "\\begin{frame}[fragile]{Title}{Sub}\nBody text\n\\end{frame}";
        assert_eq!(normalize(raw), "Body text");
    }

    #[test]
    fn test_legacy_frame_unwrapped() {
        let raw = "\\frame{\\frametitle{Old} legacy body}";
        assert_eq!(normalize(raw), "legacy body");
    }

    #[test]
    fn test_list_items_become_bullets() {
        let raw = "\\begin{itemize}\n  \\item First point\n    continues here\n  \\item<2-> Second\n\\end{itemize}\nAfter list";
        assert_eq!(
            normalize(raw),
            "- First point continues here\n- Second\nAfter list"
        );
    }

    #[test]
    fn test_description_labels() {
        let raw = "\\begin{description}\\item[Mass] kilograms \\item[Time] seconds\\end{description}";
        assert_eq!(normalize(raw), "- Mass: kilograms\n- Time: seconds");
    }

    #[test]
    fn test_items_without_environment() {
        assert_eq!(normalize("\\item one \\item two"), "- one\n- two");
    }

    #[test]
    fn test_nested_lists_flattened() {
        let raw = "\\begin{itemize}\\item outer\\begin{enumerate}\\item inner\\end{enumerate}\\item last\\end{itemize}";
        assert_eq!(normalize(raw), "- outer\n- inner\n- last");
    }

    #[test]
    fn test_math_environment_unwrapped() {
        let raw = "\\begin{align*}\na &= \\frac{1}{2} \\\\\nb &= \\alpha\n\\end{align*}";
        assert_eq!(normalize(raw), "a &= \\frac{1}{2}\nb &= \\alpha");
    }

    #[test]
    fn test_matrix_unwrapped() {
        let raw = "$A = \\begin{pmatrix} 1 & 0 \\end{pmatrix}$";
        assert_eq!(normalize(raw), "A = 1 & 0");
    }

    #[test]
    fn test_math_delimiters_double_before_single() {
        let raw = "Energy $$E = mc^2$$ and $\\lambda$ plus \\(x_i\\) and \\[y^{2}\\]";
        assert_eq!(normalize(raw), "Energy E = mc^2 and \\lambda plus x_i and y^{2}");
    }

    #[test]
    fn test_images_become_tokens() {
        let raw = "\\centering\\includegraphics[width=0.5\\textwidth]{figs/plot.png}";
        assert_eq!(normalize(raw), "[Image: figs/plot.png]");
    }

    #[test]
    fn test_formatting_unwrapped() {
        let raw = "A \\textbf{bold \\emph{and} nested} word, \\textcolor{red}{colored} and \\href{http://x}{link}";
        assert_eq!(normalize(raw), "A bold and nested word, colored and link");
    }

    #[test]
    fn test_math_commands_survive() {
        let raw = "Gradient $\\nabla f$ and $\\sqrt[3]{x}$ with \\pause\\vspace{1em} text";
        assert_eq!(normalize(raw), "Gradient \\nabla f and \\sqrt[3]{x} with text");
    }

    #[test]
    fn test_blocks_and_columns() {
        let raw = "\\begin{columns}[T]\n\\begin{column}{0.5\\textwidth}\n\\begin{block}{Key idea}\nShare state\n\\end{block}\n\\end{column}\n\\end{columns}";
        assert_eq!(normalize(raw), "Key idea\nShare state");
    }

    #[test]
    fn test_accents_composed() {
        assert_eq!(normalize("Introdu\\c{c}\\~ao e f\\'isica"), "Introdução e física");
        assert_eq!(normalize("na\\\"{\\i}ve"), "naïve");
    }

    #[test]
    fn test_escaped_literals_kept() {
        assert_eq!(normalize("Growth of 50\\% costs \\$3"), "Growth of 50\\% costs \\$3");
    }

    #[test]
    fn test_structure_commands_removed() {
        assert_eq!(normalize("\\begin{frame}\\titlepage\\end{frame}"), "");
        assert_eq!(normalize("\\tableofcontents[currentsection]"), "");
    }

    #[test]
    fn test_permissive_pass() {
        // Only dropped constructs: the permissive pass keeps their text.
        assert_eq!(normalize("\\label{eq:main}"), "eq:main");
    }

    #[test]
    fn test_permissive_pass_rewrites_spacing() {
        assert_eq!(normalize("\\cite{knuth~1984}"), "knuth 1984");
        assert_eq!(
            normalize("\\label{eq:main}\\\\\\ref{x\\,y}"),
            "eq:main\nx y"
        );
    }

    #[test]
    fn test_comparisons_in_math_kept() {
        assert_eq!(normalize("Let $\\hbar<1$ and $x>0$ hold"), "Let <1 and x>0 hold");
        assert_eq!(
            normalize("Bound $\\ell<n$ then $m>2$ end"),
            "Bound <n then m>2 end"
        );
        assert_eq!(normalize("\\only<2->{Shown later} now"), "Shown later now");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "\\begin{frame}{T}\n\\begin{itemize}\n\\item $\\alpha^{2} + \\frac{a}{b}$\n\\item \\textbf{Bold} 50\\% \\includegraphics{a.png}\n\\end{itemize}\n\\begin{description}\\item[Key] value\\end{description}\nx_{i}{j} and {grouped} text~here\n\\end{frame}",
            "\\cite{knuth~1984}",
            "\\label{eq:main}\\\\\\ref{x\\,y}",
            "\\label{na\\\"{\\i}ve \\(x\\)}",
            "Let $\\hbar<1$ and $x>0$ hold",
            "\\hspace{1em}\\'{e}t\\'e \\pause<2-> done",
        ];
        for raw in inputs {
            let once = normalize(raw);
            assert!(!once.is_empty(), "{:?}", raw);
            assert_eq!(normalize(&once), once, "{:?}", raw);
        }

        let once = normalize(inputs[0]);
        assert!(once.contains("\\frac{a}{b}"));
        assert!(once.contains("[Image: a.png]"));
    }

    #[test]
    fn test_grouping_braces() {
        assert_eq!(drop_grouping_braces("{plain} x^{2}{y}"), "plain x^{2}{y}");
        assert_eq!(drop_grouping_braces("\\{set\\}"), "\\{set\\}");
        assert_eq!(drop_grouping_braces("\\frac{a}{b}"), "\\frac{a}{b}");
    }
}
