//! Presentation metadata from the preamble (`\title`, `\author`, ...).

use crate::markup::{find_command, mask_comments};
use crate::normalize::ContentNormalizer;
use beamer_core::DocumentMetadata;

/// Read title, subtitle, author, institute and date declarations.
///
/// Missing or empty title and author fall back to the defaults of
/// [`DocumentMetadata`]. Fields that normalize to nothing (a bare `\today`,
/// say) are left unset.
pub fn extract_metadata(source: &str) -> DocumentMetadata {
    let masked = mask_comments(source);
    let normalizer = ContentNormalizer::new();
    let field = |name: &str| -> Option<String> {
        let m = find_command(&masked, name, 0)?;
        let value = m
            .arg(&masked, 0)
            .split("\\and")
            .map(|part| normalizer.normalize_inline(part))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        (!value.is_empty()).then_some(value)
    };

    let mut meta = DocumentMetadata::new(
        field("title").unwrap_or_default(),
        field("author").unwrap_or_default(),
    );
    meta.subtitle = field("subtitle");
    meta.institute = field("institute");
    meta.date = field("date");
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamer_core::{UNKNOWN_AUTHOR, UNTITLED_PRESENTATION};

    #[test]
    fn test_extract_metadata_fields() {
        let src = r"\documentclass{beamer}
\title[Short]{Heat \textbf{Transfer}}
\subtitle{A Primer}
\author{Ada Lovelace \and Charles Babbage}
\institute{Analytical Society}
\date{\today}
\begin{document}\end{document}";
        let meta = extract_metadata(src);
        assert_eq!(meta.title, "Heat Transfer");
        assert_eq!(meta.subtitle.as_deref(), Some("A Primer"));
        assert_eq!(meta.author, "Ada Lovelace, Charles Babbage");
        assert_eq!(meta.institute.as_deref(), Some("Analytical Society"));
        assert_eq!(meta.date, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let meta = extract_metadata("% \\title{Commented}\n\\begin{document}\\end{document}");
        assert_eq!(meta.title, UNTITLED_PRESENTATION);
        assert_eq!(meta.author, UNKNOWN_AUTHOR);
        assert_eq!(meta.subtitle, None);
    }

    #[test]
    fn test_titlepage_command_is_not_title() {
        let meta = extract_metadata("\\titlepage\n\\title{Real}");
        assert_eq!(meta.title, "Real");
    }
}
