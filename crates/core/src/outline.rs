//! Outline (table of contents) recognition.
//!
//! Decks are written in several languages, so headings are matched against a
//! small multilingual keyword set, case-insensitively.

/// Headings that announce an outline slide.
const OUTLINE_KEYWORDS: &[&str] = &[
    // English
    "outline",
    "contents",
    "table of contents",
    "agenda",
    "overview",
    // Portuguese
    "sumário",
    "sumario",
    "roteiro",
    "conteúdo",
    "pauta",
    // Spanish
    "índice",
    "indice",
    "contenido",
    "temario",
    // French
    "sommaire",
    "plan de la présentation",
    // German
    "inhalt",
    "inhaltsverzeichnis",
    "gliederung",
    // Italian
    "sommario",
];

/// Markup commands that render a table of contents.
const OUTLINE_COMMANDS: &[&str] = &["\\tableofcontents"];

/// Whether `heading` reads as an outline heading.
///
/// The heading must equal a keyword or start with one followed by a
/// separator, so "Overview" and "Agenda: today" match but "Agendas of
/// power" does not.
pub fn is_outline_heading(heading: &str) -> bool {
    let lowered = heading
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == ':')
        .to_lowercase();
    if lowered.is_empty() {
        return false;
    }

    OUTLINE_KEYWORDS.iter().any(|kw| {
        if lowered == *kw {
            return true;
        }
        match lowered.strip_prefix(kw) {
            Some(rest) => rest.starts_with(|c: char| c == ':' || c == ' ' || c == '-'),
            None => false,
        }
    })
}

/// Whether raw markup renders a table of contents.
pub fn has_outline_command(raw: &str) -> bool {
    OUTLINE_COMMANDS.iter().any(|cmd| raw.contains(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_heading_multilingual() {
        assert!(is_outline_heading("Outline"));
        assert!(is_outline_heading("  SUMÁRIO "));
        assert!(is_outline_heading("Inhalt"));
        assert!(is_outline_heading("Índice"));
        assert!(is_outline_heading("Agenda: today"));
        assert!(is_outline_heading("Table of Contents."));
    }

    #[test]
    fn test_outline_heading_rejects_prose() {
        assert!(!is_outline_heading("Agendas of power"));
        assert!(!is_outline_heading("Results"));
        assert!(!is_outline_heading(""));
    }

    #[test]
    fn test_outline_command() {
        assert!(has_outline_command("\\frametitle{X}\n\\tableofcontents"));
        assert!(!has_outline_command("\\frametitle{X}"));
    }
}
