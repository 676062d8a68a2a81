//! Reconciliation of scanned spans with the rendered page count.
//!
//! Whatever the source declares, the output has exactly one unit per page:
//! unit 1 is the Title unit, unit 2 the Outline unit, and the remaining
//! slots are filled from the content spans by an [`AlignmentPolicy`].

use crate::normalize::ContentNormalizer;
use crate::span::{Span, SpanKind};
use crate::title::{TitleExtractor, TitleTier};
use beamer_core::outline::{has_outline_command, is_outline_heading};
use beamer_core::pages::SYNTHETIC_UNITS;
use beamer_core::{
    ordinal_title, placeholder_content, DocumentMetadata, RecoveryKind, RunReport, SlideUnit,
    OUTLINE_TITLE, SECTION_PREFIX,
};

/// Commands that render the title page, which is unit 1 already.
const TITLE_PAGE_COMMANDS: &[&str] = &["\\titlepage", "\\maketitle"];

/// Outline content when the deck declares no sections.
const GENERIC_OUTLINE: &str = "Overview of the topics covered in this presentation.";

/// What fills one content page slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The content draft at `index`, possibly as an overflow page.
    Draft { index: usize, continuation: bool },
    /// A generic unit titled after its ordinal.
    Placeholder,
}

/// Strategy for distributing content drafts over page slots.
pub trait AlignmentPolicy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Assign `drafts` candidates to `slots` pages, returning exactly
    /// `slots` entries with draft indices in non-decreasing order.
    fn assign(&self, drafts: usize, slots: usize) -> Vec<Slot>;
}

/// One draft per slot in order; surplus drafts are dropped and missing ones
/// become placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncatePolicy;

impl AlignmentPolicy for TruncatePolicy {
    fn name(&self) -> &'static str {
        "truncate"
    }

    fn assign(&self, drafts: usize, slots: usize) -> Vec<Slot> {
        (0..slots)
            .map(|index| {
                if index < drafts {
                    Slot::Draft {
                        index,
                        continuation: false,
                    }
                } else {
                    Slot::Placeholder
                }
            })
            .collect()
    }
}

/// Spreads fewer drafts over more slots, so a frame rendered on several
/// pages owns several consecutive slots. Surplus drafts are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalPolicy;

impl AlignmentPolicy for ProportionalPolicy {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn assign(&self, drafts: usize, slots: usize) -> Vec<Slot> {
        if drafts == 0 || drafts >= slots {
            return TruncatePolicy.assign(drafts, slots);
        }

        let mut previous = None;
        (0..slots)
            .map(|slot| {
                let index = slot * drafts / slots;
                let continuation = previous == Some(index);
                previous = Some(index);
                Slot::Draft {
                    index,
                    continuation,
                }
            })
            .collect()
    }
}

/// A content unit before it is given an ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    title: String,
    content: String,
    continuation: bool,
}

/// A span with its title and normalized content.
struct Extracted<'a> {
    span: &'a Span,
    title: String,
    tier: TitleTier,
    content: String,
}

impl Extracted<'_> {
    fn is_title_page(&self) -> bool {
        self.span.kind == SpanKind::Frame
            && self.content.is_empty()
            && TITLE_PAGE_COMMANDS
                .iter()
                .any(|cmd| self.span.raw_text.contains(cmd))
    }

    fn is_outline(&self) -> bool {
        self.span.kind == SpanKind::Frame
            && (has_outline_command(&self.span.raw_text)
                || (self.tier != TitleTier::Default && is_outline_heading(&self.title)))
    }
}

/// Spans sorted into the roles they play in the output.
struct Plan<'a> {
    outline: Option<Extracted<'a>>,
    content: Vec<Extracted<'a>>,
}

impl Plan<'_> {
    fn section_labels(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter(|e| e.span.kind == SpanKind::Section)
            .map(|e| e.title.as_str())
            .collect()
    }
}

/// Builds the final unit list from spans, metadata and a page count.
pub struct SlideAligner {
    titles: TitleExtractor,
    normalizer: ContentNormalizer,
    policy: Box<dyn AlignmentPolicy>,
}

impl Default for SlideAligner {
    fn default() -> Self {
        Self {
            titles: TitleExtractor::new(),
            normalizer: ContentNormalizer::new(),
            policy: Box::new(ProportionalPolicy),
        }
    }
}

impl SlideAligner {
    /// Create an aligner with the proportional policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different alignment policy.
    pub fn with_policy(mut self, policy: Box<dyn AlignmentPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Name of the active policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Number of spans that become content units, for estimating the page
    /// count. Excludes the title page and the outline.
    pub fn content_span_count(&self, spans: &[Span]) -> usize {
        self.plan(spans).content.len()
    }

    /// Produce exactly `count` units (at least one).
    pub fn align(
        &self,
        spans: &[Span],
        metadata: &DocumentMetadata,
        count: usize,
        report: &mut RunReport,
    ) -> Vec<SlideUnit> {
        let count = count.max(1);
        let plan = self.plan(spans);

        let mut units = Vec::with_capacity(count);
        units.push(metadata.title_unit());
        if count == 1 {
            if !plan.content.is_empty() {
                report.note(
                    RecoveryKind::SpanCountMismatch,
                    format!("single page; {} content span(s) dropped", plan.content.len()),
                );
            }
            return units;
        }

        let outline = self.outline_unit(&plan);
        let drafts = dedup_adjacent(self.drafts(&plan, report), &outline.title);
        units.push(outline);

        let slots = count - SYNTHETIC_UNITS;
        if drafts.len() != slots {
            report.note(
                RecoveryKind::SpanCountMismatch,
                format!(
                    "{} content span(s) for {} page slot(s); aligning with {} policy",
                    drafts.len(),
                    slots,
                    self.policy.name()
                ),
            );
        }

        let assignment = self.policy.assign(drafts.len(), slots);
        for (offset, slot) in assignment.into_iter().take(slots).enumerate() {
            let ordinal = SYNTHETIC_UNITS + offset + 1;
            let draft = match slot {
                Slot::Draft {
                    index,
                    continuation,
                } => drafts.get(index).map(|d| (d, continuation || d.continuation)),
                Slot::Placeholder => None,
            };
            let unit = match draft {
                Some((draft, false)) => {
                    SlideUnit::new(ordinal, draft.title.as_str(), draft.content.as_str())
                }
                Some((draft, true)) => {
                    SlideUnit::new(ordinal, draft.title.as_str(), draft.content.as_str())
                        .into_continuation()
                }
                None => placeholder_unit(ordinal),
            };
            units.push(unit);
        }

        // A policy returning too few slots still yields `count` units.
        while units.len() < count {
            units.push(placeholder_unit(units.len() + 1));
        }
        units
    }

    fn plan<'a>(&self, spans: &'a [Span]) -> Plan<'a> {
        let mut outline = None;
        let mut content = Vec::with_capacity(spans.len());

        for span in spans {
            let (title, tier) = self.titles.extract_with_tier(&span.raw_text);
            let extracted = Extracted {
                span,
                title,
                tier,
                content: self.normalizer.normalize(&span.raw_text),
            };

            if extracted.is_title_page() {
                log::debug!("title page frame at byte {} folded into unit 1", span.start);
                continue;
            }
            if outline.is_none() && extracted.is_outline() {
                outline = Some(extracted);
                continue;
            }
            content.push(extracted);
        }

        Plan { outline, content }
    }

    fn outline_unit(&self, plan: &Plan<'_>) -> SlideUnit {
        let synthesized = || {
            let labels = plan.section_labels();
            if labels.is_empty() {
                GENERIC_OUTLINE.to_string()
            } else {
                labels
                    .iter()
                    .map(|label| format!("- {}", label))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };

        let Some(outline) = &plan.outline else {
            return SlideUnit::new(2, OUTLINE_TITLE, synthesized());
        };
        let title = match outline.tier {
            TitleTier::Default => OUTLINE_TITLE,
            _ => outline.title.as_str(),
        };
        let content = if outline.content.is_empty() {
            synthesized()
        } else {
            outline.content.clone()
        };
        SlideUnit::new(2, title, content)
    }

    fn drafts(&self, plan: &Plan<'_>, report: &mut RunReport) -> Vec<Draft> {
        plan.content
            .iter()
            .map(|e| match e.span.kind {
                SpanKind::Section => Draft {
                    title: format!("{}{}", SECTION_PREFIX, e.title),
                    content: e.title.clone(),
                    continuation: false,
                },
                SpanKind::Frame => {
                    if e.tier == TitleTier::Default {
                        report.note(
                            RecoveryKind::TitleExtractionFailure,
                            format!("no title for frame at byte {}", e.span.start),
                        );
                    }
                    let content = if e.content.is_empty() {
                        report.note(
                            RecoveryKind::EmptyExtraction,
                            format!("frame '{}' has no content; using placeholder", e.title),
                        );
                        placeholder_content(&e.title)
                    } else {
                        e.content.clone()
                    };
                    Draft {
                        title: e.title.clone(),
                        content,
                        continuation: false,
                    }
                }
            })
            .collect()
    }
}

/// Collapse adjacent drafts sharing a title.
///
/// An exact repeat is dropped. A repeat with different content stays, marked
/// as a continuation of the one before it.
fn dedup_adjacent(drafts: Vec<Draft>, preceding_title: &str) -> Vec<Draft> {
    let mut out: Vec<Draft> = Vec::with_capacity(drafts.len());
    for mut draft in drafts {
        let previous = out
            .last()
            .map(|d| d.title.as_str())
            .unwrap_or(preceding_title);
        if draft.title == previous {
            if out.last().is_some_and(|d| d.content == draft.content) {
                log::debug!("dropping duplicate unit '{}'", draft.title);
                continue;
            }
            draft.continuation = true;
        }
        out.push(draft);
    }
    out
}

fn placeholder_unit(ordinal: usize) -> SlideUnit {
    let title = ordinal_title(ordinal);
    let content = placeholder_content(&title);
    SlideUnit::new(ordinal, title, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SpanScanner;
    use beamer_core::UNTITLED_FRAME;

    fn frames(titles: &[&str]) -> String {
        titles
            .iter()
            .map(|t| format!("\\begin{{frame}}{{{}}}\nAbout {}\n\\end{{frame}}\n", t, t))
            .collect()
    }

    fn align(source: &str, count: usize) -> (Vec<SlideUnit>, RunReport) {
        let spans = SpanScanner::new().scan(source);
        let mut report = RunReport::new();
        let meta = DocumentMetadata::new("Deck", "Author");
        let units = SlideAligner::new().align(&spans, &meta, count, &mut report);
        (units, report)
    }

    fn assert_well_formed(units: &[SlideUnit], count: usize) {
        assert_eq!(units.len(), count);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.ordinal, i + 1);
            assert!(!unit.title.trim().is_empty());
            assert!(!unit.content.trim().is_empty());
        }
        for pair in units[2.min(units.len())..].windows(2) {
            if !pair[1].is_continuation {
                assert_ne!(pair[0].title, pair[1].title);
            }
        }
    }

    #[test]
    fn test_truncate_policy() {
        let slots = TruncatePolicy.assign(2, 4);
        assert_eq!(
            slots,
            vec![
                Slot::Draft { index: 0, continuation: false },
                Slot::Draft { index: 1, continuation: false },
                Slot::Placeholder,
                Slot::Placeholder,
            ]
        );
        assert_eq!(TruncatePolicy.assign(5, 2).len(), 2);
    }

    #[test]
    fn test_proportional_policy_covers_every_draft() {
        let slots = ProportionalPolicy.assign(2, 5);
        let owners: Vec<usize> = slots
            .iter()
            .map(|s| match s {
                Slot::Draft { index, .. } => *index,
                Slot::Placeholder => usize::MAX,
            })
            .collect();
        assert_eq!(owners, vec![0, 0, 0, 1, 1]);
        assert_eq!(slots[3], Slot::Draft { index: 1, continuation: false });
        assert_eq!(slots[4], Slot::Draft { index: 1, continuation: true });
        assert_eq!(ProportionalPolicy.assign(0, 3), vec![Slot::Placeholder; 3]);
    }

    #[test]
    fn test_scenario_no_spans() {
        let (units, _) = align("no frames at all", 5);
        assert_well_formed(&units, 5);
        assert_eq!(units[0].title, "Deck");
        assert_eq!(units[1].title, OUTLINE_TITLE);
        assert_eq!(units[2].title, "Slide 3");
        assert_eq!(units[4].title, "Slide 5");
        assert!(units.iter().all(|u| !u.is_continuation));
    }

    #[test]
    fn test_scenario_exact_fit() {
        let (units, report) = align(&frames(&["One", "Two", "Three"]), 5);
        assert_well_formed(&units, 5);
        let titles: Vec<&str> = units[2..].iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert!(units.iter().all(|u| !u.is_continuation));
        assert_eq!(report.count(RecoveryKind::SpanCountMismatch), 0);
    }

    #[test]
    fn test_scenario_single_span_overflow() {
        let (units, report) = align(&frames(&["Only"]), 6);
        assert_well_formed(&units, 6);
        assert!(!units[2].is_continuation);
        for unit in &units[2..] {
            assert_eq!(unit.title, "Only");
            assert!(unit.content.contains("About Only"));
        }
        for unit in &units[3..] {
            assert!(unit.is_continuation);
            assert!(unit.content.starts_with("(continued)"));
        }
        assert_eq!(report.count(RecoveryKind::SpanCountMismatch), 1);
    }

    #[test]
    fn test_surplus_spans_dropped() {
        let (units, _) = align(&frames(&["A", "B", "C", "D"]), 4);
        assert_well_formed(&units, 4);
        assert_eq!(units[2].title, "A");
        assert_eq!(units[3].title, "B");
    }

    #[test]
    fn test_small_counts() {
        let (units, report) = align(&frames(&["A"]), 1);
        assert_well_formed(&units, 1);
        assert_eq!(report.count(RecoveryKind::SpanCountMismatch), 1);

        let (units, _) = align(&frames(&["A"]), 0);
        assert_eq!(units.len(), 1);

        let (units, _) = align(&frames(&["A"]), 2);
        assert_well_formed(&units, 2);
    }

    #[test]
    fn test_outline_span_becomes_unit_two() {
        let src = format!(
            "{}\\begin{{frame}}{{Agenda}}\n\\tableofcontents\n\\end{{frame}}\n\\section{{Intro}}\n{}",
            frames(&["Before"]),
            frames(&["After"])
        );
        let (units, _) = align(&src, 5);
        assert_well_formed(&units, 5);
        assert_eq!(units[1].title, "Agenda");
        assert_eq!(units[1].content, "- Intro");
        let titles: Vec<&str> = units[2..].iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["Before", "Section: Intro", "After"]);
    }

    #[test]
    fn test_outline_by_heading_keeps_its_content() {
        let src = "\\begin{frame}\\frametitle{Overview}\nWhat we cover\n\\end{frame}";
        let (units, _) = align(src, 2);
        assert_eq!(units[1].title, "Overview");
        assert_eq!(units[1].content, "What we cover");
    }

    #[test]
    fn test_generic_outline_without_sections() {
        let (units, _) = align(&frames(&["A"]), 3);
        assert_eq!(units[1].title, OUTLINE_TITLE);
        assert_eq!(units[1].content, GENERIC_OUTLINE);
    }

    #[test]
    fn test_title_page_folded_into_unit_one() {
        let src = format!("\\begin{{frame}}\\titlepage\\end{{frame}}\n{}", frames(&["Real"]));
        let spans = SpanScanner::new().scan(&src);
        assert_eq!(spans.len(), 2);
        assert_eq!(SlideAligner::new().content_span_count(&spans), 1);

        let (units, _) = align(&src, 3);
        assert_eq!(units[2].title, "Real");
    }

    #[test]
    fn test_adjacent_duplicates() {
        let src = "\\begin{frame}{Same}\nbody\n\\end{frame}\n\\begin{frame}{Same}\nbody\n\\end{frame}\n\\begin{frame}{Same}\nmore\n\\end{frame}\n\\begin{frame}{Next}\nx\n\\end{frame}";
        let (units, _) = align(src, 5);
        assert_well_formed(&units, 5);
        assert_eq!(units[2].title, "Same");
        assert!(!units[2].is_continuation);
        assert_eq!(units[3].title, "Same");
        assert!(units[3].is_continuation);
        assert_eq!(units[3].content, "(continued)\nmore");
        assert_eq!(units[4].title, "Next");
    }

    #[test]
    fn test_empty_frame_gets_placeholder() {
        let src = "\\begin{frame}{Blank}\n\\end{frame}\n\\begin{frame}\n\\end{frame}";
        let (units, report) = align(src, 4);
        assert_well_formed(&units, 4);
        assert_eq!(units[2].content, placeholder_content("Blank"));
        assert_eq!(units[3].title, UNTITLED_FRAME);
        assert_eq!(report.count(RecoveryKind::EmptyExtraction), 2);
        assert_eq!(report.count(RecoveryKind::TitleExtractionFailure), 1);
    }

    #[test]
    fn test_truncate_policy_pads_with_placeholders() {
        let spans = SpanScanner::new().scan(&frames(&["A"]));
        let mut report = RunReport::new();
        let aligner = SlideAligner::new().with_policy(Box::new(TruncatePolicy));
        let units = aligner.align(&spans, &DocumentMetadata::default(), 4, &mut report);
        assert_well_formed(&units, 4);
        assert_eq!(units[2].title, "A");
        assert_eq!(units[3].title, "Slide 4");
        assert_eq!(aligner.policy_name(), "truncate");
    }
}
