//! Resolution of the target slide count.
//!
//! The rendered document is the authority on how many slides exist. When it
//! cannot be consulted the count is estimated from the source structure.

use crate::report::{RecoveryKind, RunReport};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Synthetic units the estimate adds on top of the content spans
/// (Title and Outline).
pub const SYNTHETIC_UNITS: usize = 2;

/// Reports how many pages a rendered artifact has.
pub trait PageCountProbe {
    /// Return the page count of `artifact`.
    fn page_count(&self, artifact: &Path) -> Result<usize>;
}

/// Extracts per-page text from a rendered artifact.
pub trait PageTextSource {
    /// Return one string per page, in page order.
    fn page_texts(&self, artifact: &Path) -> Result<Vec<String>>;
}

/// Probe used when no rendered artifact can be consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl PageCountProbe for NoProbe {
    fn page_count(&self, artifact: &Path) -> Result<usize> {
        Err(crate::Error::ToolFailed {
            tool: "page-count probe".to_string(),
            reason: format!("no probe configured for {}", artifact.display()),
        })
    }
}

/// Where a resolved count came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCountSource {
    /// Read from the rendered artifact at this path.
    Rendered(PathBuf),
    /// Estimated from the span count.
    Estimated,
}

/// The target cardinality of a deck, always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPageCount {
    count: usize,
    source: PageCountSource,
}

impl ResolvedPageCount {
    /// An authoritative count read from a rendered artifact.
    pub fn rendered(count: usize, artifact: impl Into<PathBuf>) -> Self {
        Self {
            count: count.max(1),
            source: PageCountSource::Rendered(artifact.into()),
        }
    }

    /// An estimate from the number of content spans.
    pub fn estimated(span_count: usize) -> Self {
        Self {
            count: (span_count + SYNTHETIC_UNITS).max(1),
            source: PageCountSource::Estimated,
        }
    }

    /// The target count.
    pub fn get(&self) -> usize {
        self.count
    }

    /// Where the count came from.
    pub fn source(&self) -> &PageCountSource {
        &self.source
    }

    /// Whether the count was read from a rendered artifact.
    pub fn is_authoritative(&self) -> bool {
        matches!(self.source, PageCountSource::Rendered(_))
    }
}

/// Resolves the target count from candidate artifact paths.
pub struct PageCountResolver<'a> {
    probe: &'a dyn PageCountProbe,
}

impl<'a> PageCountResolver<'a> {
    /// Create a resolver using `probe`.
    pub fn new(probe: &'a dyn PageCountProbe) -> Self {
        Self { probe }
    }

    /// Resolve the count. Never fails.
    ///
    /// The first candidate that exists is probed; later candidates are not
    /// tried once one exists, even if its probe fails.
    pub fn resolve(
        &self,
        candidates: &[PathBuf],
        span_count: usize,
        report: &mut RunReport,
    ) -> ResolvedPageCount {
        let Some(artifact) = candidates.iter().find(|p| p.is_file()) else {
            report.note(
                RecoveryKind::ProbeUnavailable,
                format!(
                    "no rendered artifact among {} candidate(s); estimating {} pages",
                    candidates.len(),
                    span_count + SYNTHETIC_UNITS
                ),
            );
            return ResolvedPageCount::estimated(span_count);
        };

        match self.probe.page_count(artifact) {
            Ok(0) => {
                report.note(
                    RecoveryKind::ProbeUnavailable,
                    format!("{} reports zero pages; estimating", artifact.display()),
                );
                ResolvedPageCount::estimated(span_count)
            }
            Ok(count) => {
                log::debug!("{} has {} page(s)", artifact.display(), count);
                ResolvedPageCount::rendered(count, artifact)
            }
            Err(e) => {
                report.note(
                    RecoveryKind::ProbeUnavailable,
                    format!("probing {} failed ({}); estimating", artifact.display(), e),
                );
                ResolvedPageCount::estimated(span_count)
            }
        }
    }
}
