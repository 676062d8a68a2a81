//! Per-run reporting of recovered conditions.
//!
//! A [`RunReport`] is created for one pipeline run and handed to every
//! component by `&mut`. Each notice is forwarded to the `log` facade and kept
//! so callers can inspect what the run had to paper over.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditions the pipeline recovers from instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryKind {
    /// No rendered artifact, or the page-count probe failed; count estimated.
    ProbeUnavailable,
    /// A unit's content came out empty and a placeholder was substituted.
    EmptyExtraction,
    /// Scanned spans did not match the number of page slots.
    SpanCountMismatch,
    /// No title could be found for a span; the sentinel was used.
    TitleExtractionFailure,
}

impl fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecoveryKind::ProbeUnavailable => "probe unavailable",
            RecoveryKind::EmptyExtraction => "empty extraction",
            RecoveryKind::SpanCountMismatch => "span count mismatch",
            RecoveryKind::TitleExtractionFailure => "title extraction failure",
        };
        f.write_str(name)
    }
}

/// A single recovered condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: RecoveryKind,
    pub message: String,
}

/// Collects notices for a single run.
#[derive(Debug, Default)]
pub struct RunReport {
    notices: Vec<Notice>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recovered condition.
    pub fn note(&mut self, kind: RecoveryKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            // Frequent and harmless on untitled decks.
            RecoveryKind::TitleExtractionFailure => log::debug!("{}: {}", kind, message),
            _ => log::warn!("{}: {}", kind, message),
        }
        self.notices.push(Notice { kind, message });
    }

    /// All notices recorded so far.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Number of notices of `kind`.
    pub fn count(&self, kind: RecoveryKind) -> usize {
        self.notices.iter().filter(|n| n.kind == kind).count()
    }

    /// Consume the report, returning its notices.
    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}
