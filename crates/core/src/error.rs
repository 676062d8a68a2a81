//! Error types for slide extraction.
//!
//! Only conditions that abort a run live here. Conditions the pipeline
//! recovers from are recorded on the [`RunReport`](crate::RunReport) instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during slide extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// The source file is missing or could not be read.
    #[error("Failed to read source '{}': {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O failure (spawning or talking to an external tool).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The source format is not supported or could not be detected.
    #[error("Unsupported or unrecognized source format: {0}")]
    UnsupportedFormat(String),

    /// An external tool exited unsuccessfully.
    #[error("External tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// An external tool did not finish within its time budget.
    #[error("External tool '{tool}' timed out after {}s", timeout.as_secs())]
    ToolTimeout { tool: String, timeout: Duration },

    /// The page-count probe ran but its output held no usable page count.
    #[error("Could not read a page count from probe output: {0}")]
    ProbeOutput(String),

    /// The rendered document yielded no pages at all.
    #[error("Rendered document '{}' contains no pages", .0.display())]
    EmptyDocument(PathBuf),
}

impl Error {
    /// Build a [`Error::SourceUnreadable`] for `path`.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}
