//! Poppler command-line tools (`pdfinfo`, `pdftotext`) behind the core
//! probe and text-source seams.

use beamer_core::normalize::compose;
use beamer_core::{Error, PageCountProbe, PageTextSource, Result};
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

/// Default time budget for one tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Page delimiter in `pdftotext` output.
const PAGE_BREAK: char = '\u{000C}';

const POLL_INTERVAL: Duration = Duration::from_millis(50);

static PAGES_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Pages:\s+(\d+)\s*$").unwrap());

/// Locations of the external tools and their time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOptions {
    pub pdfinfo: PathBuf,
    pub pdftotext: PathBuf,
    pub timeout: Duration,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            pdfinfo: PathBuf::from("pdfinfo"),
            pdftotext: PathBuf::from("pdftotext"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ToolOptions {
    /// Set the time budget for each invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a specific `pdfinfo` executable.
    pub fn with_pdfinfo(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdfinfo = path.into();
        self
    }

    /// Use a specific `pdftotext` executable.
    pub fn with_pdftotext(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftotext = path.into();
        self
    }
}

/// Run `command`, killing it once `timeout` elapses.
///
/// Output is drained on reader threads so a chatty tool cannot block on a
/// full pipe while we wait. A non-zero exit is reported as
/// [`Error::ToolFailed`] carrying the tool's stderr.
pub fn run_with_timeout(mut command: Command, tool: &str, timeout: Duration) -> Result<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ToolFailed {
            tool: tool.to_string(),
            reason: format!("could not start: {}", e),
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if started.elapsed() >= timeout {
            log::warn!("{} exceeded {}s; killing", tool, timeout.as_secs());
            // The child may have exited between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::ToolTimeout {
                tool: tool.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let output = Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }
    Ok(output)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Read the page count from `pdfinfo` output.
pub fn parse_page_count(output: &str) -> Result<usize> {
    PAGES_LINE_REGEX
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| {
            let first = output.lines().next().unwrap_or("").trim();
            Error::ProbeOutput(format!("no 'Pages:' line (output starts with '{}')", first))
        })
}

/// Split `pdftotext` output into pages.
///
/// Every page ends with a form feed, so the chunk after the last one is
/// dropped when empty. Blank pages inside the document are kept.
pub fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw.split(PAGE_BREAK).map(compose).collect();
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

/// Page-count probe backed by `pdfinfo`.
#[derive(Debug, Clone, Default)]
pub struct PdfInfoProbe {
    options: ToolOptions,
}

impl PdfInfoProbe {
    pub fn new(options: ToolOptions) -> Self {
        Self { options }
    }
}

impl PageCountProbe for PdfInfoProbe {
    fn page_count(&self, artifact: &Path) -> Result<usize> {
        let mut command = Command::new(&self.options.pdfinfo);
        command.arg(artifact);

        let output = run_with_timeout(command, "pdfinfo", self.options.timeout)?;
        parse_page_count(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Per-page text backed by `pdftotext`.
#[derive(Debug, Clone, Default)]
pub struct PdfToText {
    options: ToolOptions,
}

impl PdfToText {
    pub fn new(options: ToolOptions) -> Self {
        Self { options }
    }
}

impl PageTextSource for PdfToText {
    fn page_texts(&self, artifact: &Path) -> Result<Vec<String>> {
        let mut command = Command::new(&self.options.pdftotext);
        command.arg("-enc").arg("UTF-8").arg(artifact).arg("-");

        let output = run_with_timeout(command, "pdftotext", self.options.timeout)?;
        let pages = split_pages(&String::from_utf8_lossy(&output.stdout));
        log::debug!("pdftotext: {} page(s) from {}", pages.len(), artifact.display());
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let output = "Title:          Waves\nProducer:       pdfTeX\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(output).unwrap(), 12);
    }

    #[test]
    fn test_parse_page_count_garbage() {
        let err = parse_page_count("Syntax Error: Couldn't read xref table").unwrap_err();
        assert!(matches!(err, Error::ProbeOutput(_)));
    }

    #[test]
    fn test_split_pages() {
        let raw = "Title\nAuthor\n\u{000C}Outline\n\u{000C}\u{000C}Last\n\u{000C}";
        let pages = split_pages(raw);
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0], "Title\nAuthor\n");
        assert!(pages[2].is_empty());
        assert_eq!(pages[3], "Last\n");
    }

    #[test]
    fn test_split_pages_composes() {
        let pages = split_pages("cafe\u{0301}\u{000C}");
        assert_eq!(pages, vec!["café".to_string()]);
    }

    #[test]
    fn test_missing_tool_fails() {
        let options = ToolOptions::default().with_pdfinfo("/nonexistent/bin/pdfinfo");
        let err = PdfInfoProbe::new(options)
            .page_count(Path::new("deck.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_tool() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let started = Instant::now();
        let err = run_with_timeout(command, "sleep", Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, Error::ToolTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo broken >&2; exit 3");
        let err = run_with_timeout(command, "sh", Duration::from_secs(10)).unwrap_err();
        match err {
            Error::ToolFailed { reason, .. } => assert!(reason.contains("broken")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
