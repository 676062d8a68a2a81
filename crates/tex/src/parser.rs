//! LaTeX Beamer source parser implementation.

use crate::align::{AlignmentPolicy, SlideAligner};
use crate::metadata::extract_metadata;
use crate::span::SpanScanner;
use beamer_core::{
    Error, NoProbe, PageCountProbe, PageCountResolver, Result, RunReport, SlideDeck, SourceFormat,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for Beamer `.tex` sources.
pub struct TexParser {
    scanner: SpanScanner,
    aligner: SlideAligner,
    probe: Box<dyn PageCountProbe>,
    render_dir: Option<PathBuf>,
}

impl TexParser {
    /// Create a parser with no page-count probe. Counts are estimated.
    pub fn new() -> Self {
        Self {
            scanner: SpanScanner::new(),
            aligner: SlideAligner::new(),
            probe: Box::new(NoProbe),
            render_dir: None,
        }
    }

    /// Use `probe` to read page counts of rendered artifacts.
    pub fn with_probe(mut self, probe: Box<dyn PageCountProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Use a different alignment policy.
    pub fn with_policy(mut self, policy: Box<dyn AlignmentPolicy>) -> Self {
        self.aligner = self.aligner.with_policy(policy);
        self
    }

    /// Also look for the rendered artifact in `dir`.
    pub fn with_render_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_dir = Some(dir.into());
        self
    }

    /// Where the rendered artifact of `source` may live, in priority order:
    /// next to the source, then in the render directory.
    pub fn artifact_candidates(&self, source: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![source.with_extension("pdf")];
        if let (Some(dir), Some(stem)) = (&self.render_dir, source.file_stem()) {
            let mut name = stem.to_os_string();
            name.push(".pdf");
            candidates.push(dir.join(name));
        }
        candidates
    }

    /// Parse a source file. Fails only when the file cannot be read.
    pub fn parse_file(&self, path: &Path) -> Result<SlideDeck> {
        let bytes = fs::read(path).map_err(|e| Error::unreadable(path, e))?;
        let source = String::from_utf8_lossy(&bytes);

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        Ok(self.parse_str(&source, filename, &self.artifact_candidates(path)))
    }

    /// Parse source text, resolving the page count from `candidates`.
    pub fn parse_str(&self, source: &str, filename: &str, candidates: &[PathBuf]) -> SlideDeck {
        let mut report = RunReport::new();

        let spans = self.scanner.scan(source);
        log::debug!("{}: {} span(s)", filename, spans.len());

        let metadata = extract_metadata(source);
        let span_count = self.aligner.content_span_count(&spans);
        let page_count =
            PageCountResolver::new(self.probe.as_ref()).resolve(candidates, span_count, &mut report);

        let slides = self
            .aligner
            .align(&spans, &metadata, page_count.get(), &mut report);

        SlideDeck {
            filename: filename.to_string(),
            format: SourceFormat::Latex,
            metadata,
            page_count,
            slides,
            notices: report.into_notices(),
        }
    }
}

impl Default for TexParser {
    fn default() -> Self {
        Self::new()
    }
}
