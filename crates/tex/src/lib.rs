//! LaTeX Beamer source backend.
//!
//! Scans a `.tex` source for frames and sections, extracts titles and
//! narration-friendly content, and aligns the result to the page count of
//! the rendered document.

pub mod align;
pub mod markup;
pub mod metadata;
pub mod normalize;
pub mod parser;
pub mod span;
pub mod title;

pub use align::{AlignmentPolicy, ProportionalPolicy, SlideAligner, Slot, TruncatePolicy};
pub use metadata::extract_metadata;
pub use normalize::ContentNormalizer;
pub use parser::TexParser;
pub use span::{Span, SpanDetector, SpanKind, SpanScanner};
pub use title::{TitleExtractor, TitleTier};
