//! Rendered PDF backend.
//!
//! Wraps the Poppler tools for page counts and page text, and parses slide
//! units straight from page text when no Beamer source is available.

pub mod parser;
pub mod tools;

pub use parser::PdfTextParser;
pub use tools::{PdfInfoProbe, PdfToText, ToolOptions};
