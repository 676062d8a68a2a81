//! Core slide types, balanced delimiter scanning, page-count resolution and
//! run reporting for Beamer slide extraction.

pub mod delimit;
pub mod error;
pub mod format;
pub mod normalize;
pub mod outline;
pub mod pages;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use format::SlideListingFormatter;
pub use pages::{
    NoProbe, PageCountProbe, PageCountResolver, PageCountSource, PageTextSource, ResolvedPageCount,
};
pub use report::{Notice, RecoveryKind, RunReport};
pub use types::{
    continuation_content, ordinal_title, placeholder_content, DocumentMetadata, SlideDeck,
    SlideUnit, SourceFormat, CONTINUATION_MARKER, OUTLINE_TITLE, SECTION_PREFIX, UNKNOWN_AUTHOR,
    UNTITLED_FRAME, UNTITLED_PRESENTATION,
};
