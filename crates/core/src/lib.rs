#![deny(missing_docs)]
//! docsmith core: frontmatter codec, heading extraction, and anchor slugs.

/// Fenced code block tracking.
pub mod code_fence;
/// Core error and diagnostic types.
pub mod error;
/// YAML frontmatter split/join.
pub mod frontmatter;
/// Markdown parsing entry points.
pub mod parse;
/// Anchor id derivation.
pub mod slug;
/// Table-of-contents extraction.
pub mod toc;

pub use code_fence::FenceTracker;
pub use error::{ParseDiagnostics, ParseWarning, PipelineError, SourceLocation};
pub use frontmatter::{
    Frontmatter, FrontmatterError, FrontmatterExtraction, SourceDocument, extract_frontmatter,
    join, split,
};
pub use parse::{ParseOptions, parse_mdast};
pub use slug::{FALLBACK_ID, Slugger, anchor_id};
pub use toc::{TocEntry, clean_heading_text, extract, extract_from_mdast, extract_with};
