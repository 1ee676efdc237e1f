//! Tree transform stages.
//!
//! - `slugs`: assigns heading ids.
//! - `autolink`: wraps heading content in a self-link.
//! - `external_links`: opens off-site links in a new window.
//! - `diagram`: turns diagram-language code blocks into diagram components.
//! - `highlight`: syntax-highlights the remaining code blocks.

use crate::tree::Document;

/// Heading self-link wrapping.
pub mod autolink;
/// Diagram block conversion.
pub mod diagram;
/// External link hardening.
pub mod external_links;
/// Syntax highlighting.
pub mod highlight;
/// Heading id assignment.
pub mod slugs;

pub use autolink::AutolinkHeadings;
pub use diagram::{DIAGRAM_COMPONENT, DIAGRAM_LANGUAGE, DIAGRAM_SOURCE_PROP, DiagramBlocks};
pub use external_links::ExternalLinks;
pub use highlight::{HIGHLIGHT_CLASS, Highlight, highlight_code};
pub use slugs::HeadingSlugs;

/// One stage of the render pipeline.
///
/// Stages rewrite the document in place and report problems through
/// `document.diagnostics` rather than failing.
pub trait TreeTransform: Send + Sync {
    /// Short stage name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrites the document.
    fn transform(&self, document: &mut Document);
}
