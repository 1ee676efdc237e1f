#![deny(missing_docs)]
//! docsmith render engine: document tree, transform pipeline, and component
//! registry.

/// HTML serialization.
pub mod html;
/// mdast to document tree lowering.
pub mod lower;
/// Render options.
pub mod options;
/// Pipeline orchestration.
pub mod pipeline;
/// Diagram rasterization capability.
pub mod raster;
/// Component registry and built-in components.
pub mod registry;
/// Transform stages.
pub mod transform;
/// Document tree types.
pub mod tree;

pub use html::{HtmlWriter, render_html};
pub use options::{RenderOptions, RenderTarget};
pub use pipeline::{
    Pipeline, RenderError, RenderedDocument, Renderer, collect_toc, render_document,
    standard_stages,
};
pub use raster::{CanvasRasterExport, RasterExport, UnsupportedRasterExport};
pub use registry::{ComponentRegistry, ComponentRenderer, CustomBlock, default_registry};
pub use transform::TreeTransform;
pub use tree::{Component, DocNode, Document, Element, PropValue};
