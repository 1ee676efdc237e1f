//! Diagram rasterization capability.
//!
//! In a browser a rendered diagram can be drawn to a canvas and opened at full
//! size. Static output has no such capability, so the diagram source is shown
//! in a scrollable block instead.

use crate::options::RenderTarget;

/// Decides what full-size control, if any, accompanies a diagram.
pub trait RasterExport: Send + Sync {
    /// Returns true if diagrams can be rasterized on this target.
    fn is_supported(&self) -> bool;

    /// Markup for the "open full size" control of diagram `diagram_id`.
    fn full_size_control(&self, diagram_id: &str) -> Option<String>;
}

/// Canvas export, available when rendering for a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasRasterExport;

impl RasterExport for CanvasRasterExport {
    fn is_supported(&self) -> bool {
        true
    }

    fn full_size_control(&self, diagram_id: &str) -> Option<String> {
        let id = html_escape::encode_double_quoted_attribute(diagram_id);
        Some(format!(
            r#"<button type="button" class="diagram__open" data-raster-export="canvas" data-diagram-target="{id}">Open full size</button>"#
        ))
    }
}

/// No rasterization; diagrams render as scrollable source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRasterExport;

impl RasterExport for UnsupportedRasterExport {
    fn is_supported(&self) -> bool {
        false
    }

    fn full_size_control(&self, _diagram_id: &str) -> Option<String> {
        None
    }
}

/// Picks the export capability for a render target.
pub fn for_target(target: RenderTarget) -> Box<dyn RasterExport> {
    match target {
        RenderTarget::Browser => Box::new(CanvasRasterExport),
        RenderTarget::Static => Box::new(UnsupportedRasterExport),
    }
}
