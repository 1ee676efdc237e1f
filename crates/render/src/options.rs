//! Render options.

use serde::{Deserialize, Serialize};

/// Where rendered output will be displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    /// A browser that can rasterize diagrams to a canvas.
    #[default]
    Browser,
    /// Static output with no scripting; diagrams fall back to source.
    Static,
}

/// Options for the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RenderOptions {
    /// Write raw HTML from the source verbatim instead of escaping it.
    #[serde(default)]
    pub allow_raw_html: bool,
    /// Add `loading="lazy"` to images.
    #[serde(default = "default_lazy_images")]
    pub lazy_images: bool,
    /// Suffix repeated heading ids with `-1`, `-2`, ...
    #[serde(default)]
    pub dedupe_anchor_ids: bool,
    /// Host of the documentation site; links to any other host open in a new
    /// window. When unset every absolute http(s) link counts as external.
    #[serde(default)]
    pub site_host: Option<String>,
    /// Output target.
    #[serde(default)]
    pub target: RenderTarget,
}

fn default_lazy_images() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            lazy_images: default_lazy_images(),
            dedupe_anchor_ids: false,
            site_host: None,
            target: RenderTarget::default(),
        }
    }
}
