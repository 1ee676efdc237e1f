//! Serializes a document tree to HTML.

use crate::raster::RasterExport;
use crate::registry::ComponentRegistry;
use crate::tree::{Component, DocNode, Document, Element};
use docsmith_core::{ParseDiagnostics, ParseWarning};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML output buffer handed to component renderers.
pub struct HtmlWriter<'a> {
    registry: &'a ComponentRegistry,
    raster: &'a dyn RasterExport,
    out: String,
    diagram_count: usize,
    diagnostics: ParseDiagnostics,
}

impl<'a> HtmlWriter<'a> {
    /// Creates an empty writer.
    pub fn new(registry: &'a ComponentRegistry, raster: &'a dyn RasterExport) -> Self {
        Self {
            registry,
            raster,
            out: String::new(),
            diagram_count: 0,
            diagnostics: ParseDiagnostics::new(),
        }
    }

    /// Appends markup verbatim.
    pub fn push_raw(&mut self, html: &str) {
        self.out.push_str(html);
    }

    /// Appends escaped text.
    pub fn push_text(&mut self, text: &str) {
        html_escape::encode_text_to_string(text, &mut self.out);
    }

    /// Appends an escaped double-quoted attribute value (without the quotes).
    pub fn push_attr_value(&mut self, value: &str) {
        html_escape::encode_double_quoted_attribute_to_string(value, &mut self.out);
    }

    /// Appends ` name="value"`.
    pub fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.push_attr_value(value);
        self.out.push('"');
    }

    /// Serializes nodes in order.
    pub fn render_nodes(&mut self, nodes: &[DocNode]) {
        for node in nodes {
            self.render_node(node);
        }
    }

    /// Serializes one node, dispatching components through the registry.
    pub fn render_node(&mut self, node: &DocNode) {
        match node {
            DocNode::Element(el) => self.render_element(el),
            DocNode::Component(component) => self.render_component(component),
            DocNode::Text { value } => self.push_text(value),
            DocNode::Raw { html } => self.push_raw(html),
        }
    }

    /// Serializes a component via its registered renderer or the fallback.
    pub fn render_component(&mut self, component: &Component) {
        let registry = self.registry;
        let renderer = registry.resolve(&component.name);
        renderer(component, self);
    }

    fn render_element(&mut self, el: &Element) {
        self.push_raw("<");
        self.push_raw(&el.tag);
        for (name, value) in &el.attributes {
            if value.is_empty() && is_boolean_attr(name) {
                self.push_raw(" ");
                self.push_raw(name);
            } else {
                self.push_attr(name, value);
            }
        }
        if VOID_ELEMENTS.contains(&el.tag.as_str()) {
            self.push_raw(" />");
            return;
        }
        self.push_raw(">");
        self.render_nodes(&el.children);
        self.push_raw("</");
        self.push_raw(&el.tag);
        self.push_raw(">");
    }

    /// Returns a document-unique diagram id (`diagram-1`, `diagram-2`, ...).
    pub fn next_diagram_id(&mut self) -> String {
        self.diagram_count += 1;
        format!("diagram-{}", self.diagram_count)
    }

    /// Raster export capability for the current target.
    pub fn raster(&self) -> &'a dyn RasterExport {
        self.raster
    }

    /// Records a non-fatal warning.
    pub fn warn(&mut self, warning: ParseWarning) {
        log::warn!("{warning}");
        self.diagnostics.add_warning(warning);
    }

    /// Returns the markup and the warnings raised while writing.
    pub fn finish(self) -> (String, ParseDiagnostics) {
        (self.out, self.diagnostics)
    }
}

fn is_boolean_attr(name: &str) -> bool {
    matches!(name, "checked" | "disabled") || name.starts_with("data-footnote")
}

/// Serializes a whole document.
pub fn render_html(
    document: &Document,
    registry: &ComponentRegistry,
    raster: &dyn RasterExport,
) -> (String, ParseDiagnostics) {
    let mut writer = HtmlWriter::new(registry, raster);
    writer.render_nodes(&document.children);
    writer.finish()
}
