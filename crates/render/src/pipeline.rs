//! The render pipeline: parse, lower, transform, serialize.

use crate::html::render_html;
use crate::lower::{LowerOptions, lower};
use crate::options::RenderOptions;
use crate::raster::{self, RasterExport};
use crate::registry::{ComponentRegistry, default_registry};
use crate::transform::{
    AutolinkHeadings, DiagramBlocks, ExternalLinks, HeadingSlugs, Highlight, TreeTransform,
};
use crate::tree::{Document, text_content};
use docsmith_core::{ParseDiagnostics, ParseOptions, PipelineError, TocEntry, parse_mdast};
use thiserror::Error;

/// Errors that prevent a document from rendering at all.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The source could not be parsed.
    #[error(transparent)]
    Parse(#[from] PipelineError),
}

/// The standard transform stages, in order.
///
/// GFM (tables, task lists, strikethrough, autolinks, footnotes) is handled
/// at parse time and is always on. The order of the rest is load-bearing:
/// heading ids must exist before headings can be self-linked, and diagram
/// blocks must be claimed before the highlighter consumes their text.
pub fn standard_stages(options: &RenderOptions) -> Vec<Box<dyn TreeTransform>> {
    vec![
        Box::new(HeadingSlugs::new(options.dedupe_anchor_ids)),
        Box::new(AutolinkHeadings),
        Box::new(ExternalLinks::new(options.site_host.clone())),
        Box::new(DiagramBlocks),
        Box::new(Highlight),
    ]
}

/// Parses Markdown into a document and runs transform stages over it.
pub struct Pipeline {
    parse: ParseOptions,
    lower: LowerOptions,
    stages: Vec<Box<dyn TreeTransform>>,
}

impl Pipeline {
    /// Pipeline with the standard stages.
    pub fn new(options: &RenderOptions) -> Self {
        Self::with_stages(options, standard_stages(options))
    }

    /// Pipeline with a custom stage list.
    pub fn with_stages(options: &RenderOptions, stages: Vec<Box<dyn TreeTransform>>) -> Self {
        Self {
            parse: ParseOptions::docs().with_raw_html(options.allow_raw_html),
            lower: LowerOptions {
                allow_raw_html: options.allow_raw_html,
                lazy_images: options.lazy_images,
            },
            stages,
        }
    }

    /// Stage names in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Parses and lowers without running any stage.
    pub fn lower(&self, body: &str) -> Result<Document, RenderError> {
        let root = parse_mdast(body, &self.parse)?;
        Ok(lower(&root, self.lower))
    }

    /// Runs every stage over an already lowered document.
    pub fn apply(&self, document: &mut Document) {
        for stage in &self.stages {
            log::debug!("Running transform stage {}", stage.name());
            stage.transform(document);
        }
    }

    /// Parses, lowers and transforms `body`.
    pub fn run(&self, body: &str) -> Result<Document, RenderError> {
        let mut document = self.lower(body)?;
        self.apply(&mut document);
        Ok(document)
    }
}

/// Result of rendering one document body.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// Serialized HTML.
    pub html: String,
    /// Headings with the ids that were written into `html`.
    pub toc: Vec<TocEntry>,
    /// Warnings from every stage and from component rendering.
    pub diagnostics: ParseDiagnostics,
    /// The transformed tree.
    pub tree: Document,
}

/// Pipeline plus component registry and raster capability.
pub struct Renderer {
    pipeline: Pipeline,
    registry: ComponentRegistry,
    raster: Box<dyn RasterExport>,
}

impl Renderer {
    /// Renderer with the standard stages and built-in components.
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            pipeline: Pipeline::new(options),
            registry: default_registry(),
            raster: raster::for_target(options.target),
        }
    }

    /// Replaces the component registry.
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the pipeline.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Mutable access to the registry for adding components.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// The pipeline in use.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Renders a document body (frontmatter already removed).
    pub fn render(&self, body: &str) -> Result<RenderedDocument, RenderError> {
        let tree = self.pipeline.run(body)?;
        let (html, render_warnings) = render_html(&tree, &self.registry, self.raster.as_ref());
        let toc = collect_toc(&tree);
        let mut diagnostics = tree.diagnostics.clone();
        diagnostics.extend(render_warnings);
        Ok(RenderedDocument {
            html,
            toc,
            diagnostics,
            tree,
        })
    }
}

/// Renders `body` with the standard pipeline and built-in components.
pub fn render_document(
    body: &str,
    options: &RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    Renderer::new(options).render(body)
}

/// Headings of a transformed tree that carry an id.
pub fn collect_toc(document: &Document) -> Vec<TocEntry> {
    document
        .elements()
        .into_iter()
        .filter_map(|el| {
            let depth = el.heading_depth()?;
            let id = el.attr("id")?;
            Some(TocEntry {
                title: text_content(&el.children).trim().to_string(),
                id: id.to_string(),
                depth,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlWriter;
    use crate::options::RenderTarget;
    use crate::transform::{DIAGRAM_COMPONENT, DIAGRAM_SOURCE_PROP, HIGHLIGHT_CLASS};
    use crate::tree::{Component, PropValue};
    use docsmith_core::ParseWarning;
    use proptest::prelude::*;

    fn render(body: &str) -> RenderedDocument {
        render_document(body, &RenderOptions::default()).unwrap()
    }

    fn render_with(stages: Vec<Box<dyn TreeTransform>>, body: &str) -> String {
        let options = RenderOptions::default();
        Renderer::new(&options)
            .with_pipeline(Pipeline::with_stages(&options, stages))
            .render(body)
            .unwrap()
            .html
    }

    fn standard() -> Vec<Box<dyn TreeTransform>> {
        standard_stages(&RenderOptions::default())
    }

    fn autolink_before_slugs() -> Vec<Box<dyn TreeTransform>> {
        vec![
            Box::new(AutolinkHeadings),
            Box::new(HeadingSlugs::new(false)),
            Box::new(ExternalLinks::default()),
            Box::new(DiagramBlocks),
            Box::new(Highlight),
        ]
    }

    fn highlight_before_diagrams() -> Vec<Box<dyn TreeTransform>> {
        vec![
            Box::new(HeadingSlugs::new(false)),
            Box::new(AutolinkHeadings),
            Box::new(ExternalLinks::default()),
            Box::new(Highlight),
            Box::new(DiagramBlocks),
        ]
    }

    #[test]
    fn stage_order() {
        let pipeline = Pipeline::new(&RenderOptions::default());
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "heading-slugs",
                "autolink-headings",
                "external-links",
                "diagram-blocks",
                "highlight"
            ]
        );
    }

    #[test]
    fn diagram_block_becomes_single_component() {
        let rendered = render("```mermaid\ngraph TD\nA-->B\n```");
        let components = rendered.tree.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, DIAGRAM_COMPONENT);
        assert_eq!(
            components[0].prop(DIAGRAM_SOURCE_PROP),
            Some(&PropValue::literal("graph TD\nA-->B"))
        );
        assert!(rendered.tree.elements().is_empty());
        assert!(!rendered.html.contains(HIGHLIGHT_CLASS));
        assert!(rendered.html.contains(r#"<pre class="mermaid">graph TD"#));
    }

    #[test]
    fn external_link_hardened() {
        let rendered = render("[x](https://example.com)");
        insta::assert_snapshot!(rendered.html, @r#"<p><a href="https://example.com" rel="noopener noreferrer" target="_blank">x</a></p>"#);
    }

    #[test]
    fn heading_gets_id_and_self_link() {
        let rendered = render("## Getting Started");
        insta::assert_snapshot!(rendered.html, @r##"<h2 id="getting-started"><a class="heading-anchor" href="#getting-started">Getting Started</a></h2>"##);
    }

    #[test]
    fn code_is_highlighted() {
        let rendered = render("```rust\nfn main() {}\n```");
        assert!(rendered.html.starts_with(r#"<pre class="highlight" data-language="rust"><code class="language-rust">"#));
        assert!(rendered.html.contains("hl-"));
    }

    #[test]
    fn empty_diagram_falls_back_to_code() {
        let rendered = render("```mermaid\n\n```");
        assert!(rendered.tree.components().is_empty());
        assert!(matches!(
            rendered.diagnostics.warnings[0],
            ParseWarning::EmptyDiagram { location: Some(_) }
        ));
    }

    #[test]
    fn toc_ids_match_raw_extractor() {
        let body = "# Intro\n\n## Setup & Run\n\n```sh\n# not a heading\n```\n\n## `code` **bold**\n";
        let rendered = render(body);
        let raw_ids: Vec<_> = docsmith_core::extract(body).into_iter().map(|e| e.id).collect();
        let tree_ids: Vec<_> = rendered.toc.iter().map(|e| e.id.clone()).collect();
        assert_eq!(raw_ids, tree_ids);
        assert_eq!(rendered.toc[2].title, "code bold");
    }

    #[test]
    fn inline_html_in_heading_splits_live_and_rendered_ids() {
        let body = "## Hello <span>x</span>";
        let rendered = render(body);
        assert_eq!(rendered.toc[0].id, "hello-x");
        assert_eq!(docsmith_core::extract(body)[0].id, "hello-spanxspan");
    }

    #[test]
    fn registered_component_replaces_fallback() {
        fn render_badge(component: &Component, writer: &mut HtmlWriter<'_>) {
            writer.push_raw("<span");
            writer.push_attr("class", "badge");
            writer.push_raw(">");
            writer.render_nodes(&component.children);
            writer.push_raw("</span>");
        }

        let mut renderer = Renderer::new(&RenderOptions::default());
        assert!(renderer.registry_mut().register("Badge", render_badge).is_none());
        let rendered = renderer.render("<Badge>\n\nNew\n\n</Badge>").unwrap();
        assert!(rendered.html.starts_with(r#"<span class="badge">"#));
        assert!(!rendered.html.contains("unrecognized-block"));
        assert!(rendered.diagnostics.warnings.is_empty());
    }

    #[test]
    fn unknown_components_reported() {
        let rendered = render("<Tabs>\n\nA\n\n</Tabs>");
        assert!(rendered.html.contains("unrecognized-block"));
        assert!(matches!(
            rendered.diagnostics.warnings[0],
            ParseWarning::UnknownComponent { ref name, location: Some(_) } if name == "Tabs"
        ));
    }

    #[test]
    fn static_target_has_no_raster_control() {
        let options = RenderOptions {
            target: RenderTarget::Static,
            ..RenderOptions::default()
        };
        let rendered = render_document("```mermaid\ngraph TD\nA-->B\n```", &options).unwrap();
        assert!(rendered.html.contains("diagram--source"));
        assert!(!rendered.html.contains("Open full size"));
    }

    #[test]
    fn dedupe_option_applies_to_ids() {
        let options = RenderOptions {
            dedupe_anchor_ids: true,
            ..RenderOptions::default()
        };
        let rendered = render_document("# A\n\n# A", &options).unwrap();
        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a-1"]);
    }

    #[test]
    fn parse_failure_is_an_error() {
        let err = render_document("<Alert>\n\n</Cards>", &RenderOptions::default());
        assert!(matches!(err, Err(RenderError::Parse(_))));
    }

    proptest! {
        #[test]
        fn swapping_slug_and_autolink_changes_output(title in "[A-Za-z][A-Za-z ]{0,20}") {
            let body = format!("## {title}");
            prop_assert_ne!(render_with(standard(), &body), render_with(autolink_before_slugs(), &body));
        }

        #[test]
        fn swapping_diagram_and_highlight_changes_output(source in "[A-Za-z][A-Za-z >-]{0,20}") {
            let body = format!("```mermaid\n{source}\n```");
            prop_assert_ne!(render_with(standard(), &body), render_with(highlight_before_diagrams(), &body));
        }
    }
}
