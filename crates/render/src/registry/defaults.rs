//! Built-in renderers for the documentation components.

use super::ComponentRegistry;
use super::blocks::{AlertBlock, BlockError, CARD_COMPONENT, Card, CardGrid, Diagram, FramedImage};
use super::icons::icon_svg;
use crate::html::HtmlWriter;
use crate::transform::{DIAGRAM_COMPONENT, DIAGRAM_LANGUAGE};
use crate::tree::{Component, DocNode};
use docsmith_core::ParseWarning;

/// Registry with every built-in component.
pub fn default_registry() -> ComponentRegistry {
    ComponentRegistry::new()
        .with("Alert", render_alert)
        .with("AlertTitle", render_alert_title)
        .with("AlertDescription", render_alert_description)
        .with("Cards", render_cards)
        .with(CARD_COMPONENT, render_card)
        .with("ImageFrame", render_image_frame)
        .with("Frame", render_image_frame)
        .with(DIAGRAM_COMPONENT, render_diagram)
}

fn invalid(component: &Component, err: BlockError) -> ParseWarning {
    ParseWarning::InvalidBlock {
        component: component.name.clone(),
        message: err.to_string(),
    }
}

/// Fallback for unregistered components: keeps the content visible inside a
/// marked container and records a warning.
pub fn render_unknown(component: &Component, writer: &mut HtmlWriter<'_>) {
    writer.warn(ParseWarning::UnknownComponent {
        name: component.name.clone(),
        location: component.location,
    });
    writer.push_raw("<div");
    writer.push_attr("class", "unrecognized-block");
    writer.push_attr("data-component", &component.name);
    writer.push_raw(">");
    writer.render_nodes(&component.children);
    writer.push_raw("</div>");
}

/// `<Alert variant="info|warning|important" title="..">`.
pub fn render_alert(component: &Component, writer: &mut HtmlWriter<'_>) {
    let (alert, error) = AlertBlock::from_component(component);
    if let Some(err) = error {
        writer.warn(invalid(component, err));
    }
    let variant = alert.variant.as_str();
    writer.push_raw("<div");
    writer.push_attr("class", &format!("alert alert--{variant}"));
    writer.push_attr("role", "alert");
    writer.push_attr("data-variant", variant);
    writer.push_raw(">");
    if let Some(title) = &alert.title {
        writer.push_raw(r#"<h5 class="alert__title">"#);
        writer.push_text(title);
        writer.push_raw("</h5>");
    }
    writer.render_nodes(&component.children);
    writer.push_raw("</div>");
}

/// `<AlertTitle>`.
pub fn render_alert_title(component: &Component, writer: &mut HtmlWriter<'_>) {
    writer.push_raw(r#"<h5 class="alert__title">"#);
    writer.render_nodes(&component.children);
    writer.push_raw("</h5>");
}

/// `<AlertDescription>`.
pub fn render_alert_description(component: &Component, writer: &mut HtmlWriter<'_>) {
    writer.push_raw(r#"<div class="alert__description">"#);
    writer.render_nodes(&component.children);
    writer.push_raw("</div>");
}

/// `<Cards content={[...]}>` with optional `<Card>` children.
pub fn render_cards(component: &Component, writer: &mut HtmlWriter<'_>) {
    let (grid, errors) = CardGrid::from_component(component);
    for err in errors {
        writer.warn(invalid(component, err));
    }
    writer.push_raw(r#"<ul class="card-grid">"#);
    for card in &grid.cards {
        writer.push_raw("<li>");
        write_card(card, writer);
        writer.push_raw("</li>");
    }
    writer.push_raw("</ul>");

    // Anything besides cards and blank text is rendered after the grid.
    for child in &component.children {
        match child {
            DocNode::Component(c) if c.name == CARD_COMPONENT => {}
            DocNode::Text { value } if value.trim().is_empty() => {}
            other => writer.render_node(other),
        }
    }
}

/// A `<Card>` outside of `<Cards>`.
pub fn render_card(component: &Component, writer: &mut HtmlWriter<'_>) {
    match Card::from_component(component) {
        Ok(card) => write_card(&card, writer),
        Err(err) => {
            writer.warn(invalid(component, err));
            writer.render_nodes(&component.children);
        }
    }
}

fn write_card(card: &Card, writer: &mut HtmlWriter<'_>) {
    writer.push_raw("<a");
    writer.push_attr("class", "card");
    writer.push_attr("href", &card.url);
    writer.push_raw(r#"><span class="card__inner">"#);
    if let Some(svg) = card.icon.as_deref().and_then(icon_svg) {
        writer.push_raw(&svg);
    }
    writer.push_raw(r#"<span class="card__body"><span class="card__title">"#);
    writer.push_text(&card.title);
    writer.push_raw("</span>");
    if !card.description.is_empty() {
        writer.push_raw(r#"<span class="card__description">"#);
        writer.push_text(&card.description);
        writer.push_raw("</span>");
    }
    writer.push_raw("</span></span></a>");
}

/// `<ImageFrame src=".." alt=".." caption="..">`.
pub fn render_image_frame(component: &Component, writer: &mut HtmlWriter<'_>) {
    let frame = FramedImage::from_component(component);
    if frame.src.is_none() && component.children.is_empty() {
        writer.warn(invalid(component, BlockError::MissingProp("src")));
    }
    writer.push_raw(r#"<figure class="image-frame"><div class="image-frame__frame">"#);
    match &frame.src {
        Some(src) => {
            writer.push_raw("<img");
            writer.push_attr("src", src);
            writer.push_attr("alt", &frame.alt);
            writer.push_attr("loading", "lazy");
            writer.push_raw(" />");
        }
        None => writer.render_nodes(&component.children),
    }
    writer.push_raw("</div>");
    if let Some(caption) = &frame.caption {
        writer.push_raw(r#"<figcaption class="image-frame__caption">"#);
        writer.push_text(caption);
        writer.push_raw("</figcaption>");
    }
    writer.push_raw("</figure>");
}

/// Diagram component produced by the diagram stage (or written by hand).
///
/// Browser output is picked up by the client-side diagram script; without
/// raster export the source is shown in a scrollable block.
pub fn render_diagram(component: &Component, writer: &mut HtmlWriter<'_>) {
    let diagram = match Diagram::from_component(component) {
        Ok(diagram) => diagram,
        Err(err) => {
            writer.warn(invalid(component, err));
            writer.render_nodes(&component.children);
            return;
        }
    };
    if diagram.source.trim().is_empty() {
        writer.warn(ParseWarning::EmptyDiagram {
            location: component.location,
        });
        writer.push_raw("<pre><code");
        writer.push_attr("class", &format!("language-{DIAGRAM_LANGUAGE}"));
        writer.push_raw("></code></pre>");
        return;
    }

    let id = writer.next_diagram_id();
    let raster = writer.raster();
    let class = if raster.is_supported() {
        "diagram"
    } else {
        "diagram diagram--source"
    };
    writer.push_raw("<figure");
    writer.push_attr("class", class);
    writer.push_attr("id", &id);
    writer.push_attr("data-diagram", DIAGRAM_LANGUAGE);
    writer.push_raw(r#"><div class="diagram__viewport">"#);
    if raster.is_supported() {
        writer.push_raw(r#"<pre class="mermaid">"#);
        writer.push_text(&diagram.source);
        writer.push_raw("</pre>");
    } else {
        writer.push_raw(r#"<pre class="diagram__source"><code"#);
        writer.push_attr("class", &format!("language-{DIAGRAM_LANGUAGE}"));
        writer.push_raw(">");
        writer.push_text(&diagram.source);
        writer.push_raw("</code></pre>");
    }
    writer.push_raw("</div>");
    if let Some(control) = raster.full_size_control(&id) {
        writer.push_raw(&control);
    }
    writer.push_raw("</figure>");
}
