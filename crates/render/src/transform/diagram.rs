use super::TreeTransform;
use crate::tree::{Component, DocNode, Document, Element, PropValue, text_content};
use docsmith_core::ParseWarning;

/// Fence language that marks a diagram block.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";
/// Component that renders a diagram.
pub const DIAGRAM_COMPONENT: &str = "Mermaid";
/// Prop carrying the diagram source.
pub const DIAGRAM_SOURCE_PROP: &str = "chart";

/// Replaces every ```` ```mermaid ```` block with a diagram component whose
/// `chart` prop is the exact block text.
///
/// Must run before highlighting: once a block is highlighted its text is
/// gone and it no longer looks like a diagram.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramBlocks;

impl TreeTransform for DiagramBlocks {
    fn name(&self) -> &'static str {
        "diagram-blocks"
    }

    fn transform(&self, document: &mut Document) {
        let mut warnings = Vec::new();
        replace_diagrams(&mut document.children, &mut warnings);
        for warning in warnings {
            document.diagnostics.add_warning(warning);
        }
    }
}

fn replace_diagrams(nodes: &mut [DocNode], warnings: &mut Vec<ParseWarning>) {
    for node in nodes.iter_mut() {
        if let DocNode::Element(pre) = node
            && let Some(source) = diagram_source(pre)
        {
            if source.trim().is_empty() {
                log::warn!("Empty diagram block kept as code");
                warnings.push(ParseWarning::EmptyDiagram {
                    location: pre.location,
                });
                continue;
            }
            let diagram = Component {
                name: DIAGRAM_COMPONENT.to_string(),
                location: pre.location,
                ..Component::default()
            }
            .with_prop(DIAGRAM_SOURCE_PROP, PropValue::literal(source));
            *node = diagram.into();
            continue;
        }
        if let Some(children) = node.children_mut() {
            replace_diagrams(children, warnings);
        }
    }
}

/// Source text of a `pre > code.language-mermaid` block.
fn diagram_source(pre: &Element) -> Option<String> {
    if pre.tag != "pre" {
        return None;
    }
    let [DocNode::Element(code)] = pre.children.as_slice() else {
        return None;
    };
    if code.tag != "code" || code.code_language() != Some(DIAGRAM_LANGUAGE) {
        return None;
    }
    Some(text_content(&code.children))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_block(lang: &str, text: &str) -> DocNode {
        let code = Element::new("code")
            .with_attr("class", format!("language-{lang}"))
            .with_children(vec![DocNode::text(text)]);
        Element::new("pre").with_children(vec![code.into()]).into()
    }

    #[test]
    fn replaces_diagram_block_with_component() {
        let mut doc = Document::new(vec![code_block("mermaid", "graph TD\nA-->B")]);
        DiagramBlocks.transform(&mut doc);
        let diagram = doc.children[0].as_component().unwrap();
        assert_eq!(diagram.name, DIAGRAM_COMPONENT);
        assert_eq!(
            diagram.prop(DIAGRAM_SOURCE_PROP),
            Some(&PropValue::literal("graph TD\nA-->B"))
        );
        assert!(doc.elements().is_empty());
    }

    #[test]
    fn empty_diagram_stays_code_with_warning() {
        let mut doc = Document::new(vec![code_block("mermaid", "  \n")]);
        DiagramBlocks.transform(&mut doc);
        assert_eq!(doc.children[0].as_element().unwrap().tag, "pre");
        assert_eq!(
            doc.diagnostics.warnings,
            vec![ParseWarning::EmptyDiagram { location: None }]
        );
    }

    #[test]
    fn other_languages_untouched() {
        let mut doc = Document::new(vec![code_block("rust", "fn main() {}")]);
        DiagramBlocks.transform(&mut doc);
        assert!(doc.components().is_empty());
    }

    #[test]
    fn finds_diagrams_inside_components() {
        let alert = Component::new("Alert");
        let alert = Component {
            children: vec![code_block("mermaid", "graph LR\nX-->Y")],
            ..alert
        };
        let mut doc = Document::new(vec![alert.into()]);
        DiagramBlocks.transform(&mut doc);
        assert_eq!(doc.components()[1].name, DIAGRAM_COMPONENT);
    }
}
