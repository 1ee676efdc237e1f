//! The document tree that every transform stage reads and rewrites.
//!
//! Markdown and component tags are lowered into this shape once; stages then
//! mutate it in place and the HTML writer serializes the final result.

use docsmith_core::{ParseDiagnostics, SourceLocation};
use serde::Serialize;
use std::collections::BTreeMap;

/// A component prop value - either a literal string or an expression.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropValue {
    /// A literal string value (from key="value").
    Literal {
        /// The string as written.
        value: String,
    },
    /// An expression (from key={expression}).
    Expression {
        /// The expression source without braces.
        value: String,
    },
}

impl PropValue {
    /// Creates a literal string prop value.
    pub fn literal(value: impl Into<String>) -> Self {
        PropValue::Literal {
            value: value.into(),
        }
    }

    /// Creates an expression prop value.
    pub fn expression(value: impl Into<String>) -> Self {
        PropValue::Expression {
            value: value.into(),
        }
    }
}

/// A plain HTML element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in a stable order.
    pub attributes: BTreeMap<String, String>,
    /// Child nodes.
    pub children: Vec<DocNode>,
    /// Where the element starts in the source, when known.
    #[serde(skip)]
    pub location: Option<SourceLocation>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder: sets an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder: replaces the children.
    pub fn with_children(mut self, children: Vec<DocNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder: records the source location.
    pub fn at(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Returns an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns true if the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Appends a class token unless it is already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let merged = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", merged);
    }

    /// Heading level for `h1` through `h6`.
    pub fn heading_depth(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Language named by a `language-*` class, as written on fenced code.
    pub fn code_language(&self) -> Option<&str> {
        self.attr("class")?
            .split_whitespace()
            .find_map(|c| c.strip_prefix("language-"))
            .filter(|lang| !lang.is_empty())
    }
}

/// A component invocation (`<Alert variant="warning">`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Component {
    /// Tag name as written.
    pub name: String,
    /// Props in a stable order.
    pub props: BTreeMap<String, PropValue>,
    /// Slot content.
    pub children: Vec<DocNode>,
    /// Where the tag starts in the source, when known.
    #[serde(skip)]
    pub location: Option<SourceLocation>,
}

impl Component {
    /// Creates a component with no props or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: sets a prop.
    pub fn with_prop(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    /// Returns a prop by name.
    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    /// Returns a literal prop, or an expression prop that is a plain string
    /// literal (`title={"Hi"}`).
    pub fn string_prop(&self, name: &str) -> Option<String> {
        match self.prop(name)? {
            PropValue::Literal { value } => Some(value.clone()),
            PropValue::Expression { value } => unquote(value.trim()),
        }
    }
}

fn unquote(expr: &str) -> Option<String> {
    if expr.starts_with('"') {
        return serde_json::from_str::<String>(expr).ok();
    }
    let inner = expr
        .strip_prefix('\'')
        .and_then(|e| e.strip_suffix('\''))
        .or_else(|| expr.strip_prefix('`').and_then(|e| e.strip_suffix('`')))?;
    Some(inner.to_string())
}

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocNode {
    /// An HTML element.
    Element(Element),
    /// A component invocation resolved at render time.
    Component(Component),
    /// Text, escaped on output.
    Text {
        /// Unescaped text.
        value: String,
    },
    /// Markup written verbatim.
    Raw {
        /// HTML fragment.
        html: String,
    },
}

impl DocNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        DocNode::Text {
            value: value.into(),
        }
    }

    /// Creates a verbatim markup node.
    pub fn raw(html: impl Into<String>) -> Self {
        DocNode::Raw { html: html.into() }
    }

    /// Returns the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DocNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the component, if this node is one.
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            DocNode::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Child nodes of elements and components.
    pub fn children(&self) -> &[DocNode] {
        match self {
            DocNode::Element(el) => &el.children,
            DocNode::Component(c) => &c.children,
            _ => &[],
        }
    }

    /// Mutable child list of elements and components.
    pub fn children_mut(&mut self) -> Option<&mut Vec<DocNode>> {
        match self {
            DocNode::Element(el) => Some(&mut el.children),
            DocNode::Component(c) => Some(&mut c.children),
            _ => None,
        }
    }
}

impl From<Element> for DocNode {
    fn from(el: Element) -> Self {
        DocNode::Element(el)
    }
}

impl From<Component> for DocNode {
    fn from(c: Component) -> Self {
        DocNode::Component(c)
    }
}

/// A lowered document plus the warnings gathered so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Top-level nodes.
    pub children: Vec<DocNode>,
    /// Non-fatal warnings from lowering and transform stages.
    pub diagnostics: ParseDiagnostics,
}

impl Document {
    /// Creates a document with no warnings.
    pub fn new(children: Vec<DocNode>) -> Self {
        Self {
            children,
            diagnostics: ParseDiagnostics::new(),
        }
    }

    /// Calls `f` on every element, parents before children.
    pub fn visit_elements_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        visit_elements_mut(&mut self.children, f);
    }

    /// Collects references to every element in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    /// Collects references to every component in document order.
    pub fn components(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        collect_components(&self.children, &mut out);
        out
    }
}

/// Calls `f` on every element under `nodes`, parents before children.
pub fn visit_elements_mut(nodes: &mut [DocNode], f: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let DocNode::Element(el) = node {
            f(el);
        }
        if let Some(children) = node.children_mut() {
            visit_elements_mut(children, f);
        }
    }
}

fn collect_elements<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let DocNode::Element(el) = node {
            out.push(el);
        }
        collect_elements(node.children(), out);
    }
}

fn collect_components<'a>(nodes: &'a [DocNode], out: &mut Vec<&'a Component>) {
    for node in nodes {
        if let DocNode::Component(c) = node {
            out.push(c);
        }
        collect_components(node.children(), out);
    }
}

/// Concatenates every text descendant. Raw markup contributes nothing.
pub fn text_content(nodes: &[DocNode]) -> String {
    let mut buffer = String::new();
    push_text(nodes, &mut buffer);
    buffer
}

fn push_text(nodes: &[DocNode], buffer: &mut String) {
    for node in nodes {
        match node {
            DocNode::Text { value } => buffer.push_str(value),
            DocNode::Raw { .. } => {}
            other => push_text(other.children(), buffer),
        }
    }
}

/// Returns true if any descendant is an `<a>` element.
pub fn contains_link(nodes: &[DocNode]) -> bool {
    nodes.iter().any(|node| match node {
        DocNode::Element(el) if el.tag == "a" => true,
        other => contains_link(other.children()),
    })
}
