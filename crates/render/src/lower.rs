//! Lowering from markdown-rs mdast into the document tree.
//!
//! Lowering is purely structural: headings get no ids and code is not
//! highlighted here. Those are transform stages.
//!
//! Unless raw HTML is allowed, lowercase JSX tags get the same treatment as
//! raw HTML: scripting elements are unwrapped, and event handler attributes
//! and `javascript:` URLs are dropped.

use crate::tree::{Component, DocNode, Document, Element, PropValue};
use docsmith_core::{SourceLocation, anchor_id};
use markdown::mdast::{self, AlignKind, AttributeContent, AttributeValue, Node};
use markdown::unist::Position;
use std::collections::{BTreeMap, HashMap};

/// Options that change how nodes are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerOptions {
    /// Keep raw HTML verbatim instead of escaping it as text.
    pub allow_raw_html: bool,
    /// Add `loading="lazy"` to images.
    pub lazy_images: bool,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            lazy_images: true,
        }
    }
}

const SCRIPTING_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed"];

fn is_scripting_tag(tag: &str) -> bool {
    SCRIPTING_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Event handlers, and URL attributes carrying a `javascript:` target.
fn is_unsafe_attr(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") {
        return true;
    }
    matches!(name.as_str(), "href" | "src" | "action" | "formaction")
        && value
            .trim_start()
            .get(..11)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

/// Lowers a parsed mdast root into a [`Document`].
pub fn lower(root: &Node, options: LowerOptions) -> Document {
    let mut lowerer = Lowerer::new(options);
    lowerer.collect_definitions(root);

    let mut children = Vec::new();
    lowerer.lower_node(root, &mut children);
    if let Some(section) = lowerer.footnote_section() {
        children.push(section);
    }
    Document::new(children)
}

struct Lowerer {
    options: LowerOptions,
    definitions: HashMap<String, (String, Option<String>)>,
    footnotes: HashMap<String, Vec<DocNode>>,
    footnote_order: Vec<String>,
}

fn location(position: Option<&Position>) -> Option<SourceLocation> {
    position.map(|p| SourceLocation::new(p.start.line, p.start.column))
}

impl Lowerer {
    fn new(options: LowerOptions) -> Self {
        Self {
            options,
            definitions: HashMap::new(),
            footnotes: HashMap::new(),
            footnote_order: Vec::new(),
        }
    }

    /// Link reference definitions may appear after their first use.
    fn collect_definitions(&mut self, node: &Node) {
        if let Node::Definition(def) = node {
            self.definitions
                .entry(def.identifier.clone())
                .or_insert_with(|| (def.url.clone(), def.title.clone()));
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    fn lower_children(&mut self, nodes: &[Node]) -> Vec<DocNode> {
        let mut out = Vec::new();
        for node in nodes {
            self.lower_node(node, &mut out);
        }
        out
    }

    fn element(&mut self, tag: &str, children: &[Node], position: Option<&Position>) -> DocNode {
        let children = self.lower_children(children);
        Element::new(tag)
            .with_children(children)
            .at(location(position))
            .into()
    }

    fn lower_node(&mut self, node: &Node, out: &mut Vec<DocNode>) {
        match node {
            Node::Root(root) => {
                for child in &root.children {
                    self.lower_node(child, out);
                }
            }
            Node::Text(text) => out.push(DocNode::text(&text.value)),
            Node::Paragraph(p) => out.push(self.element("p", &p.children, p.position.as_ref())),
            Node::Heading(h) => {
                let tag = format!("h{}", h.depth);
                out.push(self.element(&tag, &h.children, h.position.as_ref()));
            }
            Node::Strong(n) => out.push(self.element("strong", &n.children, None)),
            Node::Emphasis(n) => out.push(self.element("em", &n.children, None)),
            Node::Delete(n) => out.push(self.element("del", &n.children, None)),
            Node::Blockquote(n) => {
                out.push(self.element("blockquote", &n.children, n.position.as_ref()))
            }
            Node::InlineCode(code) => out.push(
                Element::new("code")
                    .with_children(vec![DocNode::text(&code.value)])
                    .into(),
            ),
            Node::Break(_) => out.push(Element::new("br").into()),
            Node::ThematicBreak(_) => out.push(Element::new("hr").into()),
            Node::Link(link) => out.push(self.lower_link(
                &link.url,
                link.title.as_deref(),
                &link.children,
            )),
            Node::LinkReference(link) => match self.definitions.get(&link.identifier).cloned() {
                Some((url, title)) => {
                    out.push(self.lower_link(&url, title.as_deref(), &link.children))
                }
                None => out.extend(self.lower_children(&link.children)),
            },
            Node::Image(img) => out.push(self.lower_image(&img.url, &img.alt, img.title.as_deref())),
            Node::ImageReference(img) => match self.definitions.get(&img.identifier).cloned() {
                Some((url, title)) => out.push(self.lower_image(&url, &img.alt, title.as_deref())),
                None => out.push(DocNode::text(&img.alt)),
            },
            Node::Code(code) => out.push(lower_code(code)),
            Node::List(list) => out.push(self.lower_list(list)),
            Node::ListItem(item) => out.push(self.lower_list_item(item, true)),
            Node::Table(table) => out.push(self.lower_table(table)),
            Node::Html(html) => {
                if self.options.allow_raw_html {
                    out.push(DocNode::raw(&html.value));
                } else {
                    log::debug!(
                        "Raw HTML in markdown will be escaped for security: {}",
                        html.value
                    );
                    out.push(DocNode::text(&html.value));
                }
            }
            Node::MdxJsxFlowElement(elem) => self.lower_jsx(
                elem.name.as_deref(),
                &elem.attributes,
                &elem.children,
                elem.position.as_ref(),
                out,
            ),
            Node::MdxJsxTextElement(elem) => self.lower_jsx(
                elem.name.as_deref(),
                &elem.attributes,
                &elem.children,
                elem.position.as_ref(),
                out,
            ),
            Node::FootnoteReference(fnref) => out.push(self.lower_footnote_reference(fnref)),
            Node::FootnoteDefinition(def) => {
                let children = self.lower_children(&def.children);
                self.footnotes.insert(def.identifier.clone(), children);
            }
            Node::Definition(_) | Node::Yaml(_) | Node::Toml(_) => {}
            _ => {
                log::warn!("Unhandled markdown node type: {:?}", node);
            }
        }
    }

    fn lower_link(&mut self, url: &str, title: Option<&str>, children: &[Node]) -> DocNode {
        let mut el = Element::new("a").with_attr("href", url);
        if let Some(title) = title {
            el.set_attr("title", title);
        }
        el.children = self.lower_children(children);
        el.into()
    }

    fn lower_image(&self, url: &str, alt: &str, title: Option<&str>) -> DocNode {
        let mut el = Element::new("img").with_attr("src", url).with_attr("alt", alt);
        if let Some(title) = title {
            el.set_attr("title", title);
        }
        if self.options.lazy_images {
            el.set_attr("loading", "lazy");
        }
        el.into()
    }

    fn lower_list(&mut self, list: &mdast::List) -> DocNode {
        let tag = if list.ordered { "ol" } else { "ul" };
        let mut el = Element::new(tag).at(location(list.position.as_ref()));
        if list.ordered
            && let Some(start) = list.start
            && start != 1
        {
            el.set_attr("start", start.to_string());
        }
        let tight = !list.spread;
        let mut has_tasks = false;
        for child in &list.children {
            if let Node::ListItem(item) = child {
                has_tasks |= item.checked.is_some();
                el.children.push(self.lower_list_item(item, tight));
            }
        }
        if has_tasks {
            el.add_class("contains-task-list");
        }
        el.into()
    }

    /// In tight lists the paragraph wrappers of items are dropped.
    fn lower_list_item(&mut self, item: &mdast::ListItem, tight: bool) -> DocNode {
        let mut li = Element::new("li");
        if let Some(checked) = item.checked {
            li.add_class("task-list-item");
            let mut input = Element::new("input")
                .with_attr("type", "checkbox")
                .with_attr("disabled", "");
            if checked {
                input.set_attr("checked", "");
            }
            li.children.push(input.into());
        }
        for child in &item.children {
            match child {
                Node::Paragraph(p) if tight && !item.spread => {
                    let inline = self.lower_children(&p.children);
                    li.children.extend(inline);
                }
                other => self.lower_node(other, &mut li.children),
            }
        }
        li.into()
    }

    fn lower_table(&mut self, table: &mdast::Table) -> DocNode {
        let mut rows = table.children.iter().filter_map(|row| match row {
            Node::TableRow(r) => Some(r),
            _ => None,
        });

        let mut el = Element::new("table").at(location(table.position.as_ref()));
        if let Some(head) = rows.next() {
            let tr = self.lower_table_row(head, "th", &table.align);
            el.children
                .push(Element::new("thead").with_children(vec![tr]).into());
        }
        let body: Vec<DocNode> = rows
            .map(|row| self.lower_table_row(row, "td", &table.align))
            .collect();
        if !body.is_empty() {
            el.children
                .push(Element::new("tbody").with_children(body).into());
        }
        el.into()
    }

    fn lower_table_row(&mut self, row: &mdast::TableRow, tag: &str, aligns: &[AlignKind]) -> DocNode {
        let mut tr = Element::new("tr");
        for (i, cell) in row.children.iter().enumerate() {
            let Node::TableCell(c) = cell else {
                continue;
            };
            let mut cell_el = Element::new(tag);
            match aligns.get(i) {
                Some(AlignKind::Left) => cell_el.set_attr("align", "left"),
                Some(AlignKind::Right) => cell_el.set_attr("align", "right"),
                Some(AlignKind::Center) => cell_el.set_attr("align", "center"),
                Some(AlignKind::None) | None => {}
            }
            cell_el.children = self.lower_children(&c.children);
            tr.children.push(cell_el.into());
        }
        tr.into()
    }

    /// Capitalized tags become components; lowercase tags stay HTML elements.
    fn lower_jsx(
        &mut self,
        name: Option<&str>,
        attributes: &[AttributeContent],
        children: &[Node],
        position: Option<&Position>,
        out: &mut Vec<DocNode>,
    ) {
        // <> ... </> has no name, just lower children
        let Some(tag_name) = name else {
            for child in children {
                self.lower_node(child, out);
            }
            return;
        };

        let mut props = BTreeMap::new();
        for attr in attributes {
            match attr {
                AttributeContent::Property(prop) => {
                    let value = match &prop.value {
                        Some(AttributeValue::Literal(s)) => PropValue::literal(s.clone()),
                        Some(AttributeValue::Expression(expr)) => {
                            PropValue::expression(expr.value.clone())
                        }
                        None => PropValue::literal(String::new()),
                    };
                    props.insert(prop.name.clone(), value);
                }
                AttributeContent::Expression(_) => {
                    log::debug!("Spread attributes on <{tag_name}> are ignored");
                }
            }
        }

        let children = self.lower_children(children);
        let at = location(position);

        if tag_name.starts_with(|c: char| c.is_ascii_uppercase()) {
            out.push(
                Component {
                    name: tag_name.to_string(),
                    props,
                    children,
                    location: at,
                }
                .into(),
            );
            return;
        }

        let trusted = self.options.allow_raw_html;
        if !trusted && is_scripting_tag(tag_name) {
            log::debug!("<{tag_name}> in markdown is dropped for security; keeping its children");
            out.extend(children);
            return;
        }

        let mut el = Element::new(tag_name).with_children(children).at(at);
        for (key, value) in props {
            match value {
                PropValue::Literal { value } => {
                    if !trusted && is_unsafe_attr(&key, &value) {
                        log::debug!("Attribute {key} on <{tag_name}> is dropped for security");
                        continue;
                    }
                    el.set_attr(key, value);
                }
                PropValue::Expression { .. } => {
                    log::debug!("Expression attribute {key} on <{tag_name}> is ignored");
                }
            }
        }
        out.push(el.into());
    }

    fn lower_footnote_reference(&mut self, fnref: &mdast::FootnoteReference) -> DocNode {
        let ordinal = match self.footnote_order.iter().position(|id| id == &fnref.identifier) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(fnref.identifier.clone());
                self.footnote_order.len()
            }
        };
        let safe_id = anchor_id(&fnref.identifier);
        let link = Element::new("a")
            .with_attr("href", format!("#fn-{safe_id}"))
            .with_attr("id", format!("fnref-{safe_id}"))
            .with_attr("data-footnote-ref", "")
            .with_children(vec![DocNode::text(ordinal.to_string())]);
        Element::new("sup").with_children(vec![link.into()]).into()
    }

    /// Definitions are listed in first-reference order; unreferenced ones are dropped.
    fn footnote_section(&mut self) -> Option<DocNode> {
        if self.footnote_order.is_empty() {
            return None;
        }
        let mut items = Vec::new();
        for id in std::mem::take(&mut self.footnote_order) {
            let Some(mut children) = self.footnotes.remove(&id) else {
                continue;
            };
            let safe_id = anchor_id(&id);
            let backref = Element::new("a")
                .with_attr("href", format!("#fnref-{safe_id}"))
                .with_attr("data-footnote-backref", "")
                .with_children(vec![DocNode::text("\u{21a9}")]);
            children.push(backref.into());
            items.push(
                Element::new("li")
                    .with_attr("id", format!("fn-{safe_id}"))
                    .with_children(children)
                    .into(),
            );
        }
        if items.is_empty() {
            return None;
        }
        let list = Element::new("ol").with_children(items);
        Some(
            Element::new("section")
                .with_attr("class", "footnotes")
                .with_attr("data-footnotes", "")
                .with_children(vec![list.into()])
                .into(),
        )
    }
}

/// Fenced code becomes `<pre><code class="language-x">`, the shape the
/// diagram and highlight stages look for.
fn lower_code(code: &mdast::Code) -> DocNode {
    let mut inner = Element::new("code").with_children(vec![DocNode::text(&code.value)]);
    if let Some(lang) = code.lang.as_deref().filter(|l| !l.is_empty()) {
        inner.set_attr("class", format!("language-{lang}"));
    }
    if let Some(meta) = code.meta.as_deref() {
        inner.set_attr("data-meta", meta);
    }
    Element::new("pre")
        .with_children(vec![inner.into()])
        .at(location(code.position.as_ref()))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_core::{ParseOptions, parse_mdast};

    fn lower_str(input: &str) -> Document {
        let tree = parse_mdast(input, &ParseOptions::docs()).unwrap();
        lower(&tree, LowerOptions::default())
    }

    fn first_element(doc: &Document) -> &Element {
        doc.children[0].as_element().unwrap()
    }

    #[test]
    fn headings_have_no_ids_before_transforms() {
        let doc = lower_str("## Hello");
        let h = first_element(&doc);
        assert_eq!(h.tag, "h2");
        assert_eq!(h.attr("id"), None);
        assert_eq!(h.location, Some(SourceLocation::new(1, 1)));
    }

    #[test]
    fn fenced_code_keeps_language_and_source() {
        let doc = lower_str("```rust title=x\nfn main() {}\n```");
        let pre = first_element(&doc);
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.code_language(), Some("rust"));
        assert_eq!(code.attr("data-meta"), Some("title=x"));
        assert_eq!(code.children, vec![DocNode::text("fn main() {}")]);
    }

    #[test]
    fn tight_list_unwraps_paragraphs() {
        let doc = lower_str("- one\n- two");
        let ul = first_element(&doc);
        let li = ul.children[0].as_element().unwrap();
        assert_eq!(li.children, vec![DocNode::text("one")]);
    }

    #[test]
    fn task_list_items_get_checkbox() {
        let doc = lower_str("- [x] done\n- [ ] todo");
        let ul = first_element(&doc);
        assert!(ul.has_class("contains-task-list"));
        let li = ul.children[0].as_element().unwrap();
        let input = li.children[0].as_element().unwrap();
        assert_eq!(input.attr("checked"), Some(""));
    }

    #[test]
    fn uppercase_jsx_becomes_component() {
        let doc = lower_str("<Alert variant=\"warning\">\n\nCareful\n\n</Alert>");
        let alert = doc.children[0].as_component().unwrap();
        assert_eq!(alert.name, "Alert");
        assert_eq!(alert.prop("variant"), Some(&PropValue::literal("warning")));
        assert_eq!(alert.children.len(), 1);
    }

    #[test]
    fn lowercase_jsx_stays_element() {
        let doc = lower_str("<div className=\"note\" data-x={1}>\n\nHi\n\n</div>");
        let div = first_element(&doc);
        assert_eq!(div.tag, "div");
        assert_eq!(div.attr("className"), Some("note"));
        assert_eq!(div.attr("data-x"), None);
    }

    #[test]
    fn lowercase_jsx_is_sanitized_unless_raw_html_allowed() {
        let source = "<script>\n\nalert(1)\n\n</script>\n\n\
                      <a href=\" JavaScript:alert(1)\" onClick=\"x()\" title=\"t\">go</a>";
        let doc = lower_str(source);
        assert_eq!(first_element(&doc).tag, "p");
        assert_eq!(crate::tree::text_content(&doc.children[0..1]), "alert(1)");
        let a = doc.elements().into_iter().find(|el| el.tag == "a").unwrap();
        assert_eq!(a.attr("href"), None);
        assert_eq!(a.attr("onClick"), None);
        assert_eq!(a.attr("title"), Some("t"));

        let tree = parse_mdast(source, &ParseOptions::docs()).unwrap();
        let trusted = lower(
            &tree,
            LowerOptions {
                allow_raw_html: true,
                ..LowerOptions::default()
            },
        );
        assert_eq!(first_element(&trusted).tag, "script");
        let a = trusted.elements().into_iter().find(|el| el.tag == "a").unwrap();
        assert_eq!(a.attr("onClick"), Some("x()"));
    }

    #[test]
    fn fragments_are_flattened() {
        let doc = lower_str("<>\n\nInside\n\n</>");
        assert_eq!(first_element(&doc).tag, "p");
    }

    #[test]
    fn reference_links_resolve_late_definitions() {
        let doc = lower_str("[docs][d]\n\n[d]: https://example.com \"Docs\"");
        let p = first_element(&doc);
        let a = p.children[0].as_element().unwrap();
        assert_eq!(a.attr("href"), Some("https://example.com"));
        assert_eq!(a.attr("title"), Some("Docs"));
    }

    #[test]
    fn footnotes_collected_at_end() {
        let doc = lower_str("Text[^n].\n\n[^n]: Note body.");
        let section = doc.children.last().unwrap().as_element().unwrap();
        assert_eq!(section.tag, "section");
        assert!(section.has_class("footnotes"));
    }

    #[test]
    fn table_alignment() {
        let doc = lower_str("| a | b |\n| :-: | - |\n| 1 | 2 |");
        let table = first_element(&doc);
        let thead = table.children[0].as_element().unwrap();
        let tr = thead.children[0].as_element().unwrap();
        let th = tr.children[0].as_element().unwrap();
        assert_eq!(th.attr("align"), Some("center"));
        assert_eq!(table.children.len(), 2);
    }

    #[test]
    fn images_lazy_by_default() {
        let doc = lower_str("![alt](/img/a.png)");
        let p = first_element(&doc);
        let img = p.children[0].as_element().unwrap();
        assert_eq!(img.attr("loading"), Some("lazy"));
        assert_eq!(img.attr("alt"), Some("alt"));
    }
}
