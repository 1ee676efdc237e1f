//! Table-of-contents extraction.
//!
//! Two extractors share one id rule ([`crate::slug::anchor_id`]):
//!
//! - [`extract`] scans raw Markdown line by line. It is cheap enough to run on
//!   every keystroke and never fails, which is what the live editor needs.
//! - [`extract_from_mdast`] walks a parsed tree and sees exactly the heading
//!   text the parser produced.
//!
//! The rendered anchors come from the render pipeline's slug stage, which uses
//! the same [`Slugger`]; with matching de-duplication settings all three agree
//! on duplicate headings. Inline HTML or JSX in a heading is the exception:
//! [`extract`] slugs the tag names as text, the parsed tree does not.

use crate::code_fence::FenceTracker;
use crate::slug::Slugger;
use markdown::mdast::Node;
use serde::{Deserialize, Serialize};

/// A single table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display text with entities decoded and Markdown escapes removed.
    pub title: String,
    /// Anchor id derived from the title.
    pub id: String,
    /// Heading level, 1 through 6.
    pub depth: u8,
}

/// Extracts ATX headings from a Markdown body without de-duplicating ids.
pub fn extract(body: &str) -> Vec<TocEntry> {
    extract_with(body, &mut Slugger::new())
}

/// Extracts ATX headings from a Markdown body using the given slugger.
pub fn extract_with(body: &str, slugger: &mut Slugger) -> Vec<TocEntry> {
    let mut fences = FenceTracker::new();
    let mut entries = Vec::new();

    for line in body.lines() {
        if fences.observe(line) {
            continue;
        }
        let Some((depth, raw)) = parse_atx_heading(line) else {
            continue;
        };
        let title = clean_heading_text(raw);
        let id = slugger.next_id(&title);
        entries.push(TocEntry { title, id, depth });
    }

    entries
}

/// Extracts headings from a parsed mdast tree.
pub fn extract_from_mdast(root: &Node, slugger: &mut Slugger) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    collect_mdast_headings(root, slugger, &mut entries);
    entries
}

fn collect_mdast_headings(node: &Node, slugger: &mut Slugger, out: &mut Vec<TocEntry>) {
    if let Node::Heading(heading) = node {
        let title = mdast_text(&heading.children);
        let id = slugger.next_id(&title);
        out.push(TocEntry {
            title,
            id,
            depth: heading.depth,
        });
        return;
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_mdast_headings(child, slugger, out);
        }
    }
}

/// Concatenates the visible text of inline mdast nodes.
pub fn mdast_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        push_mdast_text(node, &mut text);
    }
    text.trim().to_string()
}

fn push_mdast_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Strong(n) => n.children.iter().for_each(|c| push_mdast_text(c, buffer)),
        Node::Emphasis(n) => n.children.iter().for_each(|c| push_mdast_text(c, buffer)),
        Node::Link(n) => n.children.iter().for_each(|c| push_mdast_text(c, buffer)),
        Node::Delete(n) => n.children.iter().for_each(|c| push_mdast_text(c, buffer)),
        Node::MdxJsxTextElement(n) => n.children.iter().for_each(|c| push_mdast_text(c, buffer)),
        _ => {}
    }
}

/// Recognises an ATX heading line, returning its depth and raw text.
fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let indent = line.bytes().take_while(|b| *b == b' ').count();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let depth = rest.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&depth) {
        return None;
    }
    let after = &rest[depth..];
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    Some((depth as u8, strip_closing_sequence(after.trim())))
}

/// Removes an optional closing `#` run (`## Title ##`).
fn strip_closing_sequence(text: &str) -> &str {
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.len() == text.len() {
        return text;
    }
    if without_hashes.is_empty() {
        return "";
    }
    if without_hashes.ends_with([' ', '\t']) {
        without_hashes.trim_end()
    } else {
        text
    }
}

/// Cleans raw heading source into display text.
///
/// Strips `<a ...>`/`</a>` wrappers, decodes HTML character references, and
/// removes backslash escapes in front of Markdown punctuation.
pub fn clean_heading_text(raw: &str) -> String {
    let unwrapped = strip_anchor_tags(raw);
    let decoded = html_escape::decode_html_entities(&unwrapped);
    unescape_markdown(&decoded).trim().to_string()
}

fn strip_anchor_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match anchor_tag_len(candidate) {
            Some(len) => rest = &candidate[len..],
            None => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of an `<a ...>` or `</a>` tag at the start of `text`.
fn anchor_tag_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let name_start = if bytes.get(1) == Some(&b'/') { 2 } else { 1 };
    if !matches!(bytes.get(name_start), Some(b'a' | b'A')) {
        return None;
    }
    match bytes.get(name_start + 1) {
        Some(b'>') => Some(name_start + 2),
        Some(b) if b.is_ascii_whitespace() && name_start == 1 => {
            text.find('>').map(|end| end + 1)
        }
        _ => None,
    }
}

fn unescape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '#' | '*' | '_' | '`' | '[' | ']' | '(' | ')')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}
