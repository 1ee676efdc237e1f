use super::TreeTransform;
use crate::tree::{DocNode, Document, Element, text_content};
use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Class added to `<pre>` once its code has been highlighted.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Prefix for token classes (`hl-keyword`), matching the site stylesheet.
const CLASS_PREFIX: &str = "hl-";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Highlights code with class-based spans.
///
/// Unknown or missing languages fall back to plain text, which still escapes
/// the code and wraps it in the same structure.
pub fn highlight_code(code: &str, lang: Option<&str>) -> Result<String, syntect::Error> {
    let syntax = find_syntax(lang);
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAX_SET,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

fn find_syntax(lang: Option<&str>) -> &'static SyntaxReference {
    lang.and_then(|l| SYNTAX_SET.find_syntax_by_token(l))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

/// Replaces the text of every `pre > code` block with highlighted markup.
///
/// Diagram blocks must already have been converted; whatever is still a code
/// block when this stage runs is highlighted, diagram language or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlight;

impl TreeTransform for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn transform(&self, document: &mut Document) {
        document.visit_elements_mut(&mut |pre| {
            if pre.tag != "pre" || pre.has_class(HIGHLIGHT_CLASS) {
                return;
            }
            let [DocNode::Element(code)] = pre.children.as_mut_slice() else {
                return;
            };
            if code.tag != "code" {
                return;
            }
            let Some(html) = highlight_element(code) else {
                return;
            };
            let lang = code.code_language().map(str::to_string);
            code.children = vec![DocNode::raw(html)];
            pre.add_class(HIGHLIGHT_CLASS);
            if let Some(lang) = lang {
                pre.set_attr("data-language", lang);
            }
        });
    }
}

fn highlight_element(code: &Element) -> Option<String> {
    let source = text_content(&code.children);
    match highlight_code(&source, code.code_language()) {
        Ok(html) => Some(html),
        Err(err) => {
            log::warn!("Failed to highlight code block: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_block(lang: Option<&str>, text: &str) -> Document {
        let mut code = Element::new("code").with_children(vec![DocNode::text(text)]);
        if let Some(lang) = lang {
            code.set_attr("class", format!("language-{lang}"));
        }
        Document::new(vec![Element::new("pre").with_children(vec![code.into()]).into()])
    }

    #[test]
    fn highlights_known_language() {
        let mut doc = code_block(Some("rust"), "fn main() {}\n");
        Highlight.transform(&mut doc);
        let pre = doc.elements()[0];
        assert!(pre.has_class(HIGHLIGHT_CLASS));
        assert_eq!(pre.attr("data-language"), Some("rust"));
        let code = pre.children[0].as_element().unwrap();
        let [DocNode::Raw { html }] = code.children.as_slice() else {
            panic!("expected highlighted markup");
        };
        assert!(html.contains("hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_language_escapes_as_plain_text() {
        let html = highlight_code("<b>&</b>", Some("no-such-lang")).unwrap();
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn missing_language_still_highlighted() {
        let mut doc = code_block(None, "plain");
        Highlight.transform(&mut doc);
        let pre = doc.elements()[0];
        assert!(pre.has_class(HIGHLIGHT_CLASS));
        assert_eq!(pre.attr("data-language"), None);
    }

    #[test]
    fn already_highlighted_blocks_untouched() {
        let mut doc = code_block(Some("rust"), "let x = 1;");
        Highlight.transform(&mut doc);
        let once = doc.clone();
        Highlight.transform(&mut doc);
        assert_eq!(doc, once);
    }
}
