use super::TreeTransform;
use crate::tree::{Document, Element, contains_link};

/// Class on the injected heading self-link.
pub const ANCHOR_CLASS: &str = "heading-anchor";

/// Wraps the content of each heading that has an `id` in `<a href="#id">`.
///
/// Headings without an id are left alone, so this stage only has an effect
/// after [`super::HeadingSlugs`]. Headings that already contain a link are
/// skipped to avoid nesting anchors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutolinkHeadings;

impl TreeTransform for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn transform(&self, document: &mut Document) {
        document.visit_elements_mut(&mut |el| {
            if el.heading_depth().is_none() || contains_link(&el.children) {
                return;
            }
            let Some(id) = el.attr("id").map(str::to_string) else {
                return;
            };
            let children = std::mem::take(&mut el.children);
            let anchor = Element::new("a")
                .with_attr("href", format!("#{id}"))
                .with_attr("class", ANCHOR_CLASS)
                .with_children(children);
            el.children.push(anchor.into());
        });
    }
}
