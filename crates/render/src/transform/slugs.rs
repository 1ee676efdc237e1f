use super::TreeTransform;
use crate::tree::{Document, text_content};
use docsmith_core::Slugger;

/// Gives every heading without an `id` one derived from its text.
///
/// Ids written by hand (`<h2 id="x">`) are kept but still reserved in the
/// slugger so later duplicates are suffixed past them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSlugs {
    dedupe: bool,
}

impl HeadingSlugs {
    /// Creates the stage; `dedupe` appends `-1`, `-2` to repeated ids.
    pub fn new(dedupe: bool) -> Self {
        Self { dedupe }
    }
}

impl TreeTransform for HeadingSlugs {
    fn name(&self) -> &'static str {
        "heading-slugs"
    }

    fn transform(&self, document: &mut Document) {
        let mut slugger = Slugger::with_dedupe(self.dedupe);
        document.visit_elements_mut(&mut |el| {
            if el.heading_depth().is_none() {
                return;
            }
            match el.attr("id") {
                Some(existing) => {
                    slugger.next_id(existing);
                }
                None => {
                    let id = slugger.next_id(text_content(&el.children).trim());
                    el.set_attr("id", id);
                }
            }
        });
    }
}
