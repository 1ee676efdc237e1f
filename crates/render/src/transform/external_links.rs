use super::TreeTransform;
use crate::tree::Document;
use url::Url;

const REL_TOKENS: [&str; 2] = ["noopener", "noreferrer"];

/// Marks links to other hosts with `target="_blank"` and
/// `rel="noopener noreferrer"`, merged into any existing `rel`.
#[derive(Debug, Clone, Default)]
pub struct ExternalLinks {
    site_host: Option<String>,
}

impl ExternalLinks {
    /// Creates the stage. Links to `site_host` are treated as internal.
    pub fn new(site_host: Option<String>) -> Self {
        Self {
            site_host: site_host.map(|h| h.to_ascii_lowercase()),
        }
    }

    /// Returns true if `href` leaves the site.
    pub fn is_external(&self, href: &str) -> bool {
        let href = href.trim();
        let parsed = if href.starts_with("//") {
            Url::parse(&format!("https:{href}"))
        } else {
            Url::parse(href)
        };
        let Ok(url) = parsed else {
            // Relative paths and fragments do not parse without a base.
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        match (url.host_str(), self.site_host.as_deref()) {
            (None, _) => false,
            (Some(host), Some(site)) => !host.eq_ignore_ascii_case(site),
            (Some(_), None) => true,
        }
    }
}

impl TreeTransform for ExternalLinks {
    fn name(&self) -> &'static str {
        "external-links"
    }

    fn transform(&self, document: &mut Document) {
        document.visit_elements_mut(&mut |el| {
            if el.tag != "a" {
                return;
            }
            let Some(href) = el.attr("href") else {
                return;
            };
            if !self.is_external(href) {
                return;
            }
            el.set_attr("target", "_blank");
            let mut rel: Vec<String> = el
                .attr("rel")
                .map(|r| r.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            for token in REL_TOKENS {
                if !rel.iter().any(|t| t.eq_ignore_ascii_case(token)) {
                    rel.push(token.to_string());
                }
            }
            el.set_attr("rel", rel.join(" "));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn link(href: &str) -> Element {
        Element::new("a").with_attr("href", href)
    }

    fn run(stage: &ExternalLinks, el: Element) -> Element {
        let mut doc = Document::new(vec![el.into()]);
        stage.transform(&mut doc);
        doc.elements()[0].clone()
    }

    #[test]
    fn external_link_opens_in_new_window() {
        let el = run(&ExternalLinks::default(), link("https://example.com"));
        assert_eq!(el.attr("target"), Some("_blank"));
        assert_eq!(el.attr("rel"), Some("noopener noreferrer"));
    }

    #[test]
    fn merges_existing_rel() {
        let el = run(
            &ExternalLinks::default(),
            link("//cdn.example.com/x").with_attr("rel", "nofollow noopener"),
        );
        assert_eq!(el.attr("rel"), Some("nofollow noopener noreferrer"));
    }

    #[test]
    fn leaves_internal_links() {
        let stage = ExternalLinks::new(Some("Docs.Example.com".into()));
        for href in ["/docs/intro", "#setup", "https://docs.example.com/x", "mailto:a@b.c"] {
            let el = run(&stage, link(href));
            assert_eq!(el.attr("target"), None, "{href}");
            assert_eq!(el.attr("rel"), None, "{href}");
        }
    }
}
