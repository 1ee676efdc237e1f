//! Loading documents and creating new pages.

use crate::error::{EditorError, StoreError, ValidationError};
use crate::navigation::{InsertOutcome, NavigationNode, NavigationTree, slugify};
use crate::path::{CONTENT_EXTENSION, DocPath};
use crate::store::{ContentStore, NavigationStore, persist_navigation};
use docsmith_core::{Frontmatter, SourceDocument, TocEntry, extract};
use serde_json::Value as JsonValue;

/// A document read from the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Where it was read from.
    pub path: DocPath,
    /// Frontmatter and body.
    pub document: SourceDocument,
    /// Headings of the body.
    pub toc: Vec<TocEntry>,
}

/// Reads `path`, splits its frontmatter and derives the TOC.
///
/// A missing file is [`EditorError::NotFound`]; a malformed frontmatter block
/// is [`EditorError::Parse`].
pub async fn load_document(
    store: &dyn ContentStore,
    path: &DocPath,
) -> Result<LoadedDocument, EditorError> {
    let raw = store.read(path).await?;
    let document = SourceDocument::parse(&raw)?;
    let toc = extract(&document.body);
    log::debug!("Loaded document {path} ({} headings)", toc.len());
    Ok(LoadedDocument {
        path: path.clone(),
        document,
        toc,
    })
}

/// Request to create a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    /// Page title; also the navigation display name.
    pub title: String,
    /// Slug path of the parent group, as produced by
    /// [`NavigationTree::parent_options`]. Empty for the root.
    pub parent_path: String,
}

/// Result of [`create_page`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPage {
    /// Document path of the new page.
    pub path: DocPath,
    /// Public URL of the new page.
    pub href: String,
    /// Where the navigation link went.
    pub outcome: InsertOutcome,
    /// The navigation tree as persisted.
    pub navigation: NavigationTree,
}

/// Raw contents of a freshly created page.
pub fn page_template(title: &str) -> Result<String, EditorError> {
    let mut frontmatter = Frontmatter::new();
    frontmatter.insert("title".to_string(), JsonValue::String(title.to_string()));
    let body = format!("\n# {title}\n\nNew page content goes here.\n");
    Ok(docsmith_core::join(&body, &frontmatter)?)
}

fn page_slug(page: &NewPage) -> Result<String, ValidationError> {
    let title = page.title.trim();
    if title.is_empty() {
        return Err(ValidationError::InvalidTitle);
    }
    let slug = slugify(title);
    let parent = page.parent_path.trim_matches('/');
    let full = if parent.is_empty() {
        slug.clone()
    } else {
        format!("{parent}/{slug}")
    };
    let allowed = full
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '/');
    if slug.trim_matches('-').is_empty() || full.contains("..") || !allowed {
        return Err(ValidationError::InvalidSlug(full));
    }
    Ok(full)
}

/// Creates a page from the template and links it into the navigation tree.
///
/// Refuses to overwrite an existing file. The document is written before the
/// navigation is updated; a navigation failure after that leaves the new file
/// in place and is returned as a persistence error.
pub async fn create_page(
    content: &dyn ContentStore,
    navigation: &dyn NavigationStore,
    page: &NewPage,
    docs_route: &str,
) -> Result<CreatedPage, EditorError> {
    let slug = page_slug(page)?;
    let path = DocPath::parse(&slug)?;
    let title = page.title.trim();

    let raw = page_template(title)?;
    content.create(&path, &raw).await.map_err(|err| match err {
        StoreError::AlreadyExists(_) => {
            EditorError::from(ValidationError::PageExists(format!("{slug}.{CONTENT_EXTENSION}")))
        }
        other => EditorError::from(other),
    })?;
    log::info!("Created page {slug}.{CONTENT_EXTENSION}");

    let mut tree = navigation.load().await.map_err(|err| {
        log::error!("Could not read navigation to add {slug}: {err}");
        EditorError::Persistence(err)
    })?;
    let href = path.href(docs_route);
    let outcome = tree.insert_link(&page.parent_path, NavigationNode::link(title, href.clone()));
    persist_navigation(navigation, &tree).await.map_err(|err| {
        log::error!("Page {slug} created, but saving navigation failed: {err}");
        EditorError::Persistence(err)
    })?;

    Ok(CreatedPage {
        path,
        href,
        outcome,
        navigation: tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, parent: &str) -> NewPage {
        NewPage {
            title: title.to_string(),
            parent_path: parent.to_string(),
        }
    }

    #[test]
    fn template_has_title_frontmatter_and_heading() {
        let raw = page_template("Getting Started").unwrap();
        insta::assert_snapshot!(raw, @r"
        ---
        title: Getting Started
        ---

        # Getting Started

        New page content goes here.
        ");
        let parsed = SourceDocument::parse(&raw).unwrap();
        assert_eq!(parsed.title(), Some("Getting Started"));
    }

    #[test]
    fn slug_joins_parent() {
        assert_eq!(
            page_slug(&page("Deep Dive", "guides/advanced")).unwrap(),
            "guides/advanced/deep-dive"
        );
        assert_eq!(page_slug(&page("Intro", "")).unwrap(), "intro");
    }

    #[test]
    fn slug_rejections() {
        assert_eq!(page_slug(&page("   ", "")), Err(ValidationError::InvalidTitle));
        assert!(matches!(
            page_slug(&page("!!!", "")),
            Err(ValidationError::InvalidSlug(_))
        ));
        assert!(matches!(
            page_slug(&page("Ok", "../etc")),
            Err(ValidationError::InvalidSlug(_))
        ));
        assert!(matches!(
            page_slug(&page("Ok", "Guides")),
            Err(ValidationError::InvalidSlug(_))
        ));
    }
}
