//! The site navigation tree stored in `navigation.json`.

use serde::{Deserialize, Serialize};

/// Kind of a navigation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Top-level section heading.
    Category,
    /// Collapsible group.
    Folder,
    /// A page link.
    Link,
}

/// One node of the navigation forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeType,
    /// Display name.
    pub name: String,
    /// Link target, for links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Child nodes, for categories and folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavigationNode>>,
}

impl NavigationNode {
    /// Creates a link node.
    pub fn link(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            kind: NodeType::Link,
            name: name.into(),
            href: Some(href.into()),
            children: None,
        }
    }

    /// Creates an empty category or folder.
    pub fn group(kind: NodeType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            href: None,
            children: Some(Vec::new()),
        }
    }

    /// Builder: appends a child.
    pub fn with_child(mut self, child: NavigationNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Returns true for categories and folders.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeType::Category | NodeType::Folder)
    }

    fn children(&self) -> &[NavigationNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Where [`NavigationTree::insert_link`] put a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Added under the requested parent (or at the root when asked).
    Inserted,
    /// The parent was not found; added at the root instead.
    InsertedAtRoot,
    /// A node with the same href already existed; nothing changed.
    AlreadyPresent,
}

/// An entry of the parent picker built by [`NavigationTree::parent_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentOption {
    /// Slug path of the group (`guides/advanced`).
    pub value: String,
    /// Indented display label.
    pub label: String,
    /// Nesting depth, 0 at the root.
    pub level: usize,
}

/// The whole navigation forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationTree {
    /// Root nodes in display order.
    pub nodes: Vec<NavigationNode>,
}

impl NavigationTree {
    /// Wraps root nodes.
    pub fn new(nodes: Vec<NavigationNode>) -> Self {
        Self { nodes }
    }

    /// Returns true if there are no root nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (depth-first) whose href equals `href`.
    pub fn find_by_href(&self, href: &str) -> Option<&NavigationNode> {
        fn walk<'a>(nodes: &'a [NavigationNode], href: &str) -> Option<&'a NavigationNode> {
            nodes.iter().find_map(|node| {
                if node.href.as_deref() == Some(href) {
                    Some(node)
                } else {
                    walk(node.children(), href)
                }
            })
        }
        walk(&self.nodes, href)
    }

    /// Display name of the node linking to `href`.
    pub fn display_name(&self, href: &str) -> Option<&str> {
        self.find_by_href(href).map(|node| node.name.as_str())
    }

    /// Returns true if any node links to `href`.
    pub fn contains_href(&self, href: &str) -> bool {
        self.find_by_href(href).is_some()
    }

    /// Renames every node linking to `href`; returns how many were renamed.
    pub fn rename(&mut self, href: &str, name: &str) -> usize {
        fn walk(nodes: &mut [NavigationNode], href: &str, name: &str) -> usize {
            let mut renamed = 0;
            for node in nodes {
                if node.href.as_deref() == Some(href) {
                    node.name = name.to_string();
                    renamed += 1;
                }
                if let Some(children) = node.children.as_mut() {
                    renamed += walk(children, href, name);
                }
            }
            renamed
        }
        walk(&mut self.nodes, href, name)
    }

    /// Inserts `node` beneath the group whose slugified name path matches
    /// `parent_path` (`guides/advanced`). An empty path means the root.
    ///
    /// Groups are matched at any depth, so a folder nested under a
    /// differently named category is still found. When no group matches the
    /// node is added at the root. A node whose href already exists anywhere in
    /// the tree is never added twice.
    pub fn insert_link(&mut self, parent_path: &str, node: NavigationNode) -> InsertOutcome {
        if let Some(href) = node.href.as_deref()
            && self.contains_href(href)
        {
            return InsertOutcome::AlreadyPresent;
        }

        let segments: Vec<&str> = parent_path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            self.nodes.push(node);
            return InsertOutcome::Inserted;
        }
        if insert_under(&mut self.nodes, &segments, &node) {
            return InsertOutcome::Inserted;
        }
        log::warn!(
            "Could not find navigation parent '{parent_path}'; adding {} at the root",
            node.name
        );
        self.nodes.push(node);
        InsertOutcome::InsertedAtRoot
    }

    /// Flattens categories and folders into picker entries, depth-first.
    pub fn parent_options(&self) -> Vec<ParentOption> {
        fn walk(nodes: &[NavigationNode], prefix: &str, level: usize, out: &mut Vec<ParentOption>) {
            for node in nodes.iter().filter(|n| n.is_group()) {
                let slug = slugify(&node.name);
                let value = if prefix.is_empty() {
                    slug
                } else {
                    format!("{prefix}/{slug}")
                };
                let marker = if node.kind == NodeType::Category {
                    ""
                } else {
                    "\u{21b3} "
                };
                out.push(ParentOption {
                    label: format!("{}{marker}{}", ".".repeat(level * 2), node.name),
                    value: value.clone(),
                    level,
                });
                walk(node.children(), &value, level + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, "", 0, &mut out);
        out
    }
}

fn insert_under(nodes: &mut [NavigationNode], segments: &[&str], node: &NavigationNode) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    for candidate in nodes.iter_mut() {
        if candidate.is_group() && slugify(&candidate.name) == *first {
            if rest.is_empty() {
                candidate
                    .children
                    .get_or_insert_with(Vec::new)
                    .push(node.clone());
                return true;
            }
            if let Some(children) = candidate.children.as_mut()
                && insert_under(children, rest, node)
            {
                return true;
            }
        }
        if let Some(children) = candidate.children.as_mut()
            && insert_under(children, segments, node)
        {
            return true;
        }
    }
    false
}

/// Turns a title into a URL segment: lowercase, whitespace runs to `-`,
/// anything outside `[a-z0-9-]` dropped, hyphen runs collapsed.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            out.push(ch);
        }
    }
    let mut collapsed = String::with_capacity(out.len());
    for ch in out.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> NavigationTree {
        NavigationTree::new(vec![
            NavigationNode::group(NodeType::Category, "Getting Started")
                .with_child(NavigationNode::link("Intro", "/docs"))
                .with_child(
                    NavigationNode::group(NodeType::Folder, "Advanced Topics")
                        .with_child(NavigationNode::link("Caching", "/docs/advanced/caching")),
                ),
            NavigationNode::group(NodeType::Category, "Reference"),
        ])
    }

    #[test]
    fn deserializes_navigation_json() {
        let json = r#"[{"type":"category","name":"Docs","children":[{"type":"link","name":"Intro","href":"/docs"}]}]"#;
        let tree: NavigationTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.display_name("/docs"), Some("Intro"));
        assert_eq!(serde_json::to_string(&tree).unwrap(), json);
    }

    #[test]
    fn renames_every_matching_link() {
        let mut tree = sample();
        tree.nodes[1]
            .children
            .get_or_insert_with(Vec::new)
            .push(NavigationNode::link("Intro again", "/docs"));
        assert_eq!(tree.rename("/docs", "Welcome"), 2);
        assert_eq!(tree.display_name("/docs"), Some("Welcome"));
        assert_eq!(tree.rename("/docs/missing", "x"), 0);
    }

    #[test]
    fn inserts_under_nested_folder() {
        let mut tree = sample();
        let outcome = tree.insert_link(
            "advanced-topics",
            NavigationNode::link("Tuning", "/docs/advanced-topics/tuning"),
        );
        assert_eq!(outcome, InsertOutcome::Inserted);
        let folder = &tree.nodes[0].children.as_ref().unwrap()[1];
        assert_eq!(folder.children.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn inserts_by_full_path() {
        let mut tree = sample();
        let outcome = tree.insert_link(
            "getting-started/advanced-topics",
            NavigationNode::link("Tuning", "/docs/x"),
        );
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert!(tree.contains_href("/docs/x"));
    }

    #[test]
    fn unknown_parent_falls_back_to_root() {
        let mut tree = sample();
        let outcome = tree.insert_link("nowhere", NavigationNode::link("Lost", "/docs/lost"));
        assert_eq!(outcome, InsertOutcome::InsertedAtRoot);
        assert_eq!(tree.nodes.last().unwrap().name, "Lost");
    }

    #[test]
    fn never_duplicates_href() {
        let mut tree = sample();
        let outcome = tree.insert_link("reference", NavigationNode::link("Intro", "/docs"));
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);
        assert_eq!(tree, sample());
    }

    #[test]
    fn parent_options_flatten_groups() {
        let options = sample().parent_options();
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["getting-started", "getting-started/advanced-topics", "reference"]
        );
        assert_eq!(options[1].label, "..\u{21b3} Advanced Topics");
        assert_eq!(options[1].level, 1);
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("  Hello,   World! "), "hello-world");
        assert_eq!(slugify("A - B"), "a-b");
        assert_eq!(slugify("日本"), "");
    }

    proptest! {
        #[test]
        fn slugify_output_is_url_safe(title in "\\PC{0,40}") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.contains("--"));
            prop_assert_eq!(slugify(&slug), slug.clone());
        }
    }
}
