//! Document paths: the segment sequence that names a page.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// File name used for the empty path and for section landing pages.
pub const INDEX_SEGMENT: &str = "index";
/// Extension of content files.
pub const CONTENT_EXTENSION: &str = "mdx";

/// A validated sequence of path segments (`["guide", "setup"]`).
///
/// The empty path names the docs landing page, stored as `index.mdx`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// The landing page.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from segments, rejecting empty, `.`/`..`, and segments
    /// that contain separators.
    pub fn new<I, S>(segments: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self(segments))
    }

    /// Parses `guide/setup`; leading, trailing and doubled slashes are ignored.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Segments as given.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns true for the landing page.
    pub fn is_root(&self) -> bool {
        self.0.is_empty() || (self.0.len() == 1 && self.0[0] == INDEX_SEGMENT)
    }

    /// Segments with the empty path mapped to `index`.
    pub fn effective_segments(&self) -> Vec<&str> {
        if self.0.is_empty() {
            vec![INDEX_SEGMENT]
        } else {
            self.0.iter().map(String::as_str).collect()
        }
    }

    /// Content file path relative to the content root (`guide/setup.mdx`).
    pub fn relative_file(&self) -> PathBuf {
        let segments = self.effective_segments();
        let mut path = PathBuf::new();
        if let Some((last, dirs)) = segments.split_last() {
            path.extend(dirs);
            path.push(format!("{last}.{CONTENT_EXTENSION}"));
        }
        path
    }

    /// Public URL of the page under `docs_route`: `/docs/guide/setup`, with a
    /// trailing `index` dropped and the landing page at `/docs`.
    pub fn href(&self, docs_route: &str) -> String {
        let route = docs_route.trim_end_matches('/');
        let mut segments: &[String] = &self.0;
        if let Some((last, rest)) = segments.split_last()
            && last == INDEX_SEGMENT
        {
            segments = rest;
        }
        if segments.is_empty() {
            return if route.is_empty() {
                "/".to_string()
            } else {
                route.to_string()
            };
        }
        format!("{route}/{}", segments.join("/"))
    }

    /// Appends one segment.
    pub fn join(&self, segment: &str) -> Result<Self, StoreError> {
        validate_segment(segment)?;
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidPath(segment.to_string()));
    }
    Ok(())
}

impl TryFrom<Vec<String>> for DocPath {
    type Error = StoreError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<DocPath> for Vec<String> {
    fn from(path: DocPath) -> Self {
        path.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.effective_segments().join("/"))
    }
}
