//! Page metadata for every document under the content directory.

use crate::error::{EditorError, StoreError};
use crate::path::{CONTENT_EXTENSION, DocPath, INDEX_SEGMENT};
use docsmith_core::{Frontmatter, SourceDocument, TocEntry, extract};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Metadata of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    /// Document path.
    pub path: DocPath,
    /// Route relative to the docs root: `index` is `/`, `guide/index` is `/guide`.
    pub route: String,
    /// Frontmatter title, else first heading, else the file stem.
    pub title: String,
    /// Headings.
    pub toc: Vec<TocEntry>,
    /// Frontmatter.
    pub frontmatter: Frontmatter,
}

/// A file that could not be collected.
#[derive(Debug)]
pub struct CollectionFailure {
    /// File on disk.
    pub file: PathBuf,
    /// What went wrong.
    pub error: EditorError,
}

/// Every page found, sorted by route, plus per-file failures.
#[derive(Debug, Default)]
pub struct Collection {
    /// Pages that loaded.
    pub pages: Vec<PageMeta>,
    /// Files that did not.
    pub failures: Vec<CollectionFailure>,
}

impl Collection {
    /// Walks `content_dir` for `.mdx` files and loads them in parallel.
    pub fn load(content_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = content_dir.as_ref();
        if !root.is_dir() {
            return Err(StoreError::NotFound(root.display().to_string()));
        }
        let files = content_files(root);
        log::debug!("Collecting {} documents under {}", files.len(), root.display());

        let results: Vec<_> = files
            .par_iter()
            .map(|file| (file, load_page(root, file)))
            .collect();

        let mut collection = Collection::default();
        for (file, result) in results {
            match result {
                Ok(page) => collection.pages.push(page),
                Err(error) => {
                    log::warn!("Skipping {}: {error}", file.display());
                    collection.failures.push(CollectionFailure {
                        file: file.clone(),
                        error,
                    });
                }
            }
        }
        collection.pages.sort_by(|a, b| a.route.cmp(&b.route));
        Ok(collection)
    }

    /// Page with the given route.
    pub fn find(&self, route: &str) -> Option<&PageMeta> {
        self.pages.iter().find(|page| page.route == route)
    }
}

fn content_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == CONTENT_EXTENSION))
        .map(|e| e.into_path())
        .collect()
}

fn doc_path(root: &Path, file: &Path) -> Result<DocPath, StoreError> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| StoreError::InvalidPath(file.display().to_string()))?
        .with_extension("");
    let segments = relative
        .iter()
        .map(|part| {
            part.to_str()
                .map(str::to_string)
                .ok_or_else(|| StoreError::InvalidPath(file.display().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    DocPath::new(segments)
}

fn route(path: &DocPath) -> String {
    let mut segments = path.segments();
    if let Some((last, rest)) = segments.split_last()
        && last == INDEX_SEGMENT
    {
        segments = rest;
    }
    format!("/{}", segments.join("/"))
}

fn load_page(root: &Path, file: &Path) -> Result<PageMeta, EditorError> {
    let path = doc_path(root, file)?;
    let raw = std::fs::read_to_string(file)
        .map_err(|err| StoreError::io(file.display().to_string(), err))?;
    let document = SourceDocument::parse(&raw)?;
    let toc = extract(&document.body);
    let title = document
        .title()
        .map(str::to_string)
        .or_else(|| toc.first().map(|entry| entry.title.clone()))
        .or_else(|| path.segments().last().cloned())
        .unwrap_or_else(|| INDEX_SEGMENT.to_string());
    Ok(PageMeta {
        route: route(&path),
        path,
        title,
        toc,
        frontmatter: document.frontmatter,
    })
}
