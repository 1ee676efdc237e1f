//! File-backed stores.

use super::{ContentStore, ImageStore, NavigationStore, Result};
use crate::error::StoreError;
use crate::navigation::NavigationTree;
use crate::path::DocPath;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Documents stored as `.mdx` files under a root directory.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute file path of a document.
    pub fn file_path(&self, path: &DocPath) -> PathBuf {
        self.root.join(path.relative_file())
    }
}

async fn ensure_parent(file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| StoreError::io(parent.display().to_string(), err))?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl ContentStore for FsContentStore {
    async fn read(&self, path: &DocPath) -> Result<String> {
        let file = self.file_path(path);
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|err| StoreError::io(file.display().to_string(), err))
    }

    async fn write(&self, path: &DocPath, raw: &str) -> Result<()> {
        let file = self.file_path(path);
        ensure_parent(&file).await?;
        tokio::fs::write(&file, raw)
            .await
            .map_err(|err| StoreError::io(file.display().to_string(), err))?;
        log::info!("Saved document {}", file.display());
        Ok(())
    }

    async fn create(&self, path: &DocPath, raw: &str) -> Result<()> {
        let file = self.file_path(path);
        ensure_parent(&file).await?;
        let context = file.display().to_string();
        let mut handle = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .await
            .map_err(|err| StoreError::io(context.clone(), err))?;
        handle
            .write_all(raw.as_bytes())
            .await
            .map_err(|err| StoreError::io(context.clone(), err))?;
        handle
            .flush()
            .await
            .map_err(|err| StoreError::io(context.clone(), err))?;
        log::info!("Created document {context}");
        Ok(())
    }
}

/// Navigation tree stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct FsNavigationStore {
    file: PathBuf,
}

impl FsNavigationStore {
    /// Store backed by `file`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

#[async_trait::async_trait]
impl NavigationStore for FsNavigationStore {
    async fn load(&self) -> Result<NavigationTree> {
        let context = self.file.display().to_string();
        let raw = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|err| StoreError::io(context.clone(), err))?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { context, source })
    }

    async fn save(&self, tree: &NavigationTree) -> Result<()> {
        let context = self.file.display().to_string();
        let mut json = serde_json::to_string_pretty(tree).map_err(|source| StoreError::Json {
            context: context.clone(),
            source,
        })?;
        json.push('\n');
        ensure_parent(&self.file).await?;
        tokio::fs::write(&self.file, json)
            .await
            .map_err(|err| StoreError::io(context, err))
    }
}

/// Images written to a public directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl FsImageStore {
    /// Store writing to `dir`, served under `url_prefix`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(StoreError::InvalidPath(filename.to_string()));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| StoreError::io(self.dir.display().to_string(), err))?;
        let file = self.dir.join(filename);
        tokio::fs::write(&file, bytes)
            .await
            .map_err(|err| StoreError::io(file.display().to_string(), err))?;
        Ok(format!("{}/{filename}", self.url_prefix.trim_end_matches('/')))
    }
}
