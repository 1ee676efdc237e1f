//! Persistence collaborators.
//!
//! The editor only talks to storage through these traits. [`fs`] provides the
//! file-backed implementations; tests substitute their own.

pub mod fs;

pub use fs::{FsContentStore, FsImageStore, FsNavigationStore};

use crate::error::StoreError;
use crate::navigation::NavigationTree;
use crate::path::DocPath;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Reads and writes raw document text by path.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns the raw text of a document.
    ///
    /// A missing document is [`StoreError::NotFound`], never a generic I/O error.
    async fn read(&self, path: &DocPath) -> Result<String>;

    /// Replaces (or creates) a document.
    async fn write(&self, path: &DocPath, raw: &str) -> Result<()>;

    /// Creates a new document, failing with [`StoreError::AlreadyExists`] if
    /// one is already there.
    async fn create(&self, path: &DocPath, raw: &str) -> Result<()>;
}

/// Loads and saves the navigation tree wholesale.
#[async_trait::async_trait]
pub trait NavigationStore: Send + Sync {
    /// Reads the whole tree.
    async fn load(&self) -> Result<NavigationTree>;

    /// Overwrites the whole tree. The last write wins.
    async fn save(&self, tree: &NavigationTree) -> Result<()>;
}

/// Stores binary images and returns their public URL.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Writes `bytes` under `filename` and returns the URL it is served at.
    async fn put(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}

/// Saves `tree` unless it is empty. Returns whether a write happened.
pub async fn persist_navigation(
    store: &dyn NavigationStore,
    tree: &NavigationTree,
) -> Result<bool> {
    if tree.is_empty() {
        log::warn!("Navigation tree is empty; skipping save");
        return Ok(false);
    }
    store.save(tree).await?;
    log::info!("Saved navigation tree ({} root nodes)", tree.nodes.len());
    Ok(true)
}
