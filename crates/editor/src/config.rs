//! Site configuration loaded from YAML.

use crate::error::ConfigError;
use crate::store::{FsContentStore, FsImageStore, FsNavigationStore};
use docsmith_render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Paths, routes and limits for one documentation site.
///
/// Every field has a default, so an empty file (or no file) is a valid
/// configuration:
///
/// ```yaml
/// content_dir: content/docs
/// docs_route: /docs
/// render:
///   site_host: docs.example.com
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SiteConfig {
    /// Directory holding `.mdx` documents.
    pub content_dir: PathBuf,
    /// JSON file holding the navigation tree.
    pub navigation_file: PathBuf,
    /// Directory uploaded images are written to.
    pub upload_dir: PathBuf,
    /// Public URL prefix of `upload_dir`.
    pub upload_url_prefix: String,
    /// Route documents are served under.
    pub docs_route: String,
    /// MIME types accepted by image upload.
    pub allowed_image_types: Vec<String>,
    /// How long a `saved` or `error` status stays visible.
    pub save_status_display_ms: u64,
    /// Render pipeline options.
    pub render: RenderOptions,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/docs"),
            navigation_file: PathBuf::from("content/docs/navigation.json"),
            upload_dir: PathBuf::from("public/img/uploads"),
            upload_url_prefix: "/img/uploads".to_string(),
            docs_route: "/docs".to_string(),
            allowed_image_types: ["image/jpeg", "image/png", "image/gif", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            save_status_display_ms: 3000,
            render: RenderOptions::default(),
        }
    }
}

impl SiteConfig {
    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads and parses a YAML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&source)
    }

    /// Anchors relative paths at `root`.
    pub fn resolve(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        for path in [
            &mut self.content_dir,
            &mut self.navigation_file,
            &mut self.upload_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// Display interval of a settled save status.
    pub fn save_status_display(&self) -> Duration {
        Duration::from_millis(self.save_status_display_ms)
    }

    /// Content store rooted at `content_dir`.
    pub fn content_store(&self) -> FsContentStore {
        FsContentStore::new(&self.content_dir)
    }

    /// Navigation store backed by `navigation_file`.
    pub fn navigation_store(&self) -> FsNavigationStore {
        FsNavigationStore::new(&self.navigation_file)
    }

    /// Image store writing to `upload_dir`.
    pub fn image_store(&self) -> FsImageStore {
        FsImageStore::new(&self.upload_dir, &self.upload_url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_render::RenderTarget;

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(SiteConfig::from_yaml("").unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = SiteConfig::from_yaml(
            "docs_route: /handbook\nsave_status_display_ms: 500\nrender:\n  target: static\n",
        )
        .unwrap();
        assert_eq!(config.docs_route, "/handbook");
        assert_eq!(config.save_status_display(), Duration::from_millis(500));
        assert_eq!(config.render.target, RenderTarget::Static);
        assert!(config.render.lazy_images);
        assert_eq!(config.upload_url_prefix, "/img/uploads");
        assert_eq!(config.allowed_image_types.len(), 4);
    }

    #[test]
    fn rejects_invalid_yaml() {
        assert!(matches!(
            SiteConfig::from_yaml("docs_route: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let mut config = SiteConfig::default();
        config.upload_dir = PathBuf::from("/srv/uploads");
        let config = config.resolve("/site");
        assert_eq!(config.content_dir, PathBuf::from("/site/content/docs"));
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = SiteConfig::load("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
