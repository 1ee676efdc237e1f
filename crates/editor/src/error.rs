use docsmith_core::FrontmatterError;
use docsmith_render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by content, navigation and image stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested document or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other I/O failure.
    #[error("{context}: {source}")]
    Io {
        /// What was being accessed.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A JSON file could not be read or written.
    #[error("invalid JSON in {context}: {source}")]
    Json {
        /// What was being parsed.
        context: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A document path segment is empty or escapes the content root.
    #[error("invalid document path `{0}`")]
    InvalidPath(String),
    /// A create call found an existing file.
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

impl StoreError {
    /// Maps an I/O error, keeping not-found and already-exists distinct.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        let context = context.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(context),
            std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(context),
            _ => StoreError::Io { context, source },
        }
    }

    /// Returns true for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Input rejected before any store is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The upload's MIME type is not in the allowed list.
    #[error("Invalid file type: {mime}. Allowed types: {allowed}")]
    UnsupportedImageType {
        /// Offending MIME type.
        mime: String,
        /// Comma-separated allowed types.
        allowed: String,
    },
    /// The upload has no bytes.
    #[error("No image data provided")]
    EmptyUpload,
    /// The page title is empty after trimming.
    #[error("Title cannot be empty")]
    InvalidTitle,
    /// The generated page slug is empty or unsafe.
    #[error("Invalid generated slug `{0}`")]
    InvalidSlug(String),
    /// A page already exists at the target path.
    #[error("File already exists at {0}")]
    PageExists(String),
}

/// Failure categories a UI distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be parsed ("could not load document").
    Parse,
    /// The document or navigation file is absent (404 state).
    NotFound,
    /// A write or read failed; the operator may retry.
    Persistence,
    /// The input was rejected with an actionable message.
    Validation,
}

/// Top-level editor error.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Frontmatter is malformed.
    #[error("could not load document: {0}")]
    Parse(#[from] FrontmatterError),
    /// The body could not be rendered.
    #[error("could not render document: {0}")]
    Render(#[from] RenderError),
    /// The document or navigation file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A store operation failed.
    #[error(transparent)]
    Persistence(StoreError),
    /// Input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EditorError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Parse(_) | EditorError::Render(_) => ErrorKind::Parse,
            EditorError::NotFound(_) => ErrorKind::NotFound,
            EditorError::Persistence(_) => ErrorKind::Persistence,
            EditorError::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => EditorError::NotFound(what),
            other => EditorError::Persistence(other),
        }
    }
}

/// Errors loading a [`crate::SiteConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The YAML is invalid.
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
