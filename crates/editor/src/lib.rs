#![deny(missing_docs)]
//! docsmith editor: edit/save sessions, the navigation tree, and the content,
//! navigation and image stores behind them.

/// Content collection.
pub mod collection;
/// Site configuration.
pub mod config;
/// Error types.
pub mod error;
/// Image upload.
pub mod images;
/// Navigation tree.
pub mod navigation;
/// Document loading and page creation.
pub mod pages;
/// Document paths.
pub mod path;
/// Edit sessions.
pub mod session;
/// Store traits and filesystem stores.
pub mod store;

pub use collection::{Collection, CollectionFailure, PageMeta};
pub use config::SiteConfig;
pub use error::{ConfigError, EditorError, ErrorKind, StoreError, ValidationError};
pub use images::{ImageUpload, sanitize_filename, stored_filename, upload_image};
pub use navigation::{
    InsertOutcome, NavigationNode, NavigationTree, NodeType, ParentOption, slugify,
};
pub use pages::{CreatedPage, LoadedDocument, NewPage, create_page, load_document, page_template};
pub use path::DocPath;
pub use session::{EditSession, SaveJob, SaveReport, SaveState, SaveStatus, Session};
pub use store::{
    ContentStore, FsContentStore, FsImageStore, FsNavigationStore, ImageStore, NavigationStore,
    persist_navigation,
};
