#![allow(dead_code)]

use docsmith_editor::{
    ContentStore, DocPath, ImageStore, NavigationStore, NavigationTree, StoreError,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory content store that counts writes.
#[derive(Default)]
pub struct MemoryContent {
    pub files: Mutex<HashMap<DocPath, String>>,
    pub writes: AtomicUsize,
    pub fail_writes: bool,
}

impl MemoryContent {
    pub fn with(path: &str, raw: &str) -> Self {
        let store = Self::default();
        store
            .files
            .lock()
            .unwrap()
            .insert(DocPath::parse(path).unwrap(), raw.to_string());
        store
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&DocPath::parse(path).unwrap())
            .cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryContent {
    async fn read(&self, path: &DocPath) -> Result<String, StoreError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &DocPath, raw: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::Io {
                context: path.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), raw.to_string());
        Ok(())
    }

    async fn create(&self, path: &DocPath, raw: &str) -> Result<(), StoreError> {
        let mut files = self.files.lock().unwrap();
        if files.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        files.insert(path.clone(), raw.to_string());
        Ok(())
    }
}

/// In-memory navigation store that can be told to fail saves.
#[derive(Default)]
pub struct MemoryNavigation {
    pub tree: Mutex<Option<NavigationTree>>,
    pub saves: AtomicUsize,
    pub fail_saves: bool,
}

impl MemoryNavigation {
    pub fn with(tree: NavigationTree) -> Self {
        Self {
            tree: Mutex::new(Some(tree)),
            ..Self::default()
        }
    }

    pub fn failing(tree: NavigationTree) -> Self {
        Self {
            fail_saves: true,
            ..Self::with(tree)
        }
    }

    pub fn current(&self) -> Option<NavigationTree> {
        self.tree.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NavigationStore for MemoryNavigation {
    async fn load(&self) -> Result<NavigationTree, StoreError> {
        self.current()
            .ok_or_else(|| StoreError::NotFound("navigation.json".to_string()))
    }

    async fn save(&self, tree: &NavigationTree) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(StoreError::Io {
                context: "navigation.json".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        *self.tree.lock().unwrap() = Some(tree.clone());
        Ok(())
    }
}

/// Image store that records names.
#[derive(Default)]
pub struct MemoryImages {
    pub names: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ImageStore for MemoryImages {
    async fn put(&self, filename: &str, _bytes: &[u8]) -> Result<String, StoreError> {
        self.names.lock().unwrap().push(filename.to_string());
        Ok(format!("/img/uploads/{filename}"))
    }
}
