//! Local image files exposed to the UI through `GET /image?id=`.
//!
//! The UI cannot read the backend's filesystem, so absolute-path icons are
//! registered here and rewritten to URLs before results are sent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use wisp_types::{ResultPayload, WispImage};

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, PathBuf>,
    by_path: HashMap<PathBuf, String>,
}

#[derive(Debug)]
pub struct ImageRegistry {
    base_url: String,
    entries: RwLock<Entries>,
}

impl ImageRegistry {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:34987`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            entries: RwLock::new(Entries::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Id for `path`, stable across calls for the same path.
    pub fn register(&self, path: &Path) -> String {
        if let Some(id) = self.read().by_path.get(path) {
            return id.clone();
        }
        let mut entries = self.write();
        if let Some(id) = entries.by_path.get(path) {
            return id.clone();
        }
        let id = uuid::Uuid::new_v4().to_string();
        entries.by_path.insert(path.to_path_buf(), id.clone());
        entries.by_id.insert(id.clone(), path.to_path_buf());
        id
    }

    #[must_use]
    pub fn path(&self, id: &str) -> Option<PathBuf> {
        self.read().by_id.get(id).cloned()
    }

    /// Replace an absolute-path image with its `/image` URL.
    #[must_use]
    pub fn rewrite(&self, image: WispImage) -> WispImage {
        if !image.is_local_file() {
            return image;
        }
        let id = self.register(Path::new(&image.image_data));
        WispImage::url(format!("{}/image?id={id}", self.base_url))
    }

    pub fn rewrite_result(&self, result: &mut ResultPayload) {
        let icon = std::mem::take(&mut result.icon);
        result.icon = self.rewrite(icon);
    }
}
