use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    /// Path of the stored image, relative to the store root.
    pub path: String,
}

/// Persists uploaded images and hands back a storage reference.
pub trait FileStore {
    fn save(&self, image: &[u8], category: &str, owner: &str) -> Result<StoredFile>;
}

impl<T: FileStore + ?Sized> FileStore for &T {
    fn save(&self, image: &[u8], category: &str, owner: &str) -> Result<StoredFile> {
        (**self).save(image, category, owner)
    }
}

/// Local-disk store writing images under `<root>/<category>/`.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStore for LocalFileStore {
    fn save(&self, image: &[u8], category: &str, owner: &str) -> Result<StoredFile> {
        let ext = image::guess_format(image)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin");
        let name = format!("{owner}-{}.{ext}", Uuid::new_v4());

        let dir = self.root.join(category);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let dest = dir.join(&name);
        std::fs::write(&dest, image)
            .with_context(|| format!("writing {}", dest.display()))?;

        Ok(StoredFile {
            path: format!("{category}/{name}"),
        })
    }
}
