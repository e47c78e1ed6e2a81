//! # Repository Storage
//!
//! The storage engine behind a repository is an external collaborator. This
//! module defines the contract the metadata jobs need from it, the
//! [`RepositoryStorage`] trait, together with [`FileStorage`], an
//! implementation backed by a plain directory on the local filesystem.
//!
//! Item paths are repository-relative and written with a leading slash, for
//! example `/repodata/repomd.xml`.
//!
//! Items may also be *generated*: instead of bytes, the caller stores a
//! [`ContentSource::Generated`] naming a content generator that renders the
//! item when it is requested. Generated items are resolved late by an
//! external content-generation registry; storage only remembers the name.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Content handed to [`RepositoryStorage::store_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Literal item content.
    Bytes(Vec<u8>),
    /// Content rendered on demand by the named content generator.
    Generated { generator_id: String },
}

/// An item retrieved from repository storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageItem {
    /// A file materialized on local disk.
    File { path: String, local_path: PathBuf },
    /// A virtual item whose content comes from a content generator.
    Generated { path: String, generator_id: String },
}

impl StorageItem {
    pub fn path(&self) -> &str {
        match self {
            StorageItem::File { path, .. } | StorageItem::Generated { path, .. } => path,
        }
    }

    /// Reads the item's content.
    ///
    /// Generated items have no stored content and cannot be read here.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            StorageItem::File { local_path, .. } => Ok(fs::read(local_path)?),
            StorageItem::Generated { path, generator_id } => Err(Error::Storage {
                repository: String::new(),
                message: format!(
                    "'{}' is rendered by content generator '{}' and has no stored content",
                    path, generator_id
                ),
            }),
        }
    }
}

/// Storage operations required from a repository.
///
/// Retrieval blocks until the item is locally available. For proxy-style
/// storage this is what forces remote content to be materialized on disk.
pub trait RepositoryStorage: Send + Sync + std::fmt::Debug {
    /// Local directory holding the repository's content.
    fn base_dir(&self) -> &Path;

    /// Retrieves an item, or `None` when it does not exist.
    fn retrieve_item(&self, path: &str) -> Result<Option<StorageItem>>;

    /// Stores an item, replacing any previous content at `path`.
    fn store_item(&self, path: &str, content: ContentSource) -> Result<()>;
}

/// Directory-backed repository storage.
#[derive(Debug)]
pub struct FileStorage {
    repository_id: String,
    base_dir: PathBuf,
    generated: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    pub fn new(repository_id: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository_id: repository_id.into(),
            base_dir: base_dir.into(),
            generated: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves an item path to a location below the base directory.
    fn local_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(Error::Path {
                message: format!("empty item path in repository '{}'", self.repository_id),
            });
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::Path {
                message: format!(
                    "item path '{}' escapes repository '{}'",
                    path, self.repository_id
                ),
            });
        }
        Ok(self.base_dir.join(relative))
    }

    fn normalized(path: &str) -> String {
        format!("/{}", path.trim_start_matches('/'))
    }

    fn lock_generated(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.generated.lock().map_err(|_| Error::LockPoisoned {
            context: format!("generated items of '{}'", self.repository_id),
        })
    }
}

impl RepositoryStorage for FileStorage {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn retrieve_item(&self, path: &str) -> Result<Option<StorageItem>> {
        let local_path = self.local_path(path)?;
        let path = Self::normalized(path);

        if let Some(generator_id) = self.lock_generated()?.get(&path) {
            return Ok(Some(StorageItem::Generated {
                path,
                generator_id: generator_id.clone(),
            }));
        }

        if local_path.is_file() {
            Ok(Some(StorageItem::File { path, local_path }))
        } else if local_path.is_dir() {
            Err(Error::Storage {
                repository: self.repository_id.clone(),
                message: format!("'{}' is a collection, not a file", path),
            })
        } else {
            Ok(None)
        }
    }

    fn store_item(&self, path: &str, content: ContentSource) -> Result<()> {
        let local_path = self.local_path(path)?;
        let path = Self::normalized(path);

        match content {
            ContentSource::Bytes(bytes) => {
                if let Some(parent) = local_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&local_path, bytes)?;
                self.lock_generated()?.remove(&path);
            }
            ContentSource::Generated { generator_id } => {
                self.lock_generated()?.insert(path, generator_id);
            }
        }
        Ok(())
    }
}
