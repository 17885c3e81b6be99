//! Filesystem-backed store: containers are directories, documents are files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use webacl_core::types::ResourceId;

use super::{GraphStore, Resource, StoreFuture};
use crate::error::{StoreError, StoreResult};

/// Maps identifiers under `base` onto paths under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    base: ResourceId,
    root: PathBuf,
}

impl FileStore {
    /// Creates a store serving `base` (a container identifier) from `root`.
    #[must_use]
    pub fn new(base: ResourceId, root: impl Into<PathBuf>) -> Self {
        Self {
            base: base.as_container(),
            root: root.into(),
        }
    }

    #[must_use]
    pub const fn base(&self) -> &ResourceId {
        &self.base
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// ## Summary
    /// Resolves the filesystem path backing `id`.
    ///
    /// ## Errors
    /// Returns `OutsideBase` for identifiers not under the store's base and
    /// `InvalidPath` for dot segments or embedded separators.
    pub fn path_for(&self, id: &ResourceId) -> StoreResult<PathBuf> {
        if id != &self.base && !self.base.contains(id) {
            return Err(StoreError::OutsideBase(id.to_string()));
        }

        let relative = &id.path()[self.base.path().len()..];
        let mut path = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StoreError::InvalidPath(id.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    async fn list(&self, id: &ResourceId, path: &Path) -> StoreResult<Vec<ResourceId>> {
        let mut members = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::warn!(path = ?entry.path(), "Skipping non UTF-8 file name");
                continue;
            };
            let member = if entry.file_type().await?.is_dir() {
                id.join(&format!("{name}/"))?
            } else {
                id.join(&name)?
            };
            members.push(member);
        }

        members.sort();
        Ok(members)
    }
}

impl GraphStore for FileStore {
    #[tracing::instrument(skip(self), fields(id = %id))]
    fn read<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, Option<Resource>> {
        Box::pin(async move {
            let path = self.path_for(id)?;
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            match (id.is_container(), metadata.is_dir()) {
                (true, true) => Ok(Some(Resource::Container(self.list(id, &path).await?))),
                (false, false) => Ok(Some(Resource::Document(tokio::fs::read(&path).await?))),
                _ => Ok(None),
            }
        })
    }

    fn exists<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let path = self.path_for(id)?;
            match tokio::fs::metadata(&path).await {
                Ok(metadata) => Ok(metadata.is_dir() == id.is_container()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    #[tracing::instrument(skip(self, body), fields(id = %id, len = body.len()))]
    fn write<'a>(&'a self, id: &'a ResourceId, body: Vec<u8>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let path = self.path_for(id)?;
            if id.is_container() {
                tokio::fs::create_dir_all(&path).await?;
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, body).await?;
            tracing::debug!("Document written");
            Ok(())
        })
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    fn delete<'a>(&'a self, id: &'a ResourceId) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let path = self.path_for(id)?;
            let result = if id.is_container() {
                tokio::fs::remove_dir(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };

            match result {
                Ok(()) => {
                    tracing::debug!("Resource deleted");
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(StoreError::NotFound(id.to_string()))
                }
                Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                    Err(StoreError::NotEmpty(id.to_string()))
                }
                // Removing a file through a container id and vice versa.
                Err(e) if matches!(e.kind(), ErrorKind::NotADirectory | ErrorKind::IsADirectory) => {
                    Err(StoreError::NotFound(id.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}
