//! Filesystem blob store.
//!
//! Each container is a directory under the store root and each blob is a
//! file inside it. Writes go to a hidden temporary file first and are then
//! renamed into place, so readers never observe a partially written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use renderhub_core::names::validate_name;
use renderhub_core::{Result, StoreError};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::blob::BlobStore;

const TEMP_PREFIX: char = '.';

/// A [`BlobStore`] backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf> {
        validate_name(container)?;
        Ok(self.root.join(container))
    }

    fn blob_path(&self, container: &str, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        if name.starts_with(TEMP_PREFIX) {
            return Err(StoreError::invalid_name(name, "must not start with '.'"));
        }
        Ok(self.container_dir(container)?.join(name))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(container, name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(name, e)),
        }
    }

    #[instrument(skip(self, content), fields(store = "fs", bytes = content.len()))]
    async fn put(&self, container: &str, name: &str, content: Vec<u8>) -> Result<()> {
        let path = self.blob_path(container, name)?;
        let dir = self.container_dir(container)?;
        // One temporary file per write; concurrent puts on a name must not share it.
        let temp = dir.join(format!("{}{}.{}.tmp", TEMP_PREFIX, name, Uuid::now_v7()));

        match tokio::fs::write(&temp, &content).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "creating container directory");
                tokio::fs::create_dir_all(&dir)
                    .await
                    .map_err(|e| StoreError::io(container, e))?;
                tokio::fs::write(&temp, &content)
                    .await
                    .map_err(|e| StoreError::io(name, e))?;
            }
            Err(e) => return Err(StoreError::io(name, e)),
        }

        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!(error = %cleanup, "failed to remove temporary blob");
            }
            return Err(StoreError::io(name, e));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(store = "fs"))]
    async fn delete_if_exists(&self, container: &str, name: &str) -> Result<bool> {
        let path = self.blob_path(container, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(name, e)),
        }
    }

    async fn list_names(&self, container: &str) -> Result<Vec<String>> {
        let dir = self.container_dir(container)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(container, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(container, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StoreError::io(container, e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.starts_with(TEMP_PREFIX) => names.push(name),
                Ok(_) => {}
                Err(raw) => warn!(file = ?raw, "skipping non UTF-8 blob name"),
            }
        }

        names.sort();
        Ok(names)
    }

    fn name(&self) -> &str {
        "fs"
    }

    async fn health_check(&self) -> Result<()> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::unavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            // Not created yet; the first write creates it.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(self.root.display().to_string(), e)),
        }
    }
}
