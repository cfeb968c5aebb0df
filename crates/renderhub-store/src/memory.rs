//! In-memory blob store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use renderhub_core::Result;
use tracing::debug;

use crate::blob::BlobStore;

/// A process-local [`BlobStore`].
///
/// Containers are created on first write. Names are listed in sorted order.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    containers: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of blobs in a container.
    pub fn len(&self, container: &str) -> usize {
        self.containers
            .read()
            .get(container)
            .map_or(0, BTreeMap::len)
    }

    /// Returns true if the container holds no blobs.
    pub fn is_empty(&self, container: &str) -> bool {
        self.len(container) == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>> {
        let containers = self.containers.read();
        Ok(containers
            .get(container)
            .and_then(|blobs| blobs.get(name))
            .cloned())
    }

    async fn put(&self, container: &str, name: &str, content: Vec<u8>) -> Result<()> {
        debug!(container = %container, name = %name, bytes = content.len(), "put blob");
        self.containers
            .write()
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), content);
        Ok(())
    }

    async fn delete_if_exists(&self, container: &str, name: &str) -> Result<bool> {
        let removed = self
            .containers
            .write()
            .get_mut(container)
            .is_some_and(|blobs| blobs.remove(name).is_some());
        debug!(container = %container, name = %name, removed, "delete blob");
        Ok(removed)
    }

    async fn list_names(&self, container: &str) -> Result<Vec<String>> {
        let containers = self.containers.read();
        Ok(containers
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
