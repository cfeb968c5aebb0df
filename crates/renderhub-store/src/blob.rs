//! Blob store trait definition.

use async_trait::async_trait;
use renderhub_core::Result;

/// A durable key/value store of opaque blobs grouped into containers.
///
/// This trait abstracts over the storage backend (in-memory, local disk,
/// cloud blob storage) so repositories do not know where records live.
///
/// # Contract
///
/// - A missing blob or a missing container is a normal result: `get`
///   returns `Ok(None)`, `delete_if_exists` returns `Ok(false)` and
///   `list_names` returns an empty list.
/// - `put` creates the container when it does not exist yet.
/// - Errors are reserved for genuine failures (I/O, connectivity).
///
/// # Implementors
///
/// - `MemoryBlobStore` - process-local, for tests and demos
/// - `FsBlobStore` - one directory per container on local disk
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads a blob.
    async fn get(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>>;

    /// Creates or overwrites a blob.
    async fn put(&self, container: &str, name: &str, content: Vec<u8>) -> Result<()>;

    /// Deletes a blob, returning whether it existed.
    async fn delete_if_exists(&self, container: &str, name: &str) -> Result<bool>;

    /// Lists the names of every blob in a container.
    async fn list_names(&self, container: &str) -> Result<Vec<String>>;

    /// Returns the name of this store.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;

    /// Performs a health check on the store.
    ///
    /// The default implementation always succeeds.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
