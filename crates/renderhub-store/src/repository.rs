//! Typed configuration repositories.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use renderhub_core::names::validate_name;
use renderhub_core::{codec, ConfigEntity, Result};
use tracing::{debug, instrument};

use crate::blob::BlobStore;

/// Durable, named storage of configuration records of one type.
///
/// A missing record is `Ok(None)` from [`get`](Self::get) and `Ok(false)`
/// from [`remove`](Self::remove). A rename is a [`write`](Self::write) under
/// the new name followed by [`delete_if_renamed`](Self::delete_if_renamed);
/// callers run the two steps themselves so they can react to each failure.
#[async_trait]
pub trait ConfigRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Reads a record.
    async fn get(&self, name: &str) -> Result<Option<T>>;

    /// Creates or overwrites a record.
    async fn write(&self, name: &str, entity: &T) -> Result<()>;

    /// Removes a record, returning whether it existed.
    async fn remove(&self, name: &str) -> Result<bool>;

    /// Lists the names of every stored record.
    async fn list(&self) -> Result<Vec<String>>;

    /// Removes the record stored under `original_name` when it differs from
    /// `new_name`.
    async fn delete_if_renamed(&self, new_name: &str, original_name: Option<&str>) -> Result<()> {
        match original_name {
            Some(original) if original != new_name => {
                self.remove(original).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// A [`ConfigRepository`] storing JSON records in one container of a
/// [`BlobStore`].
pub struct BlobConfigRepository<T> {
    store: Arc<dyn BlobStore>,
    container: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BlobConfigRepository<T> {
    /// Creates a repository over `container` in `store`.
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
            _marker: PhantomData,
        }
    }

    /// Returns the container name.
    pub fn container(&self) -> &str {
        &self.container
    }
}

impl<T> std::fmt::Debug for BlobConfigRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobConfigRepository")
            .field("store", &self.store.name())
            .field("container", &self.container)
            .finish()
    }
}

#[async_trait]
impl<T: ConfigEntity> ConfigRepository<T> for BlobConfigRepository<T> {
    async fn get(&self, name: &str) -> Result<Option<T>> {
        match self.store.get(&self.container, name).await? {
            Some(bytes) => codec::decode(name, &bytes).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, entity), fields(container = %self.container))]
    async fn write(&self, name: &str, entity: &T) -> Result<()> {
        validate_name(name)?;
        let bytes = codec::encode(name, entity)?;
        self.store.put(&self.container, name, bytes).await?;
        debug!("record written");
        Ok(())
    }

    #[instrument(skip(self), fields(container = %self.container))]
    async fn remove(&self, name: &str) -> Result<bool> {
        let existed = self.store.delete_if_exists(&self.container, name).await?;
        debug!(existed, "record removed");
        Ok(existed)
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.store.list_names(&self.container).await
    }
}
