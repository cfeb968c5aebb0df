//! Read-through / write-through coordination of the entry and index caches.
//!
//! [`CachingRepository`] wraps a [`ConfigRepository`] and keeps two caches in
//! step with it:
//!
//! - the entry cache, one record per name, holding the entity or the fact
//!   that the store had none;
//! - the index cache, the full name set of the moniker.
//!
//! Store calls always come first. A failed store call leaves both caches as
//! they were. Only [`CachingRepository::list`] creates the index; point
//! operations adjust it while it is live and leave it absent otherwise.
//! Whatever drifts (concurrent writers, other processes) is corrected when
//! the records expire.

use std::sync::Arc;
use std::time::Duration;

use renderhub_core::{ConfigEntity, Result};
use renderhub_store::ConfigRepository;
use tracing::{debug, info, instrument, warn};

use crate::config::CacheConfig;
use crate::entry::{Cached, EntryCache};
use crate::index::IndexCache;
use crate::keys::CacheKey;

/// The pair of caches a coordinator works against.
///
/// Handles are cheap to clone; clones share storage. Coordinators of the
/// same entity type may share one set of handles, their records are kept
/// apart by moniker.
pub struct CacheHandles<T> {
    pub entries: EntryCache<T>,
    pub index: IndexCache,
}

impl<T: Send + Sync + 'static> CacheHandles<T> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: EntryCache::new(config.max_capacity),
            index: IndexCache::new(),
        }
    }
}

impl<T> Clone for CacheHandles<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
        }
    }
}

/// A cached view over a [`ConfigRepository`].
pub struct CachingRepository<T> {
    moniker: String,
    inner: Arc<dyn ConfigRepository<T>>,
    entries: EntryCache<T>,
    index: IndexCache,
    entry_ttl: Duration,
    index_ttl: Duration,
}

impl<T> CachingRepository<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a coordinator for `moniker` in front of `inner`.
    pub fn new(
        moniker: impl Into<String>,
        inner: Arc<dyn ConfigRepository<T>>,
        handles: CacheHandles<T>,
        config: &CacheConfig,
    ) -> Self {
        let moniker = moniker.into();
        info!(
            moniker = %moniker,
            entry_ttl = ?config.entry_ttl,
            index_ttl = ?config.index_ttl,
            "caching repository created"
        );
        Self {
            moniker,
            inner,
            entries: handles.entries,
            index: handles.index,
            entry_ttl: config.entry_ttl,
            index_ttl: config.index_ttl,
        }
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    fn key(&self, name: &str) -> CacheKey {
        CacheKey::new(self.moniker.as_str(), name)
    }

    /// Returns the record stored under `name`.
    ///
    /// On a miss the store is asked and its answer is cached, absence
    /// included. When the index is live the name is added to it, even if
    /// the store had no such record.
    #[instrument(skip(self), fields(moniker = %self.moniker))]
    pub async fn get(&self, name: &str) -> Result<Cached<T>> {
        self.entries
            .get_or_populate(self.key(name), self.entry_ttl, async {
                let fetched = self.inner.get(name).await?;
                debug!(found = fetched.is_some(), "fetched from store");
                self.index.add_if_populated(&self.moniker, name).await;
                Ok(fetched)
            })
            .await
    }

    /// Returns every known record name, listing the store when the index
    /// is absent or expired.
    #[instrument(skip(self), fields(moniker = %self.moniker))]
    pub async fn list(&self) -> Result<Vec<String>> {
        self.index
            .get_or_populate(&self.moniker, self.index_ttl, self.inner.list())
            .await
    }

    /// Stores `entity` under `new_name`.
    ///
    /// `original_name` is `None` for a new record. When it names a different
    /// record this is a rename and the original record is removed from the
    /// store. The written entity replaces whatever the entry cache held.
    /// A `get` whose store fetch is still in flight when this call caches
    /// the entity can finish afterwards and put the older record back; that
    /// record then lives until its entry TTL runs out.
    ///
    /// If the new record is written but removing the original one fails,
    /// the store holds both. The error is returned; the new name is evicted
    /// so the next read goes to the store, and the original name stays
    /// cached because it still exists.
    #[instrument(skip(self, entity), fields(moniker = %self.moniker))]
    pub async fn update(&self, entity: T, new_name: &str, original_name: Option<&str>) -> Result<()> {
        let renamed_from = original_name.filter(|original| *original != new_name);

        self.inner.write(new_name, &entity).await?;

        if let Err(e) = self.inner.delete_if_renamed(new_name, renamed_from).await {
            warn!(
                original = ?renamed_from,
                error = %e,
                "record written but original not removed; both names are stored"
            );
            self.entries.evict(&self.key(new_name)).await;
            self.index.add_if_populated(&self.moniker, new_name).await;
            return Err(e);
        }

        self.entries
            .set(self.key(new_name), Some(Arc::new(entity)), self.entry_ttl)
            .await;

        match renamed_from {
            Some(original) => {
                self.index.remove_if_populated(&self.moniker, original).await;
                self.index.add_if_populated(&self.moniker, new_name).await;
                self.entries.evict(&self.key(original)).await;
                debug!(original = %original, "renamed");
            }
            None => {
                self.index.add_if_populated(&self.moniker, new_name).await;
            }
        }

        Ok(())
    }

    /// Removes the record stored under `name`, returning whether it existed.
    ///
    /// The store deletion completes before either cache is touched.
    #[instrument(skip(self), fields(moniker = %self.moniker))]
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let existed = self.inner.remove(name).await?;

        self.index.remove_if_populated(&self.moniker, name).await;
        self.entries.evict(&self.key(name)).await;

        debug!(existed, "removed");
        Ok(existed)
    }

    /// Drops the index and every entry record of this moniker.
    ///
    /// The store is not touched; the next reads reload from it.
    pub async fn invalidate(&self) -> usize {
        self.index.invalidate(&self.moniker).await;
        let dropped = self.entries.invalidate_moniker(&self.moniker).await;
        info!(moniker = %self.moniker, entries = dropped, "cache invalidated");
        dropped
    }
}

impl<T> CachingRepository<T>
where
    T: ConfigEntity,
{
    /// Creates a coordinator using the entity type's own moniker.
    pub fn for_entity(
        inner: Arc<dyn ConfigRepository<T>>,
        handles: CacheHandles<T>,
        config: &CacheConfig,
    ) -> Self {
        Self::new(T::MONIKER, inner, handles, config)
    }

    /// Stores `entity` under its own name.
    pub async fn save(&self, entity: T, original_name: Option<&str>) -> Result<()> {
        let name = entity.name().to_owned();
        self.update(entity, &name, original_name).await
    }
}
