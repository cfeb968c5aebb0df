//! Per-record entry cache using Moka.
//!
//! Records are cached whether or not the store had them: a cached `None`
//! answers later reads without touching the store, exactly like a cached
//! value, and expires the same way. Every record carries its own TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use renderhub_core::{Result, StoreError};
use tracing::trace;

use crate::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// A cached lookup result: the record, or the fact that the store had none.
pub type Cached<T> = Option<Arc<T>>;

struct Slot<T> {
    value: Cached<T>,
    ttl: Duration,
}

/// Expires each slot after the TTL it was stored with.
struct SlotExpiry;

impl<T> Expiry<CacheKey, Arc<Slot<T>>> for SlotExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Arc<Slot<T>>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Arc<Slot<T>>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache de registros individuales, keyed by moniker and name.
/// Thread-safe y async-friendly; clones share the same storage.
///
/// Metrics name the cache after `T`, so the `renderhub_cache_entries` gauge
/// has one series per entity type.
pub struct EntryCache<T> {
    inner: Cache<CacheKey, Arc<Slot<T>>>,
    metrics: CacheMetrics,
}

impl<T> Clone for EntryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> EntryCache<T> {
    /// Crea un nuevo cache con la capacidad dada.
    pub fn new(max_capacity: u64) -> Self {
        let metrics = CacheMetrics::new("entry", type_label::<T>());

        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(SlotExpiry)
            .eviction_listener(move |key: Arc<CacheKey>, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                trace!(key = %key, cause = reason, "entry removed");
                eviction_metrics.record_eviction(key.moniker(), reason);
            })
            .build();

        Self { inner, metrics }
    }

    /// Returns the cached lookup result, or `None` on a miss.
    ///
    /// A hit may itself be `Some(None)`: the store was asked and had no
    /// record under this name.
    pub async fn get(&self, key: &CacheKey) -> Option<Cached<T>> {
        match self.inner.get(key).await {
            Some(slot) => {
                self.metrics.record_hit(key.moniker());
                Some(slot.value.clone())
            }
            None => {
                self.metrics.record_miss(key.moniker());
                None
            }
        }
    }

    /// Inserts or overwrites a record, resetting its expiry to `ttl`.
    pub async fn set(&self, key: CacheKey, value: Cached<T>, ttl: Duration) {
        self.inner.insert(key, Arc::new(Slot { value, ttl })).await;
        self.refresh_entry_gauge().await;
    }

    /// Removes a record immediately.
    pub async fn evict(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
        self.refresh_entry_gauge().await;
    }

    /// Returns the cached result for `key`, running `init` on a miss and
    /// caching what it returns for `ttl`.
    ///
    /// Concurrent misses on the same key share a single `init` run. If
    /// `init` fails nothing is cached and every waiter gets the error.
    pub async fn get_or_populate<F>(&self, key: CacheKey, ttl: Duration, init: F) -> Result<Cached<T>>
    where
        F: Future<Output = Result<Option<T>>>,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok(cached);
        }

        let moniker = key.moniker().to_owned();
        let start = Instant::now();
        let slot = self
            .inner
            .try_get_with(key, async {
                let value = init.await?;
                Ok::<_, StoreError>(Arc::new(Slot {
                    value: value.map(Arc::new),
                    ttl,
                }))
            })
            .await
            .map_err(Arc::unwrap_or_clone)?;

        self.metrics.record_load_duration(&moniker, start.elapsed());
        self.refresh_entry_gauge().await;

        Ok(slot.value.clone())
    }

    /// Removes every record of one moniker. Returns how many were dropped.
    pub async fn invalidate_moniker(&self, moniker: &str) -> usize {
        let keys: Vec<Arc<CacheKey>> = self
            .inner
            .iter()
            .filter(|(key, _)| key.moniker() == moniker)
            .map(|(key, _)| key)
            .collect();

        for key in &keys {
            self.inner.invalidate(key.as_ref()).await;
        }
        self.refresh_entry_gauge().await;
        keys.len()
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs pending maintenance so `entry_count` is exact.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Publica el numero de entries. Pending maintenance runs first, so the
    /// gauge reflects the write that triggered it.
    async fn refresh_entry_gauge(&self) {
        self.inner.run_pending_tasks().await;
        self.metrics.update_entry_count(self.inner.entry_count());
    }
}

/// Last path segment of `T`'s type name, e.g. `RenderingEnvironment`.
fn type_label<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
