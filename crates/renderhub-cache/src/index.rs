//! Name index cache.
//!
//! Holds, per moniker, the set of record names known to exist. The set is
//! only ever created from a full store listing ([`IndexCache::populate`] or
//! [`IndexCache::get_or_populate`]); point operations may add or remove names
//! while it is live but never create it. Mutating the set does not extend its
//! lifetime.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashSet;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use renderhub_core::{Result, StoreError};
use tracing::trace;

use crate::metrics::CacheMetrics;

/// The live name set of one moniker.
#[derive(Debug)]
pub struct IndexRecord {
    names: DashSet<String>,
    ttl: Duration,
}

impl IndexRecord {
    fn new(names: impl IntoIterator<Item = String>, ttl: Duration) -> Self {
        Self {
            names: names.into_iter().collect(),
            ttl,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sorted copy of the current names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().map(|name| name.key().clone()).collect();
        names.sort();
        names
    }
}

struct RecordExpiry;

impl Expiry<String, Arc<IndexRecord>> for RecordExpiry {
    fn expire_after_create(
        &self,
        _moniker: &String,
        record: &Arc<IndexRecord>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(record.ttl)
    }

    fn expire_after_update(
        &self,
        _moniker: &String,
        record: &Arc<IndexRecord>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(record.ttl)
    }
}

/// Cache del indice de nombres, una entrada por moniker.
#[derive(Clone)]
pub struct IndexCache {
    inner: Cache<String, Arc<IndexRecord>>,
    metrics: CacheMetrics,
}

impl IndexCache {
    pub fn new() -> Self {
        let metrics = CacheMetrics::new("index", "monikers");

        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .expire_after(RecordExpiry)
            .eviction_listener(move |moniker: Arc<String>, _record, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                trace!(moniker = %moniker, cause = reason, "index removed");
                eviction_metrics.record_eviction(&moniker, reason);
            })
            .build();

        Self { inner, metrics }
    }

    /// Returns the live record if the index of `moniker` is populated.
    pub async fn try_get(&self, moniker: &str) -> Option<Arc<IndexRecord>> {
        self.inner.get(moniker).await
    }

    /// Replaces the index of `moniker` with `names`, valid for `ttl`.
    pub async fn populate(
        &self,
        moniker: &str,
        names: impl IntoIterator<Item = String>,
        ttl: Duration,
    ) -> Arc<IndexRecord> {
        let record = Arc::new(IndexRecord::new(names, ttl));
        self.inner
            .insert(moniker.to_string(), Arc::clone(&record))
            .await;
        record
    }

    /// Adds `name` to the index of `moniker` if it is populated.
    pub async fn add_if_populated(&self, moniker: &str, name: &str) -> bool {
        match self.inner.get(moniker).await {
            Some(record) => {
                record.names.insert(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Removes `name` from the index of `moniker` if it is populated.
    pub async fn remove_if_populated(&self, moniker: &str, name: &str) -> bool {
        match self.inner.get(moniker).await {
            Some(record) => {
                record.names.remove(name);
                true
            }
            None => false,
        }
    }

    /// Returns the names of `moniker`, loading them with `load` when the
    /// index is absent or expired.
    ///
    /// Concurrent callers on an absent index share one `load` run.
    pub async fn get_or_populate<F>(&self, moniker: &str, ttl: Duration, load: F) -> Result<Vec<String>>
    where
        F: Future<Output = Result<Vec<String>>>,
    {
        if let Some(record) = self.inner.get(moniker).await {
            self.metrics.record_hit(moniker);
            return Ok(record.names());
        }
        self.metrics.record_miss(moniker);

        let start = Instant::now();
        let record = self
            .inner
            .try_get_with(moniker.to_string(), async {
                let names = load.await?;
                Ok::<_, StoreError>(Arc::new(IndexRecord::new(names, ttl)))
            })
            .await
            .map_err(Arc::unwrap_or_clone)?;
        self.metrics.record_load_duration(moniker, start.elapsed());

        Ok(record.names())
    }

    /// Drops the index of `moniker`.
    pub async fn invalidate(&self, moniker: &str) {
        self.inner.invalidate(moniker).await;
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const MONIKER: &str = "ENVIRONMENT";
    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_absent_until_populated() {
        let index = IndexCache::new();

        assert!(index.try_get(MONIKER).await.is_none());
        assert!(!index.add_if_populated(MONIKER, "a").await);
        assert!(!index.remove_if_populated(MONIKER, "a").await);
        assert!(index.try_get(MONIKER).await.is_none());
    }

    #[tokio::test]
    async fn test_mutations_apply_once_populated() {
        let index = IndexCache::new();
        index
            .populate(MONIKER, vec!["a".to_string(), "b".to_string()], TTL)
            .await;

        assert!(index.add_if_populated(MONIKER, "c").await);
        assert!(index.remove_if_populated(MONIKER, "a").await);

        let record = index.try_get(MONIKER).await.unwrap();
        assert_eq!(record.names(), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let index = IndexCache::new();
        index.populate(MONIKER, vec!["a".to_string()], TTL).await;

        index.add_if_populated(MONIKER, "a").await;
        index.add_if_populated(MONIKER, "a").await;

        assert_eq!(index.try_get(MONIKER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_do_not_extend_ttl() {
        let index = IndexCache::new();
        index.populate(MONIKER, Vec::new(), Duration::from_millis(200)).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(index.add_if_populated(MONIKER, "a").await);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(index.try_get(MONIKER).await.is_none());
    }

    #[tokio::test]
    async fn test_monikers_are_independent() {
        let index = IndexCache::new();
        index.populate(MONIKER, Vec::new(), TTL).await;

        assert!(!index.add_if_populated("PACKAGE", "a").await);
        assert!(index.try_get("PACKAGE").await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_populate_loads_once() {
        let index = IndexCache::new();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let names = index
                .get_or_populate(MONIKER, TTL, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["b".to_string(), "a".to_string()])
                })
                .await
                .unwrap();
            assert_eq!(names, vec!["a", "b"]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.metrics().misses(), 1);
        assert_eq!(index.metrics().hits(), 2);
    }

    #[tokio::test]
    async fn test_get_or_populate_failure_leaves_absent() {
        let index = IndexCache::new();

        let err = index
            .get_or_populate(MONIKER, TTL, async {
                Err(StoreError::unavailable("listing failed"))
            })
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert!(index.try_get(MONIKER).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let index = IndexCache::new();
        index.populate(MONIKER, vec!["a".to_string()], TTL).await;

        index.invalidate(MONIKER).await;

        assert!(index.try_get(MONIKER).await.is_none());
    }
}
