//! Shared helpers for coordinator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use renderhub_cache::{CacheConfig, CacheHandles, CachingRepository};
use renderhub_core::{RenderingEnvironment, Result, StoreError};
use renderhub_store::{BlobConfigRepository, ConfigRepository, MemoryBlobStore};

/// The repository under the coordinator.
///
/// Wraps a plain blob repository, counts store reads and can be told to fail.
/// Tests use [`TestRepository::direct`] to change the store behind the
/// coordinator's back.
pub struct TestRepository {
    direct: BlobConfigRepository<RenderingEnvironment>,
    pub fetches: AtomicU32,
    pub listings: AtomicU32,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_removes: AtomicBool,
    pub fetch_delay: Option<Duration>,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::with_fetch_delay(None)
    }

    pub fn with_fetch_delay(fetch_delay: Option<Duration>) -> Self {
        Self {
            direct: BlobConfigRepository::new(Arc::new(MemoryBlobStore::new()), "environments"),
            fetches: AtomicU32::new(0),
            listings: AtomicU32::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
            fetch_delay,
        }
    }

    /// The store itself, bypassing failure injection and counters.
    pub fn direct(&self) -> &BlobConfigRepository<RenderingEnvironment> {
        &self.direct
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn listings(&self) -> u32 {
        self.listings.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("injected failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConfigRepository<RenderingEnvironment> for TestRepository {
    async fn get(&self, name: &str) -> Result<Option<RenderingEnvironment>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        Self::check(&self.fail_reads)?;
        self.direct.get(name).await
    }

    async fn write(&self, name: &str, entity: &RenderingEnvironment) -> Result<()> {
        Self::check(&self.fail_writes)?;
        self.direct.write(name, entity).await
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        Self::check(&self.fail_removes)?;
        self.direct.remove(name).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads)?;
        self.direct.list().await
    }
}

/// A coordinator and the repository behind it.
pub struct Harness {
    pub repo: Arc<TestRepository>,
    pub outer: Arc<CachingRepository<RenderingEnvironment>>,
}

pub fn harness() -> Harness {
    harness_with(CacheConfig::default(), TestRepository::new())
}

pub fn harness_with(config: CacheConfig, repo: TestRepository) -> Harness {
    let repo = Arc::new(repo);
    let inner: Arc<dyn ConfigRepository<RenderingEnvironment>> = repo.clone();
    let outer = CachingRepository::for_entity(inner, CacheHandles::new(&config), &config);
    Harness {
        repo,
        outer: Arc::new(outer),
    }
}

/// Creates an environment record.
pub fn env(name: &str) -> RenderingEnvironment {
    let mut env = RenderingEnvironment::new(name);
    env.location_name = Some("West US 2".to_string());
    env
}

/// Returns `env` renamed to `name`.
pub fn renamed(env: &RenderingEnvironment, name: &str) -> RenderingEnvironment {
    let mut renamed = env.clone();
    renamed.set_name(name);
    renamed
}
