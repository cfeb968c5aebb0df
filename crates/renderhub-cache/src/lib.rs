//! # RenderHub Cache
//!
//! Two-level cache in front of a [`ConfigRepository`](renderhub_store::ConfigRepository).
//!
//! - [`EntryCache`]: one record per `(moniker, name)`, holding the entity or
//!   the fact that the store had none.
//! - [`IndexCache`]: the full name set of a moniker, created only by a full
//!   listing and kept up to date by point writes while it lives.
//! - [`CachingRepository`]: the coordinator keeping both in step with the
//!   store across reads, writes, renames and removals.
//!
//! Both caches are bounded by TTL (15 minutes by default). Changes made behind
//! a coordinator's back, by another process or directly on the store, become
//! visible once the affected records expire.

pub mod config;
pub mod coordinator;
pub mod entry;
pub mod index;
pub mod keys;
pub mod metrics;

// Re-exports
pub use config::CacheConfig;
pub use coordinator::{CacheHandles, CachingRepository};
pub use entry::{Cached, EntryCache};
pub use index::{IndexCache, IndexRecord};
pub use keys::CacheKey;
pub use metrics::{CacheMetrics, register_cache_metrics};
