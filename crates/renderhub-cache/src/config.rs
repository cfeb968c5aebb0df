//! Cache configuration.

use std::time::Duration;

/// Default lifetime of entry and index records.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Configuracion del cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL of an entry cache record (default: 15 minutes)
    pub entry_ttl: Duration,
    /// TTL of an index cache record (default: 15 minutes)
    pub index_ttl: Duration,
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_TTL,
            index_ttl: DEFAULT_TTL,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    pub fn with_index_ttl(mut self, ttl: Duration) -> Self {
        self.index_ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}
