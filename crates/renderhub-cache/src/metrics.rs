//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("renderhub_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("renderhub_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "renderhub_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("renderhub_cache_entries", "Current number of records in cache");
    metrics::describe_histogram!(
        "renderhub_cache_load_seconds",
        "Time spent loading records from the store on a miss"
    );
}

/// Recorder de metricas de una capa de cache (`entry` o `index`).
/// Usa atomic counters internos para `hit_rate`.
///
/// `cache` names the cache instance; gauges describing the whole instance
/// are labelled with it so several caches of one level keep separate series.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    level: &'static str,
    cache: &'static str,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new(level: &'static str, cache: &'static str) -> Self {
        Self {
            level,
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn cache(&self) -> &'static str {
        self.cache
    }

    /// Registra un cache hit
    pub fn record_hit(&self, moniker: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!(
            "renderhub_cache_hits_total",
            "moniker" => moniker.to_string(),
            "level" => self.level
        )
        .increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self, moniker: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!(
            "renderhub_cache_misses_total",
            "moniker" => moniker.to_string(),
            "level" => self.level
        )
        .increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, moniker: &str, cause: &'static str) {
        counter!(
            "renderhub_cache_evictions_total",
            "moniker" => moniker.to_string(),
            "level" => self.level,
            "cause" => cause
        )
        .increment(1);
    }

    pub fn update_entry_count(&self, count: u64) {
        gauge!(
            "renderhub_cache_entries",
            "level" => self.level,
            "cache" => self.cache
        )
        .set(count as f64);
    }

    /// Registra la duracion de una carga desde el store
    pub fn record_load_duration(&self, moniker: &str, duration: Duration) {
        histogram!(
            "renderhub_cache_load_seconds",
            "moniker" => moniker.to_string(),
            "level" => self.level
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
