//! `src/cache/cache_manager.rs`
//! ============================================================================
//! # Border-name cache
//!
//! Remembers display names fetched by the border-name batch lookup so revisits
//! of a detail view do not refetch them. Only successful lookups are stored;
//! a failed batch leaves nothing behind and is retried next time.
//! - TTL eviction (moka)
//! - Hit/miss/eviction statistics

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use moka::future::Cache;
use tracing::{debug, instrument};

use crate::{config::CacheConfig, model::country::CountryCode};

/// Cache statistics for monitoring and debugging
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

impl CacheStatsSnapshot {
    #[expect(clippy::cast_precision_loss, reason = "Expected precision loss")]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Async TTL cache of country code → display name.
#[derive(Clone)]
pub struct NameCache {
    inner: Cache<CountryCode, Arc<str>>,
    config: CacheConfig,
    stats: Arc<CacheStats>,
}

impl NameCache {
    /// Create a new cache with custom configuration
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        let cache_builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl);

        let stats = Arc::new(CacheStats::default());

        let inner = if config.enable_stats {
            let stats_clone = stats.clone();
            cache_builder
                .eviction_listener(move |_key, _value, _cause| {
                    stats_clone.record_eviction();
                })
                .build()
        } else {
            cache_builder.build()
        };

        Self {
            inner,
            config,
            stats,
        }
    }

    /// Create cache with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn get(&self, code: &CountryCode) -> Option<Arc<str>> {
        let found = self.inner.get(code).await;
        if self.config.enable_stats {
            if found.is_some() {
                self.stats.record_hit();
            } else {
                self.stats.record_miss();
            }
        }
        found
    }

    /// Split `codes` into cached names and codes still missing, in input order.
    #[instrument(level = "debug", skip_all, fields(requested = codes.len()))]
    pub async fn get_many(
        &self,
        codes: &[CountryCode],
    ) -> (Vec<(CountryCode, Arc<str>)>, Vec<CountryCode>) {
        let start = Instant::now();
        let mut found = Vec::with_capacity(codes.len());
        let mut missing = Vec::new();

        for code in codes {
            match self.get(code).await {
                Some(name) => found.push((code.clone(), name)),
                None => missing.push(code.clone()),
            }
        }

        debug!(
            marker = "CACHE_OPERATION",
            operation_type = "get_many",
            hits = found.len(),
            misses = missing.len(),
            lookup_time_us = start.elapsed().as_micros(),
            "Border name cache lookup"
        );
        (found, missing)
    }

    pub async fn insert(&self, code: CountryCode, name: &str) {
        self.inner.insert(code, Arc::from(name)).await;
        if self.config.enable_stats {
            self.stats.record_insert();
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new()
    }
}
