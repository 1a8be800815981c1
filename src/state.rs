//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Resolved embed source cache
//! - Page templates
//! - Metrics and the hit counter
//! - Server configuration

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStats, Clock, SystemClock, TtlCache};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::metrics::{HitCounter, Metrics};
use crate::templates::Templates;

/// Application state shared across all handlers
pub struct AppState {
    /// Resolved iframe sources (namespaced key -> source URL)
    pub embed_cache: TtlCache<String>,

    /// Compiled page templates
    pub templates: Templates,

    /// Request and cache metrics
    pub metrics: Metrics,

    /// Uptime monitor hit counter
    pub hits: HitCounter,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new AppState whose cache reads time from `clock`
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            embed_cache: TtlCache::with_clock(clock),
            templates: Templates::new()?,
            metrics: Metrics::new(),
            hits: HitCounter::new(),
            config,
        })
    }

    /// How long a resolved source stays cached
    pub fn cache_ttl(&self) -> Duration {
        self.config.cache.ttl()
    }

    /// Cached source for `key`, counting the lookup as a hit or miss
    pub fn cached_source(&self, key: &str) -> Option<String> {
        let cached = self.embed_cache.get(key);
        if cached.is_some() {
            self.metrics.record_cache_hit();
        } else {
            self.metrics.record_cache_miss();
        }
        cached
    }

    /// Remember a resolved source for the configured TTL
    pub fn cache_source(&self, key: String, src: String) {
        self.embed_cache.set(key, src, self.cache_ttl());
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.embed_cache.stats()
    }
}
