//! Cache-aside layer in front of the render engine.
//!
//! - `hasher`: content digests used as key fragments
//! - `keys`: canonical key objects and the namespaced URL keys derived from them
//! - `store`: the `CacheStore` façade plus the in-process and no-op adapters
//! - `aside`: get-or-compute-and-store with an explicit failure policy
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 4096
//! ttl_seconds = 43200
//! namespace = "https://cache.example.com/"
//! failure_policy = "fail-open"
//! ```

mod aside;
mod config;
mod hasher;
mod keys;
mod lock;
mod store;

pub use aside::{
    CACHE_HIT_METRIC, CACHE_MISS_METRIC, CACHE_STORE_ERROR_METRIC, COMPUTE_MS_METRIC, CacheAside,
    CacheAsideError, CacheOutcome, FailurePolicy,
};
pub use config::CacheConfig;
pub(crate) use config::{DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS};
pub use hasher::{ContentHasher, Sha256Hasher};
pub use keys::{
    CacheKey, CacheKeyError, CacheKeyObject, CacheNamespace, DEFAULT_NAMESPACE, HighlightKey,
    ThemeKey,
};
pub use store::{
    CacheEntry, CacheStore, CacheStoreError, CachedResponse, MemoryCacheStore, NoopCacheStore,
    TEXT_ENTRY_CONTENT_TYPE,
};

use std::sync::Arc;

/// Pick the store adapter for `config`: caching switched off means every lookup misses.
pub fn build_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    if config.enabled {
        Arc::new(MemoryCacheStore::new(config))
    } else {
        Arc::new(NoopCacheStore)
    }
}

impl CacheAside {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            build_store(config),
            config.namespace.clone(),
            config.failure_policy,
        )
    }
}
