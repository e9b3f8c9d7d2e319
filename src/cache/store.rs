//! Cache storage façade and its adapters.
//!
//! `CacheStore` is the only way the request path touches the shared cache.
//! Entries are written once per key and never mutated in place; expiry and
//! eviction belong to the store.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use thiserror::Error;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

/// Content type replayed for bare text entries.
pub const TEXT_ENTRY_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

impl CacheStoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Response snapshot that survives a store round trip with its headers intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn ok(headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            headers,
            body: body.into(),
        }
    }

    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Stored value: bare text, or a full response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Text(String),
    Response(CachedResponse),
}

impl CacheEntry {
    /// Replay the entry as a response. Text entries carry no headers of their own.
    pub fn into_response(self) -> CachedResponse {
        match self {
            CacheEntry::Response(response) => response,
            CacheEntry::Text(text) => CachedResponse::ok(
                vec![(
                    "Content-Type".to_string(),
                    TEXT_ENTRY_CONTENT_TYPE.to_string(),
                )],
                text,
            ),
        }
    }
}

/// Async key/value façade over the shared cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheStoreError>;

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheStoreError>;
}

struct StoredEntry {
    entry: CacheEntry,
    stored_at: Instant,
}

/// Process-local store: LRU bounded, with an optional per-entry lifetime.
///
/// A hit promotes the entry, so reads mutate too and a plain mutex is used.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<CacheKey, StoredEntry>>,
    ttl: Option<Duration>,
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
            ttl: config.ttl(),
        }
    }

    fn is_fresh(&self, stored: &StoredEntry) -> bool {
        self.ttl.is_none_or(|ttl| stored.stored_at.elapsed() < ttl)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheStoreError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(stored) if self.is_fresh(stored) => return Ok(Some(stored.entry.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            debug!(cache = "memory", outcome = "expired", "dropped stale entry");
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheStoreError> {
        let stored = StoredEntry {
            entry,
            stored_at: Instant::now(),
        };
        let evicted = mutex_lock(&self.entries, SOURCE, "set").push(key.clone(), stored);
        if let Some((evicted_key, _)) = evicted.filter(|(evicted_key, _)| evicted_key != key) {
            debug!(cache = "memory", evicted = %evicted_key, "evicted entry at capacity");
        }
        Ok(())
    }
}

/// Store used when caching is switched off: every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, CacheStoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _entry: CacheEntry) -> Result<(), CacheStoreError> {
        Ok(())
    }
}
