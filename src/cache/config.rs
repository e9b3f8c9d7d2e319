//! Cache configuration.
//!
//! Resolved from the `[cache]` section of the settings file.

use std::{num::NonZeroUsize, time::Duration};

use super::{aside::FailurePolicy, keys::CacheNamespace};

pub(crate) const DEFAULT_CAPACITY: usize = 4096;
pub(crate) const DEFAULT_TTL_SECONDS: u64 = 43_200;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false every lookup misses and nothing is written.
    pub enabled: bool,
    /// Maximum entries held by the in-process store.
    pub capacity: usize,
    /// Lifetime of a stored entry; zero keeps entries until evicted by capacity.
    pub ttl_seconds: u64,
    /// URL prefix every key is placed under.
    pub namespace: CacheNamespace,
    /// What to do when the store itself fails.
    pub failure_policy: FailurePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            namespace: CacheNamespace::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            capacity: settings.capacity.get(),
            ttl_seconds: settings.ttl.map(|ttl| ttl.as_secs()).unwrap_or(0),
            namespace: settings.namespace.clone(),
            failure_policy: settings.failure_policy,
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}
