//! Get-or-compute-and-store orchestration.
//!
//! A hit never runs the computation. A miss runs it exactly once for this
//! call and writes the result back. There is no cross-request exclusion:
//! concurrent misses on one key may each compute and each write, which is
//! harmless because computations are pure functions of the key.

use std::{future::Future, str::FromStr, sync::Arc, time::Instant};

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, warn};

use super::keys::{CacheKeyError, CacheKeyObject, CacheNamespace};
use super::store::{CacheEntry, CacheStore, CacheStoreError};

pub const CACHE_HIT_METRIC: &str = "syntect_edge_cache_hit_total";
pub const CACHE_MISS_METRIC: &str = "syntect_edge_cache_miss_total";
pub const CACHE_STORE_ERROR_METRIC: &str = "syntect_edge_cache_store_error_total";
pub const COMPUTE_MS_METRIC: &str = "syntect_edge_compute_ms";

/// Behaviour when the store itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Serve from the computation and skip the store.
    #[default]
    FailOpen,
    /// Surface the store failure to the caller.
    FailClosed,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::FailOpen => "fail-open",
            FailurePolicy::FailClosed => "fail-closed",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "fail_open" | "open" => Ok(Self::FailOpen),
            "fail-closed" | "fail_closed" | "closed" => Ok(Self::FailClosed),
            other => Err(format!(
                "unknown failure policy `{other}` (expected fail-open or fail-closed)"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheAsideError {
    #[error(transparent)]
    Key(#[from] CacheKeyError),
    #[error(transparent)]
    Store(#[from] CacheStoreError),
}

/// Which path a lookup took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    /// The store failed and the policy allowed computing without it.
    Bypass,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Bypass => "bypass",
        }
    }
}

#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    namespace: CacheNamespace,
    policy: FailurePolicy,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>, namespace: CacheNamespace, policy: FailurePolicy) -> Self {
        Self {
            store,
            namespace,
            policy,
        }
    }

    /// Return the stored entry for `object`, or compute, store and return it.
    ///
    /// Computation errors are returned as-is and never stored.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        object: &CacheKeyObject,
        compute: F,
    ) -> Result<CacheEntry, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheEntry, E>>,
        E: From<CacheAsideError>,
    {
        self.lookup(object, compute)
            .await
            .map(|(entry, _outcome)| entry)
    }

    /// Like [`CacheAside::get_or_compute`], also reporting the path taken.
    pub async fn lookup<F, Fut, E>(
        &self,
        object: &CacheKeyObject,
        compute: F,
    ) -> Result<(CacheEntry, CacheOutcome), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheEntry, E>>,
        E: From<CacheAsideError>,
    {
        let kind = object.kind();
        let key = self
            .namespace
            .key_for(object)
            .map_err(CacheAsideError::from)?;

        let outcome = match self.store.get(&key).await {
            Ok(Some(entry)) => {
                counter!(CACHE_HIT_METRIC, "kind" => kind).increment(1);
                debug!(cache = "aside", kind, outcome = "hit", "serving stored entry");
                return Ok((entry, CacheOutcome::Hit));
            }
            Ok(None) => {
                counter!(CACHE_MISS_METRIC, "kind" => kind).increment(1);
                CacheOutcome::Miss
            }
            Err(err) => {
                self.absorb(kind, "get", err)?;
                CacheOutcome::Bypass
            }
        };

        debug!(
            cache = "aside",
            kind,
            outcome = outcome.as_str(),
            "computing entry"
        );

        let started_at = Instant::now();
        let entry = compute().await?;
        histogram!(COMPUTE_MS_METRIC, "kind" => kind)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        if outcome == CacheOutcome::Miss {
            if let Err(err) = self.store.set(&key, entry.clone()).await {
                self.absorb(kind, "set", err)?;
            }
        }

        Ok((entry, outcome))
    }

    fn absorb(
        &self,
        kind: &'static str,
        op: &'static str,
        error: CacheStoreError,
    ) -> Result<(), CacheAsideError> {
        counter!(CACHE_STORE_ERROR_METRIC, "kind" => kind, "op" => op).increment(1);
        match self.policy {
            FailurePolicy::FailOpen => {
                warn!(
                    cache = "aside",
                    kind,
                    op,
                    policy = self.policy.as_str(),
                    error = %error,
                    "cache store failed; continuing without it"
                );
                Ok(())
            }
            FailurePolicy::FailClosed => Err(CacheAsideError::Store(error)),
        }
    }
}
