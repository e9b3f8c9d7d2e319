//! Cache key definitions.
//!
//! A `CacheKeyObject` is a fixed-field record whose compact JSON form is the
//! canonical key string. Field order follows declaration order, so two equal
//! objects always serialise to identical bytes. The canonical string is then
//! placed as a single percent-encoded path segment under the namespace URL.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::domain::request::{HighlightRequest, Prefix};

use super::hasher::ContentHasher;

pub const DEFAULT_NAMESPACE: &str = "https://cache.example.com/";

#[derive(Debug, Error)]
pub enum CacheKeyError {
    #[error("failed to serialise cache key object: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cache namespace `{namespace}` is not usable: {reason}")]
    InvalidNamespace { namespace: String, reason: String },
}

/// Identity of a cacheable computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CacheKeyObject {
    Highlight(HighlightKey),
    Theme(ThemeKey),
}

/// Highlight identity: the code participates only through its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightKey {
    pub code_hash: String,
    pub language: String,
    pub prefix: Prefix,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeKey {
    pub theme_hash: String,
    pub prefix: Prefix,
}

impl CacheKeyObject {
    pub fn highlight(hasher: &dyn ContentHasher, request: &HighlightRequest) -> Self {
        Self::Highlight(HighlightKey {
            code_hash: hasher.digest(&request.code),
            language: request.language.clone(),
            prefix: request.prefix.clone(),
            verbose: request.verbose,
        })
    }

    pub fn theme(hasher: &dyn ContentHasher, theme_data: &str, prefix: &Prefix) -> Self {
        Self::Theme(ThemeKey {
            theme_hash: hasher.digest(theme_data),
            prefix: prefix.clone(),
        })
    }

    /// Canonical key string.
    pub fn canonical(&self) -> Result<String, CacheKeyError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Highlight(_) => "highlight",
            Self::Theme(_) => "theme",
        }
    }
}

/// Opaque, URL-shaped key addressed in the shared store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed URL prefix under which every key lives.
///
/// Holds the normalised base URL text: no query, no fragment, and able to
/// carry path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    base: String,
}

impl CacheNamespace {
    pub fn new(mut base: Url) -> Result<Self, CacheKeyError> {
        if base.cannot_be_a_base() {
            return Err(CacheKeyError::InvalidNamespace {
                namespace: base.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base: base.into() })
    }

    pub fn parse(raw: &str) -> Result<Self, CacheKeyError> {
        let base = Url::parse(raw).map_err(|err| CacheKeyError::InvalidNamespace {
            namespace: raw.to_string(),
            reason: err.to_string(),
        })?;
        Self::new(base)
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn key_for(&self, object: &CacheKeyObject) -> Result<CacheKey, CacheKeyError> {
        let canonical = object.canonical()?;
        let invalid = |reason: String| CacheKeyError::InvalidNamespace {
            namespace: self.base.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot carry path segments".to_string()))?
            .pop_if_empty()
            .push(&canonical);
        Ok(CacheKey(url.into()))
    }
}

impl Default for CacheNamespace {
    fn default() -> Self {
        Self {
            base: DEFAULT_NAMESPACE.to_string(),
        }
    }
}
