use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

use crate::{
    application::{error::AppError, render::ComputeEngine, response::ResponseBuilder},
    cache::{CacheAside, CacheEntry, CacheKeyObject, CachedResponse, ContentHasher},
    domain::request::{ThemeRequest, ThemeUrlRequest},
};

/// Why a remote theme could not be retrieved. The message is shown to clients.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("invalid theme URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Request(String),
}

impl FetchError {
    /// Flatten `error` and its sources into one message, outermost first.
    ///
    /// Transport errors name only the URL at the top level; the reason
    /// (refused connection, DNS failure, bad status) lives further down.
    pub fn request(error: impl StdError) -> Self {
        let mut message = error.to_string();
        let mut current = error.source();
        while let Some(inner) = current {
            let cause = inner.to_string();
            if !message.contains(&cause) {
                message.push_str(": ");
                message.push_str(&cause);
            }
            current = inner.source();
        }
        Self::Request(message)
    }
}

/// Retrieves theme documents by URL.
#[async_trait]
pub trait ThemeFetcher: Send + Sync {
    async fn fetch_theme(&self, url: &str) -> Result<String, FetchError>;
}

/// Converts themes to CSS through the cache.
#[derive(Clone)]
pub struct ThemeService {
    cache: CacheAside,
    hasher: Arc<dyn ContentHasher>,
    fetcher: Arc<dyn ThemeFetcher>,
    responses: ResponseBuilder,
}

impl ThemeService {
    pub fn new(
        cache: CacheAside,
        hasher: Arc<dyn ContentHasher>,
        fetcher: Arc<dyn ThemeFetcher>,
        responses: ResponseBuilder,
    ) -> Self {
        Self {
            cache,
            hasher,
            fetcher,
            responses,
        }
    }

    #[instrument(skip_all, fields(theme_len = request.theme_data.len()))]
    pub async fn css(
        &self,
        engine: Arc<dyn ComputeEngine>,
        request: ThemeRequest,
    ) -> Result<CachedResponse, AppError> {
        let key = CacheKeyObject::theme(self.hasher.as_ref(), &request.theme_data, &request.prefix);

        let entry = self
            .cache
            .get_or_compute(&key, || async move {
                let ThemeRequest { theme_data, prefix } = request;

                let css = tokio::task::spawn_blocking(move || {
                    engine.render_theme_css(&theme_data, prefix.as_str())
                })
                .await
                .map_err(|err| AppError::unexpected(format!("theme task failed: {err}")))?
                .map_err(AppError::ThemeCss)?;

                Ok::<_, AppError>(CacheEntry::Response(self.responses.css(css)))
            })
            .await?;

        Ok(entry.into_response())
    }

    /// Fetch the theme at `theme_url`, then convert it like [`ThemeService::css`].
    ///
    /// The request is already validated, so a bad prefix never costs a fetch.
    #[instrument(skip_all, fields(theme_url = %request.theme_url))]
    pub async fn css_from_url(
        &self,
        engine: Arc<dyn ComputeEngine>,
        request: ThemeUrlRequest,
    ) -> Result<CachedResponse, AppError> {
        let ThemeUrlRequest { theme_url, prefix } = request;
        let theme_data = self.fetcher.fetch_theme(&theme_url).await?;
        self.css(engine, ThemeRequest { theme_data, prefix }).await
    }
}
