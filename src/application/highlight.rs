use std::sync::Arc;

use tracing::instrument;

use crate::{
    application::{error::AppError, render::ComputeEngine, response::ResponseBuilder},
    cache::{CacheAside, CacheEntry, CacheKeyObject, CachedResponse, ContentHasher},
    domain::request::HighlightRequest,
};

/// Highlights code through the cache: the engine runs only on a miss.
#[derive(Clone)]
pub struct HighlightService {
    cache: CacheAside,
    hasher: Arc<dyn ContentHasher>,
    responses: ResponseBuilder,
}

impl HighlightService {
    pub fn new(
        cache: CacheAside,
        hasher: Arc<dyn ContentHasher>,
        responses: ResponseBuilder,
    ) -> Self {
        Self {
            cache,
            hasher,
            responses,
        }
    }

    #[instrument(
        skip_all,
        fields(language = %request.language, verbose = request.verbose, code_len = request.code.len())
    )]
    pub async fn highlight(
        &self,
        engine: Arc<dyn ComputeEngine>,
        request: HighlightRequest,
    ) -> Result<CachedResponse, AppError> {
        let key = CacheKeyObject::highlight(self.hasher.as_ref(), &request);

        let entry = self
            .cache
            .get_or_compute(&key, || async move {
                let HighlightRequest {
                    code,
                    language,
                    prefix,
                    verbose,
                } = request;

                let output = tokio::task::spawn_blocking(move || {
                    engine.render_highlight(&code, &language, prefix.as_str())
                })
                .await
                .map_err(|err| AppError::unexpected(format!("highlight task failed: {err}")))?
                .map_err(AppError::Highlight)?;

                let response = self
                    .responses
                    .highlight(output, verbose)
                    .map_err(|err| AppError::unexpected(format!("encode highlight: {err}")))?;
                Ok::<_, AppError>(CacheEntry::Response(response))
            })
            .await?;

        Ok(entry.into_response())
    }
}
