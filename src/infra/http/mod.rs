mod handlers;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::{
    application::{
        highlight::HighlightService,
        render::EngineGate,
        response::ResponseBuilder,
        theme::{ThemeFetcher, ThemeService},
    },
    cache::{CacheAside, ContentHasher},
};

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
use middleware::{log_responses, set_request_context};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct HttpState {
    pub gate: EngineGate,
    pub highlight: Arc<HighlightService>,
    pub theme: Arc<ThemeService>,
    pub responses: ResponseBuilder,
    pub max_body_bytes: usize,
}

impl HttpState {
    pub fn new(
        gate: EngineGate,
        cache: CacheAside,
        hasher: Arc<dyn ContentHasher>,
        fetcher: Arc<dyn ThemeFetcher>,
        responses: ResponseBuilder,
        max_body_bytes: usize,
    ) -> Self {
        let highlight = Arc::new(HighlightService::new(
            cache.clone(),
            Arc::clone(&hasher),
            responses.clone(),
        ));
        let theme = Arc::new(ThemeService::new(
            cache,
            hasher,
            fetcher,
            responses.clone(),
        ));

        Self {
            gate,
            highlight,
            theme,
            responses,
            max_body_bytes,
        }
    }
}

/// Route `/css` (GET, POST) and `/highlight` (POST). Anything else redirects.
pub fn build_router(state: HttpState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route(
            "/css",
            get(handlers::css_from_url)
                .post(handlers::css_from_body)
                .fallback(handlers::redirect),
        )
        .route(
            "/highlight",
            post(handlers::highlight).fallback(handlers::redirect),
        )
        .fallback(handlers::redirect)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
