//! Successful response assembly and replay of cached responses.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{application::render::HighlightOutput, cache::CachedResponse};

pub const CONTENT_TYPE_CSS: &str = "text/css";
pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const DEFAULT_BROWSER_MAX_AGE_SECONDS: u64 = 604_800;
pub const DEFAULT_SHARED_MAX_AGE_SECONDS: u64 = 43_200;
pub const DEFAULT_FALLBACK_URL: &str = "https://github.com/Menci/syntect-workers";

#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    cache_control: String,
    fallback_url: String,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_BROWSER_MAX_AGE_SECONDS),
            Duration::from_secs(DEFAULT_SHARED_MAX_AGE_SECONDS),
            DEFAULT_FALLBACK_URL,
        )
    }
}

impl ResponseBuilder {
    /// `browser_max_age` governs clients; `shared_max_age` governs shared proxies.
    pub fn new(
        browser_max_age: Duration,
        shared_max_age: Duration,
        fallback_url: impl Into<String>,
    ) -> Self {
        Self {
            cache_control: format!(
                "public, max-age={}, s-maxage={}",
                browser_max_age.as_secs(),
                shared_max_age.as_secs()
            ),
            fallback_url: fallback_url.into(),
        }
    }

    pub fn from_settings(settings: &crate::config::HttpSettings) -> Self {
        Self::new(
            settings.browser_max_age,
            settings.shared_max_age,
            settings.fallback_url.as_str(),
        )
    }

    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }

    pub fn css(&self, css: String) -> CachedResponse {
        self.cacheable(CONTENT_TYPE_CSS, css)
    }

    pub fn html(&self, html: String) -> CachedResponse {
        self.cacheable(CONTENT_TYPE_HTML, html)
    }

    /// Plain HTML, or `{html, language}` as JSON when `verbose` is set.
    pub fn highlight(
        &self,
        output: HighlightOutput,
        verbose: bool,
    ) -> Result<CachedResponse, serde_json::Error> {
        if verbose {
            Ok(self.cacheable(CONTENT_TYPE_JSON, serde_json::to_string(&output)?))
        } else {
            Ok(self.html(output.html))
        }
    }

    /// Turn a stored or fresh response snapshot into an HTTP response.
    pub fn replay(&self, cached: CachedResponse) -> Response {
        let mut builder = Response::builder().status(cached.status);

        for (name, value) in cached.headers {
            match HeaderValue::from_str(&value) {
                Ok(header_value) => builder = builder.header(name, header_value),
                Err(_) => warn!(header = %name, "dropping unrepresentable cached header"),
            }
        }

        builder
            .body(Body::from(cached.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }

    pub fn redirect(&self) -> Response {
        match HeaderValue::from_str(&self.fallback_url) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    fn cacheable(&self, content_type: &str, body: String) -> CachedResponse {
        CachedResponse::ok(
            vec![
                (header::CONTENT_TYPE.to_string(), content_type.to_string()),
                (header::CACHE_CONTROL.to_string(), self.cache_control.clone()),
            ],
            body,
        )
    }
}
