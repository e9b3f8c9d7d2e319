#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use syntect_edge::{
    application::{
        render::{ComputeEngine, ComputeError, EngineGate, HighlightOutput},
        response::ResponseBuilder,
        theme::{FetchError, ThemeFetcher},
    },
    cache::{
        CacheAside, CacheConfig, CacheNamespace, CacheStore, ContentHasher, FailurePolicy,
        MemoryCacheStore, Sha256Hasher,
    },
    infra::http::{HttpState, build_router},
};
use tower::ServiceExt;

pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Deterministic engine that counts how often it actually runs.
#[derive(Default)]
pub struct CountingEngine {
    highlights: AtomicUsize,
    themes: AtomicUsize,
}

impl CountingEngine {
    pub fn highlights(&self) -> usize {
        self.highlights.load(Ordering::SeqCst)
    }

    pub fn themes(&self) -> usize {
        self.themes.load(Ordering::SeqCst)
    }
}

impl ComputeEngine for CountingEngine {
    fn render_highlight(
        &self,
        code: &str,
        language: &str,
        prefix: &str,
    ) -> Result<HighlightOutput, ComputeError> {
        self.highlights.fetch_add(1, Ordering::SeqCst);
        Ok(HighlightOutput {
            html: format!("<span class=\"{prefix}source\">{code}</span>"),
            language: language.to_uppercase(),
        })
    }

    fn render_theme_css(&self, theme_data: &str, prefix: &str) -> Result<String, ComputeError> {
        self.themes.fetch_add(1, Ordering::SeqCst);
        if theme_data == "invalid" {
            return Err(ComputeError::new("theme is not a plist"));
        }
        Ok(format!(".{prefix}code {{ /* {} bytes */ }}", theme_data.len()))
    }
}

/// Hasher that maps every input to the same digest.
pub struct ConstantHasher;

impl ContentHasher for ConstantHasher {
    fn digest(&self, _text: &str) -> String {
        "0".repeat(64)
    }
}

/// Fetcher returning a fixed theme and counting calls.
pub struct StaticFetcher {
    body: String,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThemeFetcher for StaticFetcher {
    async fn fetch_theme(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

pub struct Harness {
    pub engine: Arc<CountingEngine>,
    pub fetcher: Arc<StaticFetcher>,
    pub router: Router,
}

pub struct HarnessBuilder {
    store: Arc<dyn CacheStore>,
    hasher: Arc<dyn ContentHasher>,
    policy: FailurePolicy,
    fetcher: Option<Arc<dyn ThemeFetcher>>,
    max_body_bytes: usize,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryCacheStore::new(&CacheConfig::default())),
            hasher: Arc::new(Sha256Hasher),
            policy: FailurePolicy::FailOpen,
            fetcher: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HarnessBuilder {
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = store;
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a real fetcher instead of the static one.
    pub fn fetcher(mut self, fetcher: Arc<dyn ThemeFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn build(self) -> Harness {
        let engine = Arc::new(CountingEngine::default());
        let static_fetcher = Arc::new(StaticFetcher::new("<plist/>"));
        let fetcher: Arc<dyn ThemeFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => static_fetcher.clone(),
        };

        let dyn_engine: Arc<dyn ComputeEngine> = engine.clone();
        let state = HttpState::new(
            EngineGate::ready_with(dyn_engine),
            CacheAside::new(self.store, CacheNamespace::default(), self.policy),
            self.hasher,
            fetcher,
            ResponseBuilder::default(),
            self.max_body_bytes,
        );

        Harness {
            engine,
            fetcher: static_fetcher,
            router: build_router(state),
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::default().build()
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");

    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    }
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .expect("request should build")
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}
