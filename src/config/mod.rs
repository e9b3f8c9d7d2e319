//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::{
    application::response::{
        DEFAULT_BROWSER_MAX_AGE_SECONDS, DEFAULT_FALLBACK_URL, DEFAULT_SHARED_MAX_AGE_SECONDS,
    },
    cache::{
        CacheNamespace, DEFAULT_CAPACITY, DEFAULT_NAMESPACE, DEFAULT_TTL_SECONDS, FailurePolicy,
    },
};

pub use cli::{CliArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "syntect-edge";
const ENV_PREFIX: &str = "SYNTECT_EDGE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = concat!("syntect-edge/", env!("CARGO_PKG_VERSION"));

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
    pub http: HttpSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: NonZeroUsize,
    /// `None` keeps entries until capacity evicts them.
    pub ttl: Option<Duration>,
    pub namespace: CacheNamespace,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub browser_max_age: Duration,
    pub shared_max_age: Duration,
    pub fallback_url: Url,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_serve_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
    http: RawHttpSettings,
    fetch: RawFetchSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(capacity) = overrides.cache_capacity {
            self.cache.capacity = Some(capacity);
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(namespace) = overrides.cache_namespace.as_ref() {
            self.cache.namespace = Some(namespace.clone());
        }
        if let Some(policy) = overrides.cache_failure_policy.as_ref() {
            self.cache.failure_policy = Some(policy.clone());
        }
        if let Some(seconds) = overrides.http_browser_max_age_seconds {
            self.http.browser_max_age_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.http_shared_max_age_seconds {
            self.http.shared_max_age_seconds = Some(seconds);
        }
        if let Some(url) = overrides.http_fallback_url.as_ref() {
            self.http.fallback_url = Some(url.clone());
        }
        if let Some(limit) = overrides.http_max_body_bytes {
            self.http.max_body_bytes = Some(limit);
        }
        if let Some(seconds) = overrides.fetch_timeout_seconds {
            self.fetch.timeout_seconds = Some(seconds);
        }
        if let Some(agent) = overrides.fetch_user_agent.as_ref() {
            self.fetch.user_agent = Some(agent.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            cache,
            http,
            fetch,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            cache: build_cache_settings(cache)?,
            http: build_http_settings(http)?,
            fetch: build_fetch_settings(fetch)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let capacity_value = cache.capacity.unwrap_or(DEFAULT_CAPACITY as u64);
    let capacity = usize::try_from(capacity_value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid(
                "cache.capacity",
                "must be greater than zero and fit in usize",
            )
        })?;

    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS);
    let ttl = (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds));

    let namespace_raw = cache
        .namespace
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let namespace = CacheNamespace::parse(namespace_raw.trim())
        .map_err(|err| LoadError::invalid("cache.namespace", err.to_string()))?;

    let failure_policy = match cache.failure_policy {
        Some(policy) => FailurePolicy::from_str(&policy)
            .map_err(|reason| LoadError::invalid("cache.failure_policy", reason))?,
        None => FailurePolicy::default(),
    };

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        capacity,
        ttl,
        namespace,
        failure_policy,
    })
}

fn build_http_settings(http: RawHttpSettings) -> Result<HttpSettings, LoadError> {
    let browser_secs = http
        .browser_max_age_seconds
        .unwrap_or(DEFAULT_BROWSER_MAX_AGE_SECONDS);
    let shared_secs = http
        .shared_max_age_seconds
        .unwrap_or(DEFAULT_SHARED_MAX_AGE_SECONDS);
    if shared_secs > browser_secs {
        return Err(LoadError::invalid(
            "http.shared_max_age_seconds",
            format!("{shared_secs} exceeds browser_max_age_seconds ({browser_secs})"),
        ));
    }

    let fallback_raw = http
        .fallback_url
        .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_string());
    let fallback_url = Url::parse(fallback_raw.trim())
        .map_err(|err| LoadError::invalid("http.fallback_url", err.to_string()))?;
    if !matches!(fallback_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "http.fallback_url",
            "scheme must be http or https",
        ));
    }

    let max_body_value = http.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
    if max_body_value == 0 {
        return Err(LoadError::invalid(
            "http.max_body_bytes",
            "must be greater than zero",
        ));
    }
    let max_body_bytes = usize::try_from(max_body_value).map_err(|_| {
        LoadError::invalid(
            "http.max_body_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(HttpSettings {
        browser_max_age: Duration::from_secs(browser_secs),
        shared_max_age: Duration::from_secs(shared_secs),
        fallback_url,
        max_body_bytes,
    })
}

fn build_fetch_settings(fetch: RawFetchSettings) -> Result<FetchSettings, LoadError> {
    let timeout_secs = fetch.timeout_seconds.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "fetch.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let user_agent = match fetch.user_agent {
        Some(agent) if agent.trim().is_empty() => {
            return Err(LoadError::invalid(
                "fetch.user_agent",
                "must not be empty",
            ));
        }
        Some(agent) => agent.trim().to_string(),
        None => DEFAULT_USER_AGENT.to_string(),
    };

    Ok(FetchSettings {
        timeout: Duration::from_secs(timeout_secs),
        user_agent,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    capacity: Option<u64>,
    ttl_seconds: Option<u64>,
    namespace: Option<String>,
    failure_policy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawHttpSettings {
    browser_max_age_seconds: Option<u64>,
    shared_max_age_seconds: Option<u64>,
    fallback_url: Option<String>,
    max_body_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFetchSettings {
    timeout_seconds: Option<u64>,
    user_agent: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
