use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the syntect-edge binary.
#[derive(Debug, Parser)]
#[command(
    name = "syntect-edge",
    version,
    about = "Syntax highlighting and theme CSS behind a cache"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SYNTECT_EDGE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Enable or disable the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the number of entries the in-process cache holds.
    #[arg(long = "cache-capacity", value_name = "COUNT")]
    pub cache_capacity: Option<u64>,

    /// Override the lifetime of cached entries; 0 disables expiry.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the URL namespace cache keys live under.
    #[arg(long = "cache-namespace", value_name = "URL")]
    pub cache_namespace: Option<String>,

    /// Behaviour when the cache store fails (fail-open|fail-closed).
    #[arg(long = "cache-failure-policy", value_name = "POLICY")]
    pub cache_failure_policy: Option<String>,

    /// Override the browser max-age of cacheable responses.
    #[arg(long = "http-browser-max-age-seconds", value_name = "SECONDS")]
    pub http_browser_max_age_seconds: Option<u64>,

    /// Override the shared-cache s-maxage of cacheable responses.
    #[arg(long = "http-shared-max-age-seconds", value_name = "SECONDS")]
    pub http_shared_max_age_seconds: Option<u64>,

    /// Override where unmatched requests are redirected.
    #[arg(long = "http-fallback-url", value_name = "URL")]
    pub http_fallback_url: Option<String>,

    /// Override the maximum accepted request body in bytes.
    #[arg(long = "http-max-body-bytes", value_name = "BYTES")]
    pub http_max_body_bytes: Option<u64>,

    /// Override the remote theme fetch timeout.
    #[arg(long = "fetch-timeout-seconds", value_name = "SECONDS")]
    pub fetch_timeout_seconds: Option<u64>,

    /// Override the User-Agent sent when fetching remote themes.
    #[arg(long = "fetch-user-agent", value_name = "AGENT")]
    pub fetch_user_agent: Option<String>,
}
