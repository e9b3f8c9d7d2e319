use std::{
    future::{self, IntoFuture},
    process,
    sync::Arc,
};

use syntect_edge::{
    application::{
        error::AppError,
        render::{EngineGate, SyntectEngine},
        response::ResponseBuilder,
    },
    cache::{CacheAside, CacheConfig, Sha256Hasher},
    config,
    infra::{error::InfraError, fetch::ReqwestThemeFetcher, http, telemetry},
};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let gate = EngineGate::new(SyntectEngine::loader);
    spawn_engine_warmup(gate.clone());

    let cache_config = CacheConfig::from(&settings.cache);
    info!(
        target = "syntect_edge::cache",
        enabled = cache_config.enabled,
        capacity = cache_config.capacity,
        ttl_seconds = cache_config.ttl_seconds,
        namespace = cache_config.namespace.as_str(),
        failure_policy = cache_config.failure_policy.as_str(),
        "cache configured"
    );
    let cache = CacheAside::from_config(&cache_config);

    let fetcher = Arc::new(ReqwestThemeFetcher::new(&settings.fetch)?);
    let state = http::HttpState::new(
        gate,
        cache,
        Arc::new(Sha256Hasher),
        fetcher,
        ResponseBuilder::from_settings(&settings.http),
        settings.http.max_body_bytes,
    );

    serve_http(&settings, state).await
}

/// Open the readiness gate in the background so the first request rarely waits.
fn spawn_engine_warmup(gate: EngineGate) {
    tokio::spawn(async move {
        if let Err(err) = gate.ready().await {
            warn!(
                target = "syntect_edge::engine",
                error = %err,
                "engine warm-up failed; requests will retry"
            );
        }
    });
}

async fn serve_http(settings: &config::Settings, state: http::HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "syntect_edge::http",
        addr = %settings.server.addr,
        "listening"
    );

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(true);
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    let deadline = async move {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_err() {
            future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result.map_err(|err| AppError::from(InfraError::from(err))),
        () = deadline => {
            warn!(
                target = "syntect_edge::http",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

/// Waits for Ctrl+C or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to register SIGTERM handler");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
