//! Reddit Image Fetcher
//!
//! Small web backend that:
//! 1. Obtains a Reddit bearer token with the configured account
//! 2. Resolves a post permalink to its gallery or single image
//! 3. Downloads the images into a shared photo directory and serves them
//! 4. Bundles the directory into a ZIP on demand, then empties it

mod config;
mod error;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{FromRef, MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_store::ImageStore;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::metrics::ServiceMetrics;
use crate::routes::ApiState;

/// How long in-flight requests get to finish after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    api: ApiState,
    metrics: ServiceMetrics,
    prometheus: PrometheusHandle,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        state.api.clone()
    }
}

/// Build the axum router with all routes and shared state.
///
/// Every matched route goes through `track_requests` for counters, timing
/// and a per-request tracing span.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/static/index.js", get(routes::index_js))
        .route("/auth", post(routes::authenticate))
        .route("/fetch-images", post(routes::fetch_images))
        .route("/images/{filename}", get(routes::serve_image))
        .route("/download-images", post(routes::download_images))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting reddit-image-fetcher");

    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        auth_url = %config.reddit.auth_url,
        api_url = %config.reddit.api_url,
        photo_dir = %config.storage.photo_dir.display(),
        download_concurrency = config.storage.download_concurrency,
        "configuration loaded"
    );

    let store = ImageStore::open(&config.storage.photo_dir).with_context(|| {
        format!(
            "failed to create photo directory {}",
            config.storage.photo_dir.display()
        )
    })?;

    let mut client_builder = reqwest::Client::builder().user_agent(&config.reddit.user_agent);
    if let Some(secs) = config.reddit.timeout_secs {
        client_builder = client_builder.timeout(Duration::from_secs(secs));
    }
    let client = client_builder
        .build()
        .context("failed to build HTTP client")?;

    let app_state = AppState {
        api: ApiState {
            client,
            endpoints: Arc::new(config.endpoints()),
            credentials: Arc::new(config.credentials.clone()),
            store,
            archive_name: Arc::from(config.storage.archive_name.as_str()),
            download_concurrency: config.storage.download_concurrency,
        },
        metrics: ServiceMetrics::new(),
        prometheus: prometheus_handle,
    };

    let app = build_router(app_state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timer starts at signal receipt, not at server start
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Count, time and span every routed request.
async fn track_requests(
    State(metrics): State<ServiceMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    let span = info_span!("request", %request_id, method = %request.method(), %route);

    metrics.requests_total.fetch_add(1, Ordering::Relaxed);
    let started = Instant::now();
    let response = next.run(request).instrument(span).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.errors_total.fetch_add(1, Ordering::Relaxed);
    }
    metrics::record_request(&route, status.as_u16(), started.elapsed().as_secs_f64());
    response
}

/// Health endpoint: JSON with status, uptime, request and error counts.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.metrics.started_at.elapsed().as_secs(),
        "requests_served": state.metrics.requests_total.load(Ordering::Relaxed),
        "errors_total": state.metrics.errors_total.load(Ordering::Relaxed),
        "photo_dir": state.api.store.dir().display().to_string(),
    });

    (
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
