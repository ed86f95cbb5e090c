//! Router assembly, tracing setup and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use snoutiq::Pipeline;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::metrics::{install_prometheus, PrometheusMetrics};
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, datasets, health, not_found, query};
use crate::state::ServerState;

/// Build the Axum router with all routes and middleware
///
/// Public: `/`, `/health`, `/ready`, `/metrics` and the `/query` alias.
/// Everything under `/api/v1` goes through [`api_key_auth`].
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/query", post(query::analyze_symptoms));

    let protected_routes = Router::new()
        .route("/api/v1/query", post(query::analyze_symptoms))
        .route("/api/v1/datasets/info", get(datasets::dataset_info))
        .route("/api/v1/datasets/reload", post(datasets::reload_datasets))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over
/// `log_level` when set.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.log_format == "pretty" {
        builder.pretty().try_init()
    } else {
        builder.json().try_init()
    };
    if let Err(err) = installed {
        eprintln!("tracing subscriber already installed: {err}");
    }
}

/// Builds the pipeline, loads the corpus and serves until SIGTERM or Ctrl+C.
///
/// Startup fails if the dataset directory yields no valid entries: a server
/// with an empty corpus could only ever answer 503.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);

    let pipeline_config = config.pipeline_config()?;
    let prometheus = if config.metrics_enabled {
        Some(install_prometheus()?)
    } else {
        None
    };

    let mut pipeline = Pipeline::from_config(&pipeline_config)?;
    if prometheus.is_some() {
        pipeline = pipeline.with_metrics(Arc::new(PrometheusMetrics));
    }

    let summary = pipeline
        .load_dataset_dir(&config.dataset_dir)
        .await
        .with_context(|| format!("loading datasets from {}", config.dataset_dir.display()))?;
    tracing::info!(
        entries = summary.entries,
        categories = summary.categories.len(),
        rejected = summary.rejected.len(),
        skipped_files = summary.skipped_files.len(),
        embedder = pipeline.embedder().model_name(),
        generator = pipeline.generator().model_name(),
        "corpus_ready"
    );

    let addr: SocketAddr = config.socket_addr()?;
    tracing::info!(
        %addr,
        auth = config.auth_enabled(),
        timeout_secs = config.timeout_secs,
        rate_limit_per_minute = config.rate_limit_per_minute,
        cors = config.enable_cors,
        metrics = config.metrics_enabled,
        "server_starting"
    );

    let mut state = ServerState::new(config, Arc::new(pipeline));
    if let Some(handle) = prometheus {
        state = state.with_prometheus(handle);
    }
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server_stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// fires.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "ctrl_c", "shutdown_requested"),
        _ = terminate => tracing::info!(signal = "sigterm", "shutdown_requested"),
    }
}
