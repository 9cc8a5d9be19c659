//! Chatarc Server - Main entry point

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chatarc_common::logging::{init_logging, LogConfig};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use chatarc_server::{
    archive::{CliExporter, ExportRateLimiter},
    config::Config,
    db::PgExportStore,
    features, metrics::Metrics, middleware,
};

/// Application state shared across the operational handlers
#[derive(Clone)]
struct AppState {
    db: sqlx::PgPool,
    metrics: Arc<Metrics>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::from_env()?
        .with_filter_directives("chatarc_server=debug,tower_http=debug,sqlx=info");

    init_logging(&log_config)?;

    info!("Starting Chatarc Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    let metrics = Arc::new(Metrics::new());

    // Assemble the export engine behind its trait seams
    let feature_state = features::FeatureState {
        store: Arc::new(PgExportStore::new(db_pool.clone())),
        exporter: Arc::new(CliExporter::new(config.exporter.clone())),
        limiter: Arc::new(ExportRateLimiter::new(
            config.rate_limit.exports_per_window,
            Duration::from_secs(config.rate_limit.window_secs),
        )),
        metrics: metrics.clone(),
        exporter_config: Arc::new(config.exporter.clone()),
    };

    let state = AppState {
        db: db_pool,
        metrics,
    };

    // Build the application router
    let app = create_router(state, feature_state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, feature_state: features::FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(feature_state);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .merge(feature_routes)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    // Check database connectivity
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Prometheus text exposition handler
async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render_prometheus(),
    )
}

/// Graceful shutdown signal handler
///
/// Resolving this future tells `axum::serve` to stop accepting and drain
/// in-flight connections.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
