//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (rate limiting, logging, compression, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::envelope::Envelope;
use crate::middleware::{count_requests, log_requests, rate_limit, request_id};
use crate::routes::{api_info, not_found, v1_info};
use crate::routes::{facts, health, raccoons, stats, videos};
use crate::state::ServerState;
use axum::http::{Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Middleware stack, outermost first:
/// 1. Tracing spans
/// 2. Request ID tracking
/// 3. Request logging
/// 4. Panic recovery
/// 5. CORS
/// 6. Compression (never for image or video bodies)
/// 7. Timeout handling
/// 8. Rate limiting
/// 9. Request counting
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods([Method::GET])
    } else {
        CorsLayer::new()
    };

    let v1_routes = Router::new()
        .route("/", get(v1_info))
        // Images
        .route("/raccoons", get(raccoons::list_raccoons))
        .route("/raccoon", get(raccoons::random_raccoon))
        .route(
            "/raccoon/transparent/{index}",
            get(raccoons::transparent_by_index),
        )
        .route("/raccoon/{index}", get(raccoons::raccoon_by_index))
        .route("/raccoftheday", get(raccoons::raccoon_of_the_day))
        .route("/racchour", get(raccoons::raccoon_of_the_hour))
        .route("/raccofthehour", get(raccoons::raccoon_of_the_hour))
        // Videos
        .route("/video", get(videos::random_video))
        .route("/video/{index}", get(videos::video_by_index))
        // Facts
        .route("/fact", get(facts::random_fact))
        .route("/facts", get(facts::list_facts));

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/stats", get(stats::stats))
        .nest("/v1", v1_routes)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), count_requests))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new().compress_when(
            DefaultPredicate::new().and(NotForContentType::const_new("video/")),
        ))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Envelope::<()>::failure("Internal Server Error"),
    )
        .into_response()
}

/// Start the raccoon API server
///
/// Scans the media root, opens the request counter store and serves until
/// SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();
    health::mark_start();

    let state = Arc::new(ServerState::new(config.clone())?);
    spawn_rate_limit_pruner(state.clone());

    let app = build_router(state.clone());
    let addr: SocketAddr = config.socket_addr()?;

    let inventory = state.catalog.inventory();
    tracing::info!(
        images = inventory.count(racc::AssetKind::Image),
        transparent = inventory.count(racc::AssetKind::TransparentImage),
        videos = inventory.count(racc::AssetKind::Video),
        "Starting raccoon API on {}",
        addr
    );
    tracing::info!(
        "Rate limit: {} requests per {}s, timeout: {}s",
        config.rate_limit_max,
        config.rate_limit_window_secs,
        config.timeout_secs
    );
    tracing::info!(
        "CORS: {}, request counting: {}",
        config.enable_cors,
        state.counting_enabled()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop expired rate limit windows
fn spawn_rate_limit_pruner(state: Arc<ServerState>) {
    let period = state.config.rate_limit_window().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.prune_rate_limits();
        }
    });
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
