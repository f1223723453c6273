//! Image Relay Server - Main entry point
//!
//! This binary creates and runs the HTTP server with all configured routes and middleware.
//! Configuration is read once from the environment at startup.

use anyhow::Result;
use image_relay_rust::{
    api::{build_router, create_http_client, AppState},
    core::{init_metrics, init_tracing, AppConfig},
};
use std::sync::Arc;

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    // The relay is I/O bound; a handful of workers is plenty unless overridden
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().min(4))
                .unwrap_or(1)
        });

    println!("Tokio runtime: using {} worker threads", worker_threads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;

    if config.default_token().is_none() {
        tracing::warn!("POLLINATIONS_TOKEN not set, upstream calls will be anonymous");
    }
    if config.allow_client_token {
        tracing::warn!("ALLOW_CLIENT_TOKEN enabled, callers may supply their own upstream token");
    }

    let http_client = create_http_client(&config)?;
    let upstream = config.upstream_base_url.clone();
    let state = Arc::new(AppState::new(config, http_client));
    let app = build_router(state);

    tracing::info!("Starting image relay on {}", addr);
    tracing::info!("Upstream: {}", upstream);
    tracing::info!("API: GET /api/models, POST /api/generate");
    tracing::info!("Metrics endpoint: /metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
