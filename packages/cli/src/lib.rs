// ABOUTME: Server assembly for the Procura binary
// ABOUTME: Pool init, state construction, CORS, and axum::serve

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use procura_api::{create_router, AppState};
use procura_notify::{Dispatcher, LogTransport};
use procura_storage::init_pool;

pub mod config;

pub use config::{Config, ConfigError};

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = init_pool(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let dispatcher = Dispatcher::spawn(Arc::new(LogTransport));

    let state = AppState::new(
        pool,
        config.blob_root.clone(),
        dispatcher,
        config.subscription,
        config.limits,
    );

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<axum::http::HeaderValue>()
                .context("Invalid CORS origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Procura API server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
