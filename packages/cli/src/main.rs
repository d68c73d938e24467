// ABOUTME: Procura API server entry point
// ABOUTME: Loads .env, initializes tracing, and runs the server

use tracing_subscriber::EnvFilter;

use procura_cli::{run_server, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    run_server(config).await
}
