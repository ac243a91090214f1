use anyhow::Result;
use shared::{Config, Scanner, YahooClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting stock hunter web server...");

    let config = Arc::new(Config::from_env()?);
    info!(
        "Data directory: {:?}, max workers: {}",
        config.data_dir, config.max_workers
    );

    let source = Arc::new(YahooClient::new(&config));
    let scanner = Scanner::new(config.clone(), source);
    scanner.store().ensure_files()?;
    shared::GeneCache::ensure_file(&config.gene_cache_file)?;

    let app = build_router(AppState::new(scanner));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
