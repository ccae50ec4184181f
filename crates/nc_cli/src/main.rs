use clap::Parser;
use nc_core::Result;
use nc_scrappers::{create_fetcher, handle_command, init_logging, CrawlScheduler, Crawler, Fetcher};
use nc_web::{create_app, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;

use config::{Cli, Commands, PLACEHOLDER_API_KEY};

async fn serve(crawler: Crawler, api_key: &str, interval: Duration, bind: &str) -> Result<()> {
    if api_key == PLACEHOLDER_API_KEY {
        warn!("⚠️ API_KEY_SECRET is still the placeholder value");
    }

    let scheduler = Arc::new(CrawlScheduler::new(crawler.clone()));
    scheduler.start(interval)?;

    let app = create_app(AppState::new(crawler, scheduler.clone(), api_key));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.stop().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let storage = nc_storage::create_storage(&cli.database_url, cli.max_connections).await?;
    let fetcher = create_fetcher(cli.fetcher, cli.fetch_timeout.0)?;
    info!("🦗 Fetcher initialized (using {})", fetcher.name());
    let crawler = Crawler::new(fetcher, storage, cli.target_url.clone());

    match cli.command.clone().unwrap_or_default() {
        Commands::Serve { bind } => serve(crawler, &cli.api_key, cli.interval.0, &bind).await?,
        Commands::Crawl(command) => handle_command(command, &crawler).await?,
    }

    Ok(())
}
