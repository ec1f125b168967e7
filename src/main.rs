//! econcal - economic calendar API
//!
//! Serves this week's economic events to the dashboard, caching the weekly
//! feed on disk until its last event has passed.

use std::sync::Arc;

use clap::{error::ErrorKind, CommandFactory, Parser};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use econcal::{
    cache::{CacheStore, FileCacheStore, MemoryCacheStore},
    cli::{Cli, CliError, FeedSource, Settings},
    server::create_app,
    service::CalendarService,
    state::AppState,
    upstream::{CommandFeed, EventFeed, HttpFeed},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "econcal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let calendar = build_calendar_service(&settings)?;
    let app = create_app(AppState::new(calendar));

    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires the cache store and upstream feed selected by `settings`
fn build_calendar_service(
    settings: &Settings,
) -> Result<CalendarService, Box<dyn std::error::Error>> {
    let file_store = settings
        .cache_dir
        .clone()
        .map(FileCacheStore::with_dir)
        .or_else(FileCacheStore::new);

    let store: Arc<dyn CacheStore> = match file_store {
        Some(store) => {
            tracing::info!(path = %store.cache_path().display(), "persisting economic events cache");
            Arc::new(store)
        }
        None => {
            tracing::warn!("no cache directory available, economic events will not survive restarts");
            Arc::new(MemoryCacheStore::new())
        }
    };

    let feed: Arc<dyn EventFeed> = match &settings.feed {
        FeedSource::Http(url) => Arc::new(
            HttpFeed::new(url.clone(), settings.upstream_timeout)?
                .with_source_offset(settings.source_offset),
        ),
        FeedSource::Command(line) => Arc::new(
            CommandFeed::from_command_line(line, settings.upstream_timeout)
                .ok_or(CliError::EmptyFeedCommand)?
                .with_source_offset(settings.source_offset),
        ),
    };
    tracing::info!(source = %feed.describe(), timeout = ?settings.upstream_timeout, "upstream feed configured");

    Ok(CalendarService::new(store, feed))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
