//! Financhat Binary
//!
//! Starts the Financhat API service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin financhat
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FINANCHAT_CONFIG`: Config file path (default: config.yaml, may be absent)
//! - `ALPHA_VANTAGE_KEY`: Alpha Vantage API key (interpolated by config.yaml)
//! - `RUST_LOG`: Log level override (default: from config)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use financhat::cache::{MarketCache, Refresher};
use financhat::config::{Config, ObservabilityConfig, load_config};
use financhat::marketdata::{PriceProvider, UpstreamProviders};
use financhat::persistence::Database;
use financhat::server::{AppState, create_router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Graceful shutdown timeout for background tasks.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path = std::env::var("FINANCHAT_CONFIG").ok();
    let config = load_config(config_path.as_deref()).context("loading configuration")?;

    init_tracing(&config.observability);
    tracing::info!("Starting Financhat");
    log_config(&config);

    let config = Arc::new(config);
    let database = Arc::new(
        Database::open(&config.database)
            .await
            .context("opening database")?,
    );

    // Startup hygiene: drop sessions that expired while the service was down
    match database.sessions().purge_expired(chrono::Utc::now()).await {
        Ok(purged) if purged > 0 => tracing::info!(purged, "Expired sessions purged"),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Expired session purge failed"),
    }

    let cache = Arc::new(MarketCache::new(&config.market));
    let shutdown_token = CancellationToken::new();

    let refresher_handle = start_refresher(
        &config,
        Arc::clone(&cache),
        Arc::clone(&database),
        shutdown_token.clone(),
    )?;

    let state = Arc::new(AppState::new(
        Arc::clone(&database),
        Arc::clone(&cache),
        Arc::clone(&config),
    ));
    let app = create_router(state);

    let addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind_address, config.server.http_port
    )
    .parse()
    .context("parsing bind address")?;

    let listener = TcpListener::bind(addr).await.context("binding listener")?;
    tracing::info!(%addr, "Financhat ready");

    let shutdown = shutdown_token.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await
        .context("serving HTTP")?;

    if let Some(handle) = refresher_handle {
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err() {
            tracing::warn!("Refresher did not stop within the shutdown timeout");
        }
    }

    tracing::info!("Financhat stopped");
    Ok(())
}

/// Load .env if present; absence is fine.
fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Initialize the tracing subscriber from the observability config.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Log the effective configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        bind_address = %config.server.bind_address,
        database_url = %config.database.url,
        refresh_enabled = config.market.refresh_enabled,
        refresh_interval_secs = config.market.refresh_interval_secs,
        "Configuration loaded"
    );
}

/// Build the providers and spawn the background refresher, unless disabled.
fn start_refresher(
    config: &Arc<Config>,
    cache: Arc<MarketCache>,
    database: Arc<Database>,
    shutdown: CancellationToken,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    if !config.market.refresh_enabled {
        tracing::info!("Background refresher disabled, serving fallback prices only");
        return Ok(None);
    }

    let providers: Arc<dyn PriceProvider> = Arc::new(
        UpstreamProviders::new(&config.providers).context("building market data providers")?,
    );

    let refresher = Refresher::new(cache, providers, database, &config.market, shutdown);
    tracing::info!(
        interval_secs = config.market.refresh_interval_secs,
        "Background refresher started"
    );
    Ok(Some(refresher.spawn()))
}

/// Wait for ctrl-c (or SIGTERM on unix).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
