//! Cache Proxy - a concurrent HTTP forward proxy with an LRU object cache
//!
//! Usage: `cache_proxy <PORT>`

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_proxy::api::serve_admin;
use cache_proxy::{spawn_stats_reporter, AppState, Args, Config, ProxyServer};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Parse the listening port and tuning flags
/// 3. Create the shared cache and worker settings
/// 4. Start the optional stats reporter and admin API
/// 5. Bind the proxy listener on all interfaces
/// 6. Accept connections until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args(Args::parse());
    config.validate().context("Invalid configuration")?;
    info!(
        "Configuration loaded: port={}, max_cache_size={}, max_object_size={}",
        config.port, config.max_cache_size, config.max_object_size
    );

    let state = AppState::from_config(&config);

    let reporter = (config.stats_interval > 0)
        .then(|| spawn_stats_reporter(state.cache.clone(), config.stats_interval));

    let admin = config.admin_port.map(|port| {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_admin(addr, state).await {
                error!(error = %err, "Admin API stopped");
            }
        })
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = ProxyServer::bind(addr, state)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    server.run_until(shutdown_signal()).await;

    if let Some(handle) = reporter {
        handle.abort();
        warn!("Stats reporter aborted");
    }
    if let Some(handle) = admin {
        handle.abort();
    }

    info!("Proxy shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that fails to install never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
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
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
