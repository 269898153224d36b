// src/main.rs
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

mod config;
mod metrics;
mod probe;
mod scheduler;
mod server;

use crate::{
    config::ProbeConfig,
    metrics::MetricsRegistry,
    probe::ProbeExecutor,
    scheduler::ProbeScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jupyterhub_db_probe=debug".parse()?)
                .add_directive("hyper=info".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    // Resolve configuration from the environment
    let config = ProbeConfig::from_env();
    info!(
        "Probing {}:{}/{} as {} every {:?}",
        config.host,
        config.port,
        config.database,
        config.user,
        config.interval()
    );

    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    // Start the exposition endpoint before the first probe so the gauges are
    // scrapeable immediately
    let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics_port).into();
    server::start_metrics_server(metrics_addr, metrics_registry).await?;

    // Start the probe loop
    let scheduler = Arc::new(ProbeScheduler::new(
        ProbeExecutor::new(&config),
        metrics,
        config.interval(),
    ));
    let runner = tokio::spawn(scheduler.clone().start());

    shutdown_signal().await;
    scheduler.shutdown();
    runner.await?;

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
