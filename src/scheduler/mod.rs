// src/scheduler/mod.rs
use crate::metrics::ProbeMetrics;
use crate::probe::{ProbeError, ProbeExecutor, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Drives the probe on a fixed cadence and publishes each result to the
/// gauges. No jitter, no backoff, no iteration cap; a failed probe yields the
/// failure values and the loop keeps going.
pub struct ProbeScheduler {
    executor: ProbeExecutor,
    metrics: Arc<ProbeMetrics>,
    interval: Duration,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl ProbeScheduler {
    pub fn new(executor: ProbeExecutor, metrics: Arc<ProbeMetrics>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            executor,
            metrics,
            interval,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Runs until `shutdown()` is called. The first probe fires immediately;
    /// subsequent ones follow the configured interval.
    pub async fn start(self: Arc<Self>) {
        let mut tick = interval(self.interval);
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut was_healthy: Option<bool> = None;

        info!("Starting probe scheduler with interval: {:?}", self.interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let result = self.executor.execute().await;
                    was_healthy = Some(self.record(result, was_healthy));
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Probe scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Collapse any failure cause to the single "probe failed" outcome at
    /// this boundary; the cause itself only reaches the log. Returns the new
    /// health state so transitions get logged once, not every iteration.
    fn record(&self, result: Result<ProbeOutcome, ProbeError>, was_healthy: Option<bool>) -> bool {
        match result {
            Ok(outcome) => {
                self.metrics.record_success(outcome.elapsed);
                if was_healthy == Some(false) {
                    info!("Database is reachable again ({}ms)", outcome.elapsed_ms());
                } else {
                    debug!("Probe succeeded in {}ms", outcome.elapsed_ms());
                }
                true
            }
            Err(e) => {
                self.metrics.record_failure();
                if was_healthy != Some(false) {
                    warn!("Database probe failed: {}", e);
                } else {
                    debug!("Database probe still failing: {}", e);
                }
                false
            }
        }
    }
}
