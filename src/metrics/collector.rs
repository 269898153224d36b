// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<ProbeMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(ProbeMetrics::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<ProbeMetrics> {
        self.collector.clone()
    }

    /// Render the current state in the Prometheus text exposition format.
    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }
}

/// The two process-wide gauges, created once at startup and overwritten on
/// every probe iteration. No labels; the latest attempt is the only state.
pub struct ProbeMetrics {
    pub probe_success: IntGauge,
    pub response_time_ms: IntGauge,
}

impl ProbeMetrics {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probe_success = IntGauge::new(
            "jupyterhub_db_probe_success",
            "Whether the JupyterHub DB probe succeeded. 1 indicates a success",
        )?;
        registry.register(Box::new(probe_success.clone()))?;

        let response_time_ms = IntGauge::new(
            "jupyterhub_db_response_time",
            "Probe round-trip time in milliseconds. Negative values indicate failures",
        )?;
        registry.register(Box::new(response_time_ms.clone()))?;

        Ok(Self {
            probe_success,
            response_time_ms,
        })
    }

    pub fn record_success(&self, elapsed: Duration) {
        self.probe_success.set(1);
        self.response_time_ms.set(elapsed.as_millis() as i64);
    }

    pub fn record_failure(&self) {
        self.probe_success.set(0);
        self.response_time_ms.set(-1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauges_start_at_zero() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();
        assert_eq!(metrics.probe_success.get(), 0);
        assert_eq!(metrics.response_time_ms.get(), 0);
    }

    #[test]
    fn success_then_failure_overwrites() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_success(Duration::from_millis(42));
        assert_eq!(metrics.probe_success.get(), 1);
        assert_eq!(metrics.response_time_ms.get(), 42);

        metrics.record_failure();
        assert_eq!(metrics.probe_success.get(), 0);
        assert_eq!(metrics.response_time_ms.get(), -1);
    }

    #[test]
    fn exposition_contains_both_families() {
        let registry = MetricsRegistry::new().unwrap();
        registry.collector().record_success(Duration::from_millis(7));

        let body = String::from_utf8(registry.gather()).unwrap();
        assert!(body.contains("jupyterhub_db_probe_success 1"));
        assert!(body.contains("jupyterhub_db_response_time 7"));
        assert!(body.contains("# HELP jupyterhub_db_probe_success"));
    }
}
