// src/probe/executor.rs
use crate::config::ProbeConfig;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// A trivial read against a table JupyterHub is guaranteed to have.
const PROBE_QUERY: &str = "SELECT * FROM users LIMIT 1";

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug)]
pub struct ProbeOutcome {
    /// Wall-clock time from connection start to query completion.
    pub elapsed: Duration,
}

impl ProbeOutcome {
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed.as_millis() as i64
    }
}

/// One database round-trip per call: fresh connection, single-row read,
/// connection discarded. No pooling at a 30-second cadence.
pub struct ProbeExecutor {
    options: PgConnectOptions,
    timeout: Duration,
}

impl ProbeExecutor {
    pub fn new(config: &ProbeConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        Self {
            options,
            timeout: config.timeout(),
        }
    }

    /// Attempt one probe. The reference implementation set no timeout and
    /// could stall indefinitely on a hung network; the whole attempt is
    /// bounded here so metrics never go stale past one timeout window.
    pub async fn execute(&self) -> Result<ProbeOutcome, ProbeError> {
        match timeout(self.timeout, self.round_trip()).await {
            Ok(Ok(elapsed)) => Ok(ProbeOutcome { elapsed }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }

    async fn round_trip(&self) -> Result<Duration, ProbeError> {
        let start = Instant::now();

        let mut conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(ProbeError::Connect)?;

        let row = sqlx::query(PROBE_QUERY)
            .fetch_optional(&mut conn)
            .await
            .map_err(ProbeError::Query)?;

        let elapsed = start.elapsed();
        debug!(row_found = row.is_some(), elapsed_ms = elapsed.as_millis() as u64, "probe query completed");

        // The query has already answered; a failed close changes nothing.
        let _ = conn.close().await;

        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> ProbeConfig {
        ProbeConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_secs: 2,
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_database_is_an_error_not_a_panic() {
        let executor = ProbeExecutor::new(&unreachable_config());
        let err = executor.execute().await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Connect(_) | ProbeError::Timeout(_)
        ));
    }

    #[test]
    fn outcome_reports_whole_milliseconds() {
        let outcome = ProbeOutcome {
            elapsed: Duration::from_micros(2500),
        };
        assert_eq!(outcome.elapsed_ms(), 2);
    }
}
