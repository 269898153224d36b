// src/config/mod.rs
use std::env;
use std::time::Duration;
use tracing::warn;

const DEFAULT_USER: &str = "jupyterhub";
const DEFAULT_PASSWORD: &str = "secretpassword";
const DEFAULT_HOST: &str = "jupyterhub-db.redhat-ods-applications.svc.cluster.local";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "jupyterhub";
const DEFAULT_INTERVAL_SECS: u64 = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_METRICS_PORT: u16 = 8080;

/// Connection and scheduling parameters, resolved once at startup and
/// read-only for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    pub metrics_port: u16,
}

impl ProbeConfig {
    /// Resolve configuration from the environment.
    ///
    /// Every variable has a documented default, so an empty environment
    /// yields a usable (cluster-internal) configuration:
    ///
    /// - `JUPYTERHUB_DB_USER` (default "jupyterhub")
    /// - `JUPYTERHUB_DB_PASSWORD` (default "secretpassword")
    /// - `JUPYTERHUB_DB_ROUTE` (default
    ///   "jupyterhub-db.redhat-ods-applications.svc.cluster.local")
    /// - `JUPYTERHUB_DB_PORT` (default 5432)
    /// - `JUPYTERHUB_DB_NAME` (default "jupyterhub")
    /// - `JUPYTERHUB_DB_PROBE_INTERVAL_SECS` (default 30)
    /// - `JUPYTERHUB_DB_PROBE_TIMEOUT_SECS` (default 10)
    /// - `JUPYTERHUB_DB_PROBE_METRICS_PORT` (default 8080)
    pub fn from_env() -> Self {
        Self {
            user: env_or("JUPYTERHUB_DB_USER", DEFAULT_USER),
            password: env_or("JUPYTERHUB_DB_PASSWORD", DEFAULT_PASSWORD),
            host: env_or("JUPYTERHUB_DB_ROUTE", DEFAULT_HOST),
            port: env_parsed("JUPYTERHUB_DB_PORT", DEFAULT_PORT),
            database: env_or("JUPYTERHUB_DB_NAME", DEFAULT_DATABASE),
            interval_secs: env_parsed("JUPYTERHUB_DB_PROBE_INTERVAL_SECS", DEFAULT_INTERVAL_SECS),
            timeout_secs: env_parsed("JUPYTERHUB_DB_PROBE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            metrics_port: env_parsed("JUPYTERHUB_DB_PROBE_METRICS_PORT", DEFAULT_METRICS_PORT),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Numeric coercion only; a malformed value falls back to the default with a
/// warning instead of aborting startup.
fn env_parsed<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value {:?} for {}, using default {}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}
