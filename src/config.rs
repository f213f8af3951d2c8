//! Job configuration from environment variables
//!
//! Loaded after `dotenv` so a local `.env` file can supply the API key.

use crate::pipeline::diff::KeyScope;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.thegraph.com/api";
pub const DEFAULT_SUBGRAPH_ID: &str = "DZz4kDTdmzWLWsV373w2bSmoar3umKKH9y82SUKr5qmp";
pub const DEFAULT_SNAPSHOT_HOUR: u32 = 8;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Configuration for the daily metrics job
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Gateway credential (never logged)
    pub api_key: String,

    pub gateway_url: String,

    pub subgraph_id: String,

    /// UTC hour during which today's snapshot is persisted
    pub snapshot_hour: u32,

    pub page_size: usize,

    pub request_timeout: Duration,

    pub reports_dir: PathBuf,

    pub metrics_dir: PathBuf,

    pub logs_dir: PathBuf,

    pub key_scope: KeyScope,
}

impl MetricsConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `GRAPH_API_KEY` (required)
    /// - `METRIC_SNAPSHOT_HOUR` (default: 8)
    /// - `GRAPH_GATEWAY_URL` (default: https://gateway.thegraph.com/api)
    /// - `NETWORK_SUBGRAPH_ID` (default: the network subgraph deployment)
    /// - `PAGE_SIZE` (default: 1000)
    /// - `REQUEST_TIMEOUT_SECS` (default: 30)
    /// - `REPORTS_DIR` (default: reports)
    /// - `METRICS_DIR` (default: reports/metrics)
    /// - `LOGS_DIR` (default: logs)
    /// - `DELTA_KEY_SCOPE` (default: today)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GRAPH_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVariable("GRAPH_API_KEY".to_string()))?;

        let snapshot_hour = match lookup("METRIC_SNAPSHOT_HOUR") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(hour) if hour < 24 => hour,
                _ => {
                    return Err(ConfigError::InvalidValue(format!(
                        "METRIC_SNAPSHOT_HOUR must be an hour between 0 and 23, got '{}'",
                        raw
                    )))
                }
            },
            None => DEFAULT_SNAPSHOT_HOUR,
        };

        let page_size = match lookup("PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue(format!(
                        "PAGE_SIZE must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let key_scope = match lookup("DELTA_KEY_SCOPE") {
            Some(raw) => KeyScope::parse(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "DELTA_KEY_SCOPE must be 'today' or 'union', got '{}'",
                    raw
                ))
            })?,
            None => KeyScope::Today,
        };

        let reports_dir: PathBuf = lookup("REPORTS_DIR")
            .unwrap_or_else(|| "reports".to_string())
            .into();

        let metrics_dir = lookup("METRICS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| reports_dir.join("metrics"));

        Ok(Self {
            api_key,
            gateway_url: lookup("GRAPH_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            subgraph_id: lookup("NETWORK_SUBGRAPH_ID")
                .unwrap_or_else(|| DEFAULT_SUBGRAPH_ID.to_string()),
            snapshot_hour,
            page_size,
            request_timeout,
            reports_dir,
            metrics_dir,
            logs_dir: lookup("LOGS_DIR").unwrap_or_else(|| "logs".to_string()).into(),
            key_scope,
        })
    }

    /// Gateway endpoint with the API key masked, for logs
    pub fn redacted_endpoint(&self) -> String {
        format!("{}/<redacted>/subgraphs/id/{}", self.gateway_url, self.subgraph_id)
    }
}
