//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::NodeError;

/// Configuration for a tally node.
///
/// Can be loaded from a TOML file via [`TallyConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Data directory for the LMDB relational store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// Redis URL for the counter and ranked set stores. When absent the
    /// in-process backend is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,

    /// Lifetime of cached page responses.
    #[serde(default = "default_page_cache_ttl_secs")]
    pub page_cache_ttl_secs: u64,

    /// Maximum number of entries in each page cache.
    #[serde(default = "default_page_cache_capacity")]
    pub page_cache_capacity: u64,

    /// Maximum number of voter records kept in the credential cache.
    #[serde(default = "default_voter_cache_capacity")]
    pub voter_cache_capacity: u64,

    /// Number of idle voter records the pool retains.
    #[serde(default = "default_voter_pool_size")]
    pub voter_pool_size: usize,

    /// Serialize submissions from the same credential so concurrent requests
    /// cannot both pass the allowance check.
    #[serde(default = "default_true")]
    pub serialize_voter_submissions: bool,

    /// Retries for the background relational vote insert.
    #[serde(default = "default_durable_write_retries")]
    pub durable_write_retries: u32,

    /// Base backoff between durable insert retries; attempt `n` waits `n` times this.
    #[serde(default = "default_durable_retry_backoff_ms")]
    pub durable_retry_backoff_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to expose the Prometheus `/metrics` endpoint.
    #[serde(default)]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tally_data")
}

fn default_lmdb_map_size() -> usize {
    1 << 30
}

fn default_page_cache_ttl_secs() -> u64 {
    60
}

fn default_page_cache_capacity() -> u64 {
    10_000
}

fn default_voter_cache_capacity() -> u64 {
    100_000
}

fn default_voter_pool_size() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_durable_write_retries() -> u32 {
    3
}

fn default_durable_retry_backoff_ms() -> u64 {
    50
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl TallyConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn page_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.page_cache_ttl_secs)
    }

    pub fn durable_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.durable_retry_backoff_ms)
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            lmdb_map_size: default_lmdb_map_size(),
            redis_url: None,
            page_cache_ttl_secs: default_page_cache_ttl_secs(),
            page_cache_capacity: default_page_cache_capacity(),
            voter_cache_capacity: default_voter_cache_capacity(),
            voter_pool_size: default_voter_pool_size(),
            serialize_voter_submissions: default_true(),
            durable_write_retries: default_durable_write_retries(),
            durable_retry_backoff_ms: default_durable_retry_backoff_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
        }
    }
}
