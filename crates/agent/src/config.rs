//! Agent configuration

use advisor_lib::engine::EngineConfig;
use advisor_lib::history::default_data_dir;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Agent configuration, read from `DOCKWISE_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Name attached to log events
    #[serde(default = "default_host_name")]
    pub host_name: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Seconds between background analysis runs
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Seconds an analysis is served from cache
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Entries kept per history list
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON snapshot to analyze; the simulated provider is used when unset
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_host_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_history_limit() -> usize {
    100
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            api_port: default_api_port(),
            refresh_interval_secs: default_refresh_interval(),
            cache_ttl_secs: default_cache_ttl(),
            history_limit: default_history_limit(),
            data_dir: default_data_dir(),
            snapshot_path: None,
        }
    }
}

impl AgentConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("DOCKWISE").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid DOCKWISE_* configuration, using defaults");
            AgentConfig::default()
        }))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            history_limit: self.history_limit,
            data_dir: self.data_dir.clone(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
