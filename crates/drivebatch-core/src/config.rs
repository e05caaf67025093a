//! Client configuration.
//!
//! Values are loaded from a YAML file, then overridden by command-line flags.

use crate::error::{Error, Result};
use crate::resilience::RetryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on concurrent workers for a single batch
pub const MAX_WORKERS: usize = 10;

/// Worker count used when nothing else is configured
pub const DEFAULT_WORKERS: i64 = 5;

/// Global client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root directory of the store backing the remote service
    pub store_path: PathBuf,
    /// Requested worker count (clamped by the batch engine)
    pub workers: i64,
    /// Keep going after an item fails
    pub continue_on_error: bool,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Render progress lines while a batch runs
    pub progress: bool,
    /// Retry policy applied to each remote request
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".drivebatch/store"),
            workers: DEFAULT_WORKERS,
            continue_on_error: false,
            log_level: "info".to_string(),
            progress: true,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(Error::config_error("store_path cannot be empty"));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::config_error("retry.max_attempts must be at least 1"));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config_error(
                "retry.backoff_multiplier must be >= 1.0",
            ));
        }

        Ok(())
    }

    /// Store path with `~` and environment variables expanded
    pub fn expanded_store_path(&self) -> Result<PathBuf> {
        let raw = self.store_path.to_string_lossy();
        let expanded = shellexpand::full(&raw).map_err(|e| {
            Error::config_error(format!("Cannot expand store path '{}': {}", raw, e))
        })?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a YAML file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, yaml).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to save config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
