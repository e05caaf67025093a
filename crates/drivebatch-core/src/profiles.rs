//! Pre-configured profiles for common usage scenarios
//!
//! - Development: verbose logging, fail-fast, single retry attempt
//! - Production: info logging, retries enabled
//! - Quiet: warnings only, no progress output (scripts and CI)

use crate::config::ClientConfig;
use crate::error::Error;
use crate::resilience::RetryConfig;
use std::str::FromStr;

/// Profile selector for pre-configured clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigProfile {
    /// Development: debug logging, no retries so failures surface quickly
    Development,
    /// Production: retries with backoff, info logging
    #[default]
    Production,
    /// Quiet: warnings only, progress disabled
    Quiet,
}

impl ConfigProfile {
    /// Create a ClientConfig from this profile
    pub fn create_config(self) -> ClientConfig {
        let mut config = ClientConfig::new();

        match self {
            Self::Development => {
                config.log_level = "debug".to_string();
                config.retry = RetryConfig::none();
                config.progress = true;
            }

            Self::Production => {
                config.log_level = "info".to_string();
                config.retry = RetryConfig::conservative();
                config.progress = true;
            }

            Self::Quiet => {
                config.log_level = "warn".to_string();
                config.retry = RetryConfig::conservative();
                config.progress = false;
            }
        }

        config
    }

    /// Human-readable profile name
    pub fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Quiet => "quiet",
        }
    }
}

impl FromStr for ConfigProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "quiet" => Ok(Self::Quiet),
            other => Err(Error::config_error(format!(
                "Unknown profile '{}'. Valid options: development, production, quiet",
                other
            ))),
        }
    }
}
