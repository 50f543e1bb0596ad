//! Configuration types for har-replay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{ReplayError, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the HAR file to replay
    pub har_file: PathBuf,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Emit per-request diagnostic traces
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.har_file.as_os_str().is_empty() {
            return Err(ReplayError::ConfigError(
                "har_file cannot be empty".to_string(),
            ));
        }

        if !self.har_file.exists() {
            return Err(ReplayError::ConfigError(format!(
                "HAR file does not exist: {}",
                self.har_file.display()
            )));
        }

        if self.port == 0 {
            return Err(ReplayError::ConfigError("port cannot be 0".to_string()));
        }

        Ok(())
    }
}
