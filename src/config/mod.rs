//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default throttle window for result emissions, in milliseconds
pub const DEFAULT_THROTTLE_MS: u64 = 300;

/// Engine-wide settings shared by every subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum spacing between two emissions of one subscription
    ///
    /// Zero disables throttling: every merged state is emitted.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn with_throttle(mut self, window: Duration) -> Self {
        self.throttle_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
