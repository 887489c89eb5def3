//! Configuration types for the machine health service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Hosted prediction service used when no endpoint is configured
pub const DEFAULT_ENDPOINT_URL: &str =
    "https://predictive-maintenance-service-644458477502.us-central1.run.app/predict";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Remote prediction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Pause applied after a successful prediction before the result is shown
    #[serde(default, with = "humantime_serde")]
    pub result_delay: Duration,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            result_delay: Duration::ZERO,
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_dashboard_port(),
        }
    }
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_dashboard_port() -> u16 {
    11120
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::MachineHealthError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
