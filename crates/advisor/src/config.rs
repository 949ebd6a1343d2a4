//! Service configuration

use advisor_lib::predictor::DEFAULT_TOP_K;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable prefix, e.g. `AGRI_API_PORT`
pub const ENV_PREFIX: &str = "AGRI";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// HTTP port for prediction, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding `manifest.json` and the ONNX models
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Number of ranked crops per recommendation
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_service_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "agri-advisor".to_string())
}

fn default_api_port() -> u16 {
    8000
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api_port: default_api_port(),
            artifact_dir: default_artifact_dir(),
            top_k: default_top_k(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit environment source
    pub fn from_env(env: config::Environment) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            anyhow::bail!("{}_TOP_K must be at least 1", ENV_PREFIX);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_env(env(&[])).unwrap();
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.artifact_dir, PathBuf::from("./artifacts"));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_env(env(&[
            ("AGRI_API_PORT", "9090"),
            ("AGRI_TOP_K", "5"),
            ("AGRI_ARTIFACT_DIR", "/srv/models"),
        ]))
        .unwrap();
        assert_eq!(config.api_port, 9090);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/models"));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        assert!(ServiceConfig::from_env(env(&[("AGRI_TOP_K", "0")])).is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(ServiceConfig::from_env(env(&[("AGRI_API_PORT", "not-a-port")])).is_err());
    }
}
