use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Status API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    constants::api::STATUS_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    constants::api::REQUEST_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Recommended-quote selection thresholds. These encode business
/// policy, not algorithm shape, so they are configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Skip the best-priced quote if its ETA reaches this many seconds
    #[serde(default = "default_max_eta_seconds")]
    pub max_eta_seconds: u64,
    /// A fast quote must return at least this fraction of the best
    /// adjusted return to be recommended
    #[serde(default = "default_return_value_tolerance")]
    pub return_value_tolerance: f64,
}

fn default_max_eta_seconds() -> u64 {
    constants::ranking::MAX_ETA_SECONDS
}

fn default_return_value_tolerance() -> f64 {
    constants::ranking::RETURN_VALUE_TOLERANCE
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_eta_seconds: default_max_eta_seconds(),
            return_value_tolerance: default_return_value_tolerance(),
        }
    }
}

/// Polling scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    constants::tracker::POLL_INTERVAL_SECS
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Top-level configuration, loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file: {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_constants() {
        let config = Config::default();
        assert_eq!(config.ranking.max_eta_seconds, constants::ranking::MAX_ETA_SECONDS);
        assert_eq!(
            config.ranking.return_value_tolerance,
            constants::ranking::RETURN_VALUE_TOLERANCE
        );
        assert_eq!(
            config.tracker.poll_interval_secs,
            constants::tracker::POLL_INTERVAL_SECS
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ranking]
            max_eta_seconds = 150
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.max_eta_seconds, 150);
        assert_eq!(
            config.ranking.return_value_tolerance,
            constants::ranking::RETURN_VALUE_TOLERANCE
        );
        assert_eq!(config.api.base_url, constants::api::STATUS_API_BASE);
    }
}
