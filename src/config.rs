use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid duration '{value}': {message}")]
    Duration { value: String, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Humantime string, e.g. "10s".
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Single-satellite antenna tracking cadence.
    #[serde(default = "default_track_period")]
    pub track_period: String,
    /// Multi-satellite pass prediction cadence.
    #[serde(default = "default_predict_period")]
    pub predict_period: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> String {
    "10s".to_string()
}

fn default_track_period() -> String {
    "30s".to_string()
}

fn default_predict_period() -> String {
    "1m".to_string()
}

fn default_city() -> String {
    "baghdad".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            track_period: default_track_period(),
            predict_period: default_predict_period(),
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            city: default_city(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.service.request_timeout)
    }

    pub fn track_period(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.polling.track_period)
    }

    pub fn predict_period(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.polling.predict_period)
    }
}

fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::Duration {
        value: value.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_view_cadences() {
        let config = Config::default();
        assert_eq!(config.track_period().unwrap(), Duration::from_secs(30));
        assert_eq!(config.predict_period().unwrap(), Duration::from_secs(60));
        assert_eq!(config.observer.city, "baghdad");
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("service:\n  base_url: http://sat.example\n").unwrap();
        assert_eq!(config.service.base_url, "http://sat.example");
        assert_eq!(config.service.request_timeout, "10s");
        assert_eq!(config.polling.track_period, "30s");
    }

    #[test]
    fn bad_duration_is_reported() {
        let config: Config = serde_yaml::from_str("polling:\n  track_period: soon\n").unwrap();
        assert!(config.track_period().is_err());
    }
}
