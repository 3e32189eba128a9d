use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::notify::DEFAULT_SUBSCRIBER_BUFFER;
use crate::poller::{PollerConfig, RequestParameters, DEFAULT_INTERVAL, POSITIONS_TOPIC};
use crate::soap::SoapEndpoint;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: SoapEndpoint,
    /// Parameters used when the caller does not supply its own: `track` without
    /// overrides, or `POST /api/poller/start` with no body.
    #[serde(default)]
    pub request: Option<RequestParameters>,
    #[serde(default)]
    pub poller: PollerSettings,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerSettings {
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            topic: default_topic(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl PollerSettings {
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.interval,
            topic: self.topic.clone(),
        }
    }
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_topic() -> String {
    POSITIONS_TOPIC.to_string()
}

fn default_subscriber_buffer() -> usize {
    DEFAULT_SUBSCRIBER_BUFFER
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.url.trim().is_empty() {
            return Err(ConfigError::Invalid("service.url is empty".into()));
        }
        if self.poller.interval.is_zero() {
            return Err(ConfigError::Invalid("poller.interval must be positive".into()));
        }
        if self.poller.subscriber_buffer == 0 {
            return Err(ConfigError::Invalid(
                "poller.subscriber_buffer must be positive".into(),
            ));
        }
        if let Some(request) = &self.request {
            request
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}

/// Deserialize a humantime string such as `1s` or `1500ms`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}
