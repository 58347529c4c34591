use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::PollerError;

/// Application configuration for the fragment poller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-request timeout. Unset means requests wait for the server.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub sessions: Vec<PollConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            sessions: Vec::new(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_user_agent() -> String {
    "atomic-reload".to_string()
}

/// One polling session: where to fetch from and which regions to update.
///
/// Field names accept both the snake_case form and the camelCase argument
/// names used by the page-side invocation (`outElemId`, `firstWaitMs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(alias = "outElemId", alias = "outputRegionId")]
    pub output_region_id: String,

    #[serde(alias = "statusElemId", alias = "statusRegionId")]
    pub status_region_id: String,

    #[serde(
        default = "default_http_method",
        alias = "method",
        alias = "httpMethod",
        deserialize_with = "deserialize_method"
    )]
    pub http_method: String,

    pub url: String,

    #[serde(
        default = "default_first_delay_ms",
        alias = "firstWaitMs",
        alias = "firstDelayMs"
    )]
    pub first_delay_ms: u64,

    #[serde(
        default = "default_retry_delay_ms",
        alias = "retryMs",
        alias = "retryDelayMs"
    )]
    pub retry_delay_ms: u64,
}

impl PollConfig {
    pub fn new(
        output_region_id: impl Into<String>,
        status_region_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            output_region_id: output_region_id.into(),
            status_region_id: status_region_id.into(),
            http_method: default_http_method(),
            url: url.into(),
            first_delay_ms: default_first_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    pub fn with_method(mut self, method: &str) -> Result<Self, PollerError> {
        self.http_method = normalize_method(method)?;
        Ok(self)
    }

    pub fn with_first_delay_ms(mut self, first_delay_ms: u64) -> Self {
        self.first_delay_ms = first_delay_ms;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn first_delay(&self) -> Duration {
        Duration::from_millis(self.first_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_first_delay_ms() -> u64 {
    5000
}

fn default_retry_delay_ms() -> u64 {
    3000
}

/// Upper-case a method name and check that it is a valid HTTP token.
pub fn normalize_method(method: &str) -> Result<String, PollerError> {
    let upper = method.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| PollerError::InvalidMethod(method.to_string()))?;
    Ok(upper)
}

fn deserialize_method<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize_method(&raw).map_err(serde::de::Error::custom)
}
