use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::PollerError;

use super::{paths, Config, PollConfig};

/// Environment variable that adds one ad-hoc polling session
pub const URL_ENV: &str = "ATOMIC_RELOAD_URL";

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let mut config = match Self::try_load().await {
            Ok(config) => {
                info!(
                    sessions = config.sessions.len(),
                    timeout_secs = ?config.request_timeout_secs,
                    "Loaded configuration"
                );
                config
            }
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };

        if let Ok(url) = env::var(URL_ENV) {
            config.push_url_session(&url);
        }

        config
    }

    async fn try_load() -> Result<Self, PollerError> {
        let config_path = paths::get_config_path()?;
        Self::load_from(&config_path).await
    }

    /// Read and parse a config file. A missing file yields the defaults.
    pub async fn load_from(config_path: &Path) -> Result<Self, PollerError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .await
            .map_err(|err| PollerError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| PollerError::Config(format!("Failed to parse config.json: {err}")))
    }

    fn push_url_session(&mut self, url: &str) {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return;
        }
        info!(url = %trimmed, "Adding session from environment");
        self.sessions.push(PollConfig::new("output", "status", trimmed));
    }
}
