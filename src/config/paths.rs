use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::types::PollerError;

/// Environment variable that points directly at a config file
pub const CONFIG_PATH_ENV: &str = "ATOMIC_RELOAD_CONFIG";

/// Get the path to the config.json file
/// Looks for config.json in the app directory (parent of the binary's folder)
pub(super) fn get_config_path() -> Result<PathBuf, PollerError> {
    if let Ok(custom) = env::var(CONFIG_PATH_ENV) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            debug!(path = %trimmed, "Config path taken from environment");
            return Ok(PathBuf::from(trimmed));
        }
    }

    // Executable is at: app_root/bin/atomic-reload
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            debug!(path = %config_path.display(), "Looking for config");
            return Ok(config_path);
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    Ok(PathBuf::from("config.json"))
}
