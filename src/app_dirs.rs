//! Where wwise-id-finder looks for its configuration.
//!
//! | Purpose | macOS | Linux | Windows |
//! |---------|-------|-------|---------|
//! | Config | `~/Library/Application Support/wwise-id-finder/` | `~/.config/wwise-id-finder/` | `%APPDATA%\wwise-id-finder\` |
//!
//! Set `WWISE_ID_FINDER_CONFIG_DIR` to use another directory.

use std::path::PathBuf;

/// Environment variable overriding [`config_dir`].
pub const CONFIG_DIR_ENV: &str = "WWISE_ID_FINDER_CONFIG_DIR";

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("wwise-id-finder"))
        .unwrap_or_else(|| PathBuf::from(".wwise-id-finder"))
}

/// Default config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
