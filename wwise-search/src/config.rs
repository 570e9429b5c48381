//! Per-source connection and location settings.
//!
//! [`SourceConfig`] holds what each source needs before it can be searched:
//! a project directory, a WAAPI host and port, or a SoundBank directory.
//! It is read-only while a search runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SearchError;
use crate::types::Source;

/// Default WAAPI host.
pub const DEFAULT_WAAPI_HOST: &str = "127.0.0.1";
/// Default WAAPI WebSocket port.
pub const DEFAULT_WAAPI_PORT: u16 = 8080;
/// Deadline for the WAAPI handshake and for each remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for all three sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub project: ProjectConfig,
    pub waapi: WaapiConfig,
    pub bank: BankConfig,
}

/// Offline project directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding the `.wproj` file.
    pub path: Option<PathBuf>,
}

/// Live WAAPI endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaapiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WaapiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WAAPI_HOST.to_owned(),
            port: DEFAULT_WAAPI_PORT,
        }
    }
}

/// Generated SoundBank directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Directory holding `SoundbanksInfo.json` or `SoundbanksInfo.xml`.
    pub path: Option<PathBuf>,
}

impl SourceConfig {
    /// Checks that `source` has everything it needs to be searched.
    ///
    /// Only presence is checked here; directory contents are validated by
    /// the file backends when a path is accepted.
    pub fn validate_for(&self, source: Source) -> Result<(), SearchError> {
        match source {
            Source::ProjectTree => require_path(self.project.path.as_ref(), "project directory"),
            Source::LiveMiddleware => {
                if self.waapi.host.trim().is_empty() {
                    return Err(SearchError::InvalidInput("WAAPI host is not set".into()));
                }
                if self.waapi.port == 0 {
                    return Err(SearchError::InvalidInput("WAAPI port is not set".into()));
                }
                Ok(())
            }
            Source::BankDirectory => require_path(self.bank.path.as_ref(), "SoundBank directory"),
        }
    }
}

fn require_path(path: Option<&PathBuf>, what: &str) -> Result<(), SearchError> {
    match path {
        Some(p) if !p.as_os_str().is_empty() => Ok(()),
        _ => Err(SearchError::InvalidInput(format!("{what} is not set"))),
    }
}
