//! TOML configuration for the command-line tool.
//!
//! ```toml
//! active_source = "waapi"
//!
//! [project]
//! path = "D:/Projects/Game"
//!
//! [waapi]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [bank]
//! path = "D:/Projects/Game/GeneratedSoundBanks/Windows"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wwise_search::{SearchContext, Source, SourceConfig};

use crate::app_dirs;
use crate::error::{AppError, Result};

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source searched by `shell` until `use` picks another.
    pub active_source: Option<Source>,

    #[serde(flatten)]
    pub sources: SourceConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub project: Option<PathBuf>,
    pub bank: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `explicit` if given, otherwise the default config file.
    ///
    /// A missing default file yields defaults; an explicitly named file
    /// must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let path = app_dirs::config_file();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.project {
            self.sources.project.path = Some(path.clone());
        }
        if let Some(path) = &overrides.bank {
            self.sources.bank.path = Some(path.clone());
        }
        if let Some(host) = &overrides.host {
            self.sources.waapi.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.sources.waapi.port = port;
        }
    }

    /// A fresh search context seeded with these settings.
    pub fn into_context(self) -> SearchContext {
        let mut ctx = SearchContext::new(self.sources);
        ctx.set_active(self.active_source);
        ctx
    }
}
