//! wwise-id-finder: look up Wwise GUIDs, ShortIDs and MediaIDs.
//!
//! The search engine lives in the `wwise-search` crate. This crate adds
//! the pieces around it:
//! - **Configuration**: `config.toml` in the platform config directory
//! - **Rendering**: paginated result tables
//! - **Shell**: an interactive session that keeps per-source pages

pub mod app_dirs;
pub mod config;
pub mod error;
pub mod render;
pub mod shell;

pub use config::{AppConfig, ConfigOverrides};
pub use error::{AppError, Result};
pub use shell::{Shell, ShellCommand, Step};
