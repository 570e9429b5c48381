//! Error types for the wwise-id-finder front end.

use wwise_search::SearchError;

/// Top-level error type for the command-line tool.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file could not be parsed or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// Unrecognised or malformed shell command.
    #[error("{0}")]
    Command(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A search or probe failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_display_unchanged() {
        let err = AppError::from(SearchError::Timeout(10));
        assert_eq!(err.to_string(), SearchError::Timeout(10).to_string());
    }

    #[test]
    fn config_error_is_prefixed() {
        let err = AppError::Config("expected a table".into());
        assert_eq!(err.to_string(), "config error: expected a table");
    }
}
