//! Error types for the wwise-search crate.
//!
//! Every variant renders as a complete, user-facing message. Raw query
//! strings never appear in error messages.

/// Errors that can occur while resolving an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Missing configuration for the active source, an empty query, or no
    /// identifier type selected. No backend was contacted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The WAAPI handshake or a remote call exceeded its deadline.
    #[error("WAAPI did not respond within {0} seconds; make sure Wwise is running with WAAPI enabled")]
    Timeout(u64),

    /// The WAAPI endpoint could not be reached at all.
    #[error("cannot reach WAAPI ({0}); check that Wwise is running and the host and port are correct")]
    Unreachable(String),

    /// The transport closed for any reason other than our own teardown.
    #[error("WAAPI connection closed: {0}")]
    ConnectionClosed(String),

    /// A remote call failed. Per-filter failures are logged and skipped;
    /// this surfaces only when every filter failed, or from a probe.
    #[error("WAAPI call failed: {0}")]
    BackendCallFailed(String),

    /// A file-backed search could not run (bad directory, I/O, parse).
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Convenience type alias for wwise-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
