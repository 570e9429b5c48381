//! # wwise-search
//!
//! Resolve Wwise object identifiers (GUIDs, ShortIDs, MediaIDs) against
//! three independent sources and present one merged, paginated list.
//!
//! ## Sources
//!
//! - **Project tree**: the `.wwu` XML work units of an offline project
//! - **Live middleware**: a running Wwise instance over WAAPI (WAMP over
//!   WebSocket), one bounded session per search
//! - **Bank directory**: generated `SoundbanksInfo.json` / `.xml`
//!
//! ## Design
//!
//! - Requests are validated before any backend is contacted
//! - Live searches run one WAQL query per identifier type, sequentially,
//!   on a single session with a 10 second deadline; a failing pass is
//!   logged and skipped
//! - Results are deduplicated by identifier (last pass wins) and stored
//!   per source in a caller-owned [`SearchContext`], 20 per page
//! - Late results from a superseded search are dropped
//!
//! Search queries are logged only at debug level.

pub mod backends;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;
pub mod waapi;
pub mod waql;

pub use backends::{BackendError, FileSearchBackend, LocalFiles};
pub use config::{BankConfig, ProjectConfig, SourceConfig, WaapiConfig};
pub use error::{Result, SearchError};
pub use orchestrator::{Dispatcher, PageState, PageView, SearchContext, SearchTicket, PAGE_SIZE};
pub use types::{IdTypeFilter, SearchRequest, SearchResult, Source};
pub use waapi::ServerInfo;

/// Search with the local file system and a WebSocket WAAPI client, storing
/// the results in `ctx`.
///
/// Returns the number of merged results now on page 1 of the request's
/// source.
///
/// # Errors
///
/// [`SearchError::InvalidInput`] for an incomplete request (no backend is
/// contacted), [`SearchError::BackendUnavailable`] when a file search
/// fails, and the WAAPI session errors for the live source.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> wwise_search::Result<()> {
/// use wwise_search::{IdTypeFilter, SearchContext, SearchRequest, Source};
///
/// let mut ctx = SearchContext::default();
/// let request = SearchRequest::new(Source::LiveMiddleware, "7654321", [IdTypeFilter::ShortId]);
/// let count = wwise_search::search(&mut ctx, &request).await?;
/// for result in ctx.page(Source::LiveMiddleware).visible_window() {
///     println!("{}", result.name);
/// }
/// # let _ = count;
/// # Ok(())
/// # }
/// ```
pub async fn search(ctx: &mut SearchContext, request: &SearchRequest) -> Result<usize> {
    Dispatcher::local().search(ctx, request).await
}

/// Connectivity test against the WAAPI endpoint in `config`.
///
/// # Errors
///
/// Same classification as a live search: [`SearchError::Timeout`],
/// [`SearchError::Unreachable`], [`SearchError::ConnectionClosed`], or
/// [`SearchError::BackendCallFailed`] if the information call is refused.
pub async fn probe(config: &SourceConfig) -> Result<ServerInfo> {
    Dispatcher::local().probe(config).await
}
