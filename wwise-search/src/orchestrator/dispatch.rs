//! Top-level search: validate, route to a source, normalise, merge.

use std::path::Path;

use crate::backends::{BackendError, FileSearchBackend, LocalFiles};
use crate::config::SourceConfig;
use crate::error::SearchError;
use crate::types::{IdTypeFilter, SearchRequest, SearchResult, Source};
use crate::waapi::{Connector, Endpoint, ServerInfo, SessionClient, WsConnector};

use super::context::SearchContext;
use super::dedup::{deduplicate, merge_batches};
use super::live::search_live;
use super::normalize::normalize_file;

/// Routes searches to the file backends or to WAAPI.
pub struct Dispatcher<F, C> {
    files: F,
    live: SessionClient<C>,
}

impl Dispatcher<LocalFiles, WsConnector> {
    /// Local file system plus a WebSocket WAAPI client.
    pub fn local() -> Self {
        Self::new(LocalFiles, SessionClient::new(WsConnector))
    }
}

impl<F: FileSearchBackend, C: Connector> Dispatcher<F, C> {
    pub fn new(files: F, live: SessionClient<C>) -> Self {
        Self { files, live }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn live(&self) -> &SessionClient<C> {
        &self.live
    }

    /// Reject a request before any backend is contacted.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidInput`] when the source's settings are missing,
    /// the query is blank, or no identifier type is selected.
    pub fn validate(request: &SearchRequest, config: &SourceConfig) -> Result<(), SearchError> {
        config.validate_for(request.source)?;
        if request.query.trim().is_empty() {
            return Err(SearchError::InvalidInput("query is empty".into()));
        }
        if request.filters.is_empty() {
            return Err(SearchError::InvalidInput("no identifier type selected".into()));
        }
        Ok(())
    }

    /// Run `request` and return the merged result list.
    ///
    /// # Errors
    ///
    /// Validation errors, file backend failures (as
    /// [`SearchError::BackendUnavailable`]) and WAAPI session failures.
    pub async fn execute(
        &self,
        request: &SearchRequest,
        config: &SourceConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        Self::validate(request, config)?;
        let query = request.query.trim();
        let source = request.source;
        tracing::info!(%source, filters = request.filters.len(), "search started");
        tracing::debug!(%source, query, "search query");

        let merged = match source {
            Source::ProjectTree => {
                let directory = directory(config.project.path.as_deref(), "project directory")?;
                let records = self
                    .files
                    .search_project_tree(directory, query, &tags(request))
                    .await
                    .map_err(unavailable)?;
                deduplicate(records.into_iter().map(normalize_file))
            }
            Source::BankDirectory => {
                let directory = directory(config.bank.path.as_deref(), "SoundBank directory")?;
                let records = self
                    .files
                    .search_bank_directory(directory, query, &tags(request))
                    .await
                    .map_err(unavailable)?;
                deduplicate(records.into_iter().map(normalize_file))
            }
            Source::LiveMiddleware => {
                let endpoint = Endpoint::from(&config.waapi);
                let batches = search_live(&self.live, &endpoint, query, &request.filters).await?;
                merge_batches(batches)
            }
        };

        tracing::info!(%source, count = merged.len(), "search finished");
        Ok(merged)
    }

    /// Run `request` and store its results in `ctx` at page 1.
    ///
    /// On failure the source's previous results are kept. Returns the
    /// number of merged results.
    ///
    /// `ctx` stays borrowed for the whole search, so searches through one
    /// context run one at a time and the ticket always commits. Callers
    /// that overlap searches should hold the context themselves and use
    /// [`SearchContext::begin`], [`Dispatcher::execute`] and
    /// [`SearchContext::commit`]; `commit` then drops any result whose
    /// ticket a newer search has superseded.
    pub async fn search(
        &self,
        ctx: &mut SearchContext,
        request: &SearchRequest,
    ) -> Result<usize, SearchError> {
        let ticket = ctx.begin(request.source);
        let items = self.execute(request, &ctx.config).await?;
        let count = items.len();
        ctx.commit(ticket, items);
        Ok(count)
    }

    /// Search the context's active source.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidInput`] when no source is active.
    pub async fn search_active(
        &self,
        ctx: &mut SearchContext,
        query: &str,
        filters: impl IntoIterator<Item = IdTypeFilter>,
    ) -> Result<usize, SearchError> {
        let request = SearchRequest::for_active(ctx.active(), query, filters)?;
        self.search(ctx, &request).await
    }

    /// Connectivity test against the configured WAAPI endpoint.
    pub async fn probe(&self, config: &SourceConfig) -> Result<ServerInfo, SearchError> {
        config.validate_for(Source::LiveMiddleware)?;
        self.live.probe(&Endpoint::from(&config.waapi)).await
    }
}

fn directory<'a>(path: Option<&'a Path>, what: &str) -> Result<&'a Path, SearchError> {
    path.ok_or_else(|| SearchError::InvalidInput(format!("{what} is not set")))
}

fn tags(request: &SearchRequest) -> Vec<String> {
    request
        .filters
        .iter()
        .map(|filter| filter.label().to_owned())
        .collect()
}

fn unavailable(err: BackendError) -> SearchError {
    tracing::warn!(error = %err, "file search failed");
    SearchError::BackendUnavailable(err.to_string())
}
