//! Caller-owned search state: configuration, active source, page state.
//!
//! Each source has its own [`PageState`] and its own logical sequence
//! counter. A search takes a [`SearchTicket`] before it runs; its results
//! are committed only if no newer search for the same source has started
//! since, so a late reply can never overwrite a newer result set.

use crate::config::SourceConfig;
use crate::types::{SearchResult, Source};

use super::paginate::PageState;

/// One value per [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap<T> {
    pub project: T,
    pub waapi: T,
    pub bank: T,
}

impl<T> SourceMap<T> {
    pub fn get(&self, source: Source) -> &T {
        match source {
            Source::ProjectTree => &self.project,
            Source::LiveMiddleware => &self.waapi,
            Source::BankDirectory => &self.bank,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut T {
        match source {
            Source::ProjectTree => &mut self.project,
            Source::LiveMiddleware => &mut self.waapi,
            Source::BankDirectory => &mut self.bank,
        }
    }
}

/// Permission to commit the results of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    pub source: Source,
    pub sequence: u64,
}

/// State shared by every search a caller issues.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub config: SourceConfig,
    active: Option<Source>,
    pages: SourceMap<PageState>,
    sequences: SourceMap<u64>,
}

impl SearchContext {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The source searches go to. Never defaulted.
    pub fn active(&self) -> Option<Source> {
        self.active
    }

    pub fn set_active(&mut self, source: Option<Source>) {
        tracing::debug!(source = ?source, "active source changed");
        self.active = source;
    }

    pub fn page(&self, source: Source) -> &PageState {
        self.pages.get(source)
    }

    pub fn page_mut(&mut self, source: Source) -> &mut PageState {
        self.pages.get_mut(source)
    }

    /// Start a search for `source`, superseding any earlier one.
    pub fn begin(&mut self, source: Source) -> SearchTicket {
        let sequence = self.sequences.get_mut(source);
        *sequence += 1;
        SearchTicket {
            source,
            sequence: *sequence,
        }
    }

    /// Whether `ticket` belongs to the newest search for its source.
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        *self.sequences.get(ticket.source) == ticket.sequence
    }

    /// Store results for `ticket`'s source at page 1.
    ///
    /// Returns `false`, leaving page state untouched, when a newer search
    /// for the same source has begun.
    pub fn commit(&mut self, ticket: SearchTicket, items: Vec<SearchResult>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                source = %ticket.source,
                sequence = ticket.sequence,
                latest = *self.sequences.get(ticket.source),
                "dropping stale search results"
            );
            return false;
        }
        tracing::debug!(source = %ticket.source, count = items.len(), "search results committed");
        self.pages.get_mut(ticket.source).replace(items);
        true
    }

    /// Forget results for `source`.
    pub fn clear(&mut self, source: Source) {
        self.pages.get_mut(source).clear();
    }
}
