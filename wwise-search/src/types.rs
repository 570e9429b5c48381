//! Core types: identifier kinds, search sources, requests and results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Which kind of identifier the query string should be matched against.
///
/// The derived ordering (`Guid < ShortId < MediaId`) is the order in which
/// per-filter passes run, and therefore the order results are merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdTypeFilter {
    /// Globally unique object identifier, with or without braces.
    #[serde(rename = "GUID")]
    Guid,
    /// 32-bit numeric identifier of containers, events, banks.
    #[serde(rename = "ShortID")]
    ShortId,
    /// Numeric identifier of a compiled audio source.
    #[serde(rename = "MediaID")]
    MediaId,
}

impl IdTypeFilter {
    /// Tag used on the wire and as the provenance label in result names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Guid => "GUID",
            Self::ShortId => "ShortID",
            Self::MediaId => "MediaID",
        }
    }

    /// Returns all filter variants in pass order.
    pub fn all() -> &'static [IdTypeFilter] {
        &[Self::Guid, Self::ShortId, Self::MediaId]
    }

    /// Parse a list of tags, silently dropping anything unrecognised.
    pub fn parse_tags<I, S>(tags: I) -> BTreeSet<IdTypeFilter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter_map(|tag| match tag.as_ref().parse() {
                Ok(filter) => Some(filter),
                Err(_) => {
                    tracing::debug!(tag = tag.as_ref(), "ignoring unknown id type");
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for IdTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IdTypeFilter {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "guid" => Ok(Self::Guid),
            "shortid" | "short" => Ok(Self::ShortId),
            "mediaid" | "media" => Ok(Self::MediaId),
            other => Err(SearchError::InvalidInput(format!(
                "unknown id type '{other}' (expected GUID, ShortID or MediaID)"
            ))),
        }
    }
}

/// A backend a search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Offline project directory (`.wproj` + `.wwu` work units).
    #[serde(alias = "project")]
    ProjectTree,
    /// Running Wwise authoring instance reached through WAAPI.
    #[serde(alias = "waapi")]
    LiveMiddleware,
    /// Generated SoundBank directory (`SoundbanksInfo.json` / `.xml`).
    #[serde(alias = "bank")]
    BankDirectory,
}

impl Source {
    /// Returns the human-readable name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProjectTree => "project",
            Self::LiveMiddleware => "waapi",
            Self::BankDirectory => "bank",
        }
    }

    /// Returns all sources.
    pub fn all() -> &'static [Source] {
        &[Self::ProjectTree, Self::LiveMiddleware, Self::BankDirectory]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" | "project-tree" | "wwise" => Ok(Self::ProjectTree),
            "waapi" | "live" | "live-middleware" => Ok(Self::LiveMiddleware),
            "bank" | "banks" | "bank-directory" => Ok(Self::BankDirectory),
            other => Err(SearchError::InvalidInput(format!(
                "unknown source '{other}' (expected project, waapi or bank)"
            ))),
        }
    }
}

/// One identifier lookup against one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub source: Source,
    pub query: String,
    pub filters: BTreeSet<IdTypeFilter>,
}

impl SearchRequest {
    pub fn new(
        source: Source,
        query: impl Into<String>,
        filters: impl IntoIterator<Item = IdTypeFilter>,
    ) -> Self {
        Self {
            source,
            query: query.into(),
            filters: filters.into_iter().collect(),
        }
    }

    /// Build a request for the currently active source.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidInput`] when no source is active; a
    /// default source is never assumed.
    pub fn for_active(
        active: Option<Source>,
        query: impl Into<String>,
        filters: impl IntoIterator<Item = IdTypeFilter>,
    ) -> Result<Self, SearchError> {
        let source = active
            .ok_or_else(|| SearchError::InvalidInput("no search source is active".into()))?;
        Ok(Self::new(source, query, filters))
    }
}

/// A single object hit, in the schema shared by every source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display name. Live results carry their provenance:
    /// `"<name> (<kind>) - <filter>"`.
    pub name: String,
    /// Object kind (`Sound`, `Event`, `Media`, ...).
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    /// Project hierarchy path, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SearchResult {
    /// A result with only a name and kind set.
    pub fn named(name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            guid: None,
            short_id: None,
            media_id: None,
            path: None,
        }
    }
}
