//! File-backed search collaborators: project work units and SoundBank
//! metadata on the local file system.
//!
//! Both searches take a directory, the raw identifier string and the
//! identifier type tags, and return records already in the shared
//! [`SearchResult`] schema. [`LocalFiles`] runs them on the blocking pool.

pub mod bank;
pub mod guid;
pub mod project;
pub mod validate;

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::types::{IdTypeFilter, SearchResult};

pub use guid::is_valid_guid;
pub use validate::{
    check_bank_directory, check_project_directory, validate_bank_directory,
    validate_project_directory,
};

/// Name used when a matched object carries none.
pub(crate) const UNNAMED: &str = "Unnamed";

/// Errors raised by the file-backed searches.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no .wproj file in {}", .0.display())]
    MissingProjectFile(PathBuf),

    #[error("no SoundbanksInfo.json or SoundbanksInfo.xml in {}", .0.display())]
    MissingBankInfo(PathBuf),

    #[error("no .wwu work units under {}", .0.display())]
    NoWorkUnits(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("invalid search pattern: {0}")]
    Pattern(String),

    #[error("search task failed: {0}")]
    Task(String),
}

impl BackendError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The two delegated directory searches.
pub trait FileSearchBackend: Send + Sync {
    /// Search every work unit of the project in `directory`.
    fn search_project_tree(
        &self,
        directory: &Path,
        id: &str,
        id_types: &[String],
    ) -> impl Future<Output = Result<Vec<SearchResult>, BackendError>> + Send;

    /// Search the SoundBank metadata in `directory`.
    fn search_bank_directory(
        &self,
        directory: &Path,
        id: &str,
        id_types: &[String],
    ) -> impl Future<Output = Result<Vec<SearchResult>, BackendError>> + Send;
}

/// [`FileSearchBackend`] over the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileSearchBackend for LocalFiles {
    async fn search_project_tree(
        &self,
        directory: &Path,
        id: &str,
        id_types: &[String],
    ) -> Result<Vec<SearchResult>, BackendError> {
        let directory = directory.to_path_buf();
        let needle = Needle::new(id, id_types);
        run_blocking(move || project::search(&directory, &needle)).await
    }

    async fn search_bank_directory(
        &self,
        directory: &Path,
        id: &str,
        id_types: &[String],
    ) -> Result<Vec<SearchResult>, BackendError> {
        let directory = directory.to_path_buf();
        let needle = Needle::new(id, id_types);
        run_blocking(move || bank::search(&directory, &needle)).await
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, BackendError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| BackendError::Task(e.to_string()))?
}

/// What the file searches look for.
///
/// Matching is a case-insensitive substring test. Numeric identifier
/// kinds are only searched when the query is all digits.
#[derive(Debug, Clone)]
pub struct Needle {
    query: String,
    numeric: bool,
    filters: BTreeSet<IdTypeFilter>,
}

impl Needle {
    pub fn new(id: &str, id_types: &[String]) -> Self {
        let query = id.trim().to_lowercase();
        let numeric = !query.is_empty() && query.chars().all(|c| c.is_ascii_digit());
        Self {
            query,
            numeric,
            filters: IdTypeFilter::parse_tags(id_types),
        }
    }

    /// Whether `filter` was requested and applies to this query.
    pub fn wants(&self, filter: IdTypeFilter) -> bool {
        let applicable = match filter {
            IdTypeFilter::Guid => true,
            IdTypeFilter::ShortId | IdTypeFilter::MediaId => self.numeric,
        };
        applicable && self.filters.contains(&filter)
    }

    pub fn matches(&self, value: &str) -> bool {
        !value.is_empty() && value.to_lowercase().contains(&self.query)
    }
}

/// `Some(value)` unless blank.
pub(crate) fn present(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}
