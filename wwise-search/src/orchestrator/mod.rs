//! Search orchestration: live passes, normalisation, merging, paging.
//!
//! [`Dispatcher`] validates a request, routes it to the file backends or to
//! a WAAPI session, normalises and deduplicates the hits, and hands them to
//! the caller's [`SearchContext`], where each source keeps its own
//! [`PageState`].

pub mod context;
pub mod dedup;
pub mod dispatch;
pub mod live;
pub mod normalize;
pub mod paginate;

pub use context::{SearchContext, SearchTicket, SourceMap};
pub use dispatch::Dispatcher;
pub use paginate::{PageState, PageView, PAGE_SIZE};
