//! Per-filter passes against one WAAPI session.
//!
//! Passes run strictly one after another in filter order. A pass whose
//! call is answered with an ERROR contributes nothing and the remaining
//! passes still run; a session failure (deadline, lost transport) abandons
//! the passes not yet attempted and fails the search.

use std::collections::BTreeSet;

use crate::error::SearchError;
use crate::types::{IdTypeFilter, SearchResult};
use crate::waapi::records::decode_objects;
use crate::waapi::session::OBJECT_GET;
use crate::waapi::{CallError, Connector, Endpoint, SessionClient};
use crate::waql;

use super::normalize::normalize_live;

/// Run one `ak.wwise.core.object.get` pass per encodable filter and return
/// the normalised batches in pass order.
///
/// No connection is made when no filter yields a query.
///
/// # Errors
///
/// Session open failures and session failures during a pass are returned
/// as-is. [`SearchError::BackendCallFailed`] is returned only when every
/// attempted pass was answered with an error.
pub async fn search_live<C: Connector>(
    client: &SessionClient<C>,
    endpoint: &Endpoint,
    query: &str,
    filters: &BTreeSet<IdTypeFilter>,
) -> Result<Vec<Vec<SearchResult>>, SearchError> {
    let queries = waql::encode_all(query, filters);
    if queries.is_empty() {
        tracing::debug!("no filter produced a WAQL query");
        return Ok(Vec::new());
    }

    let mut session = client.open(endpoint).await?;

    let mut batches = Vec::with_capacity(queries.len());
    let mut failures: Vec<String> = Vec::new();
    let mut fatal = None;

    for pass in &queries {
        let filter = pass.filter;
        match session
            .call(OBJECT_GET, Vec::new(), pass.kwargs(), pass.options())
            .await
        {
            Ok(reply) => {
                let batch: Vec<SearchResult> = decode_objects(&reply.kwargs)
                    .into_iter()
                    .map(|object| normalize_live(object, filter))
                    .collect();
                tracing::debug!(%filter, count = batch.len(), "WAAPI pass returned results");
                batches.push(batch);
            }
            Err(CallError::Remote(detail)) => {
                tracing::warn!(%filter, error = %detail, "WAAPI pass failed, skipping");
                failures.push(format!("{filter}: {detail}"));
            }
            Err(CallError::Session(err)) => {
                tracing::warn!(%filter, error = %err, "WAAPI session failed, abandoning remaining passes");
                fatal = Some(err);
                break;
            }
        }
    }

    session.close().await;

    if let Some(err) = fatal {
        return Err(err);
    }
    if batches.is_empty() && !failures.is_empty() {
        return Err(SearchError::BackendCallFailed(failures.join("; ")));
    }
    Ok(batches)
}
