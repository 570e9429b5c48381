//! Merge per-filter result batches into a key-unique sequence.
//!
//! Results are keyed by GUID when they have one, otherwise by MediaID, then
//! ShortID. When a key repeats, the **later** record replaces the earlier
//! one in place: output order is the order keys first appeared, contents
//! are the last record seen for each key. An earlier, possibly more specific
//! match can therefore be replaced by a later pass. Records with no
//! identifier at all are never merged.

use std::collections::HashMap;

use crate::types::SearchResult;

/// Identity of a result for merging purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Guid(String),
    Media(String),
    Short(String),
}

/// The key a result merges under, if any.
pub fn dedup_key(result: &SearchResult) -> Option<DedupKey> {
    fn present(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    present(&result.guid)
        .map(DedupKey::Guid)
        .or_else(|| present(&result.media_id).map(DedupKey::Media))
        .or_else(|| present(&result.short_id).map(DedupKey::Short))
}

/// Deduplicate an ordered concatenation of batches, last write wins.
pub fn deduplicate<I>(results: I) -> Vec<SearchResult>
where
    I: IntoIterator<Item = SearchResult>,
{
    let mut merged: Vec<SearchResult> = Vec::new();
    let mut positions: HashMap<DedupKey, usize> = HashMap::new();

    for result in results {
        match dedup_key(&result) {
            Some(key) => match positions.get(&key) {
                Some(&index) => merged[index] = result,
                None => {
                    positions.insert(key, merged.len());
                    merged.push(result);
                }
            },
            None => merged.push(result),
        }
    }

    merged
}

/// Flatten batches in pass order, then deduplicate.
pub fn merge_batches(batches: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    deduplicate(batches.into_iter().flatten())
}
