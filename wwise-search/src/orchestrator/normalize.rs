//! Map backend-native records onto [`SearchResult`].

use crate::types::{IdTypeFilter, SearchResult};
use crate::waapi::WaapiObject;

const UNKNOWN: &str = "Unknown";

/// Normalise one WAAPI object found by the `filter` pass.
///
/// The display name records which pass found it:
/// `"<name> (<kind>) - <filter>"`. Identifier fields are copied as-is.
pub fn normalize_live(object: WaapiObject, filter: IdTypeFilter) -> SearchResult {
    let name = object.name.as_deref().unwrap_or(UNKNOWN);
    let kind = object.kind.as_deref().unwrap_or(UNKNOWN);
    SearchResult {
        name: format!("{name} ({kind}) - {filter}"),
        object_type: kind.to_owned(),
        guid: object.id,
        short_id: object.short_id.map(|id| id.to_string()),
        media_id: None,
        path: object.path,
    }
}

/// File-backed records already use the shared schema; only blank
/// identifier strings are folded into `None`.
pub fn normalize_file(mut record: SearchResult) -> SearchResult {
    for field in [
        &mut record.guid,
        &mut record.short_id,
        &mut record.media_id,
        &mut record.path,
    ] {
        if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
            *field = None;
        }
    }
    record
}
