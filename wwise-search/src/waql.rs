//! WAQL query construction for the live WAAPI source.
//!
//! Each selected [`IdTypeFilter`] becomes one `ak.wwise.core.object.get`
//! query. File-backed sources never pass through here; they receive the raw
//! query string and filter tags.

use serde_json::{Map, Value};

use crate::types::IdTypeFilter;

/// Fields every object query asks WAAPI to return.
pub const RETURN_FIELDS: &[&str] = &["id", "name", "type", "shortId", "path"];

/// Object kinds that carry a ShortID.
pub const SHORT_ID_KINDS: &[&str] = &[
    "Sound",
    "SoundBank",
    "Event",
    "MusicSegment",
    "DialogueEvent",
    "Actor",
    "AuxBus",
    "RandomOrSequenceContainer",
    "SwitchContainer",
    "BlendContainer",
];

/// Leaf objects that own audio sources and therefore MediaIDs.
pub const MEDIA_SOURCE_KINDS: &[&str] = &["Sound"];

/// How a GUID query string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidForm {
    /// Already wrapped in braces: matched verbatim.
    Bracketed,
    /// Hyphenated body without braces: wrapped, then matched exactly.
    Bare,
    /// Anything else: substring match on the object id.
    Partial,
}

impl GuidForm {
    pub fn classify(query: &str) -> Self {
        if query.contains('{') && query.contains('}') {
            Self::Bracketed
        } else if query.contains('-') {
            Self::Bare
        } else {
            Self::Partial
        }
    }
}

/// One encoded object query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQuery {
    /// The pass that produced this query; becomes the provenance label.
    pub filter: IdTypeFilter,
    pub waql: String,
    pub return_fields: &'static [&'static str],
}

impl ObjectQuery {
    /// Keyword arguments for `ak.wwise.core.object.get`.
    pub fn kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("waql".into(), Value::String(self.waql.clone()));
        kwargs
    }

    /// Call options selecting the returned fields.
    pub fn options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        let fields = self
            .return_fields
            .iter()
            .map(|field| Value::String((*field).to_owned()))
            .collect();
        options.insert("return".into(), Value::Array(fields));
        options
    }
}

/// Encode `query` for `filter`.
///
/// Returns `None` when the filter cannot produce a meaningful query, e.g. a
/// non-numeric string for a numeric identifier kind.
pub fn encode(query: &str, filter: IdTypeFilter) -> Option<ObjectQuery> {
    let query = query.trim();
    let waql = match filter {
        IdTypeFilter::Guid => match GuidForm::classify(query) {
            GuidForm::Bracketed => format!("$ {}", quote(query)),
            GuidForm::Bare => format!("$ {}", quote(&format!("{{{query}}}"))),
            GuidForm::Partial => {
                format!("from object \"*\" where id =* {}", quote(&format!("*{query}*")))
            }
        },
        IdTypeFilter::ShortId => {
            let id = numeric(query, filter)?;
            format!("from type {} where shortId = {id}", SHORT_ID_KINDS.join(", "))
        }
        IdTypeFilter::MediaId => {
            let id = numeric(query, filter)?;
            format!(
                "from type {} where mediaId = {id}",
                MEDIA_SOURCE_KINDS.join(", ")
            )
        }
    };
    tracing::trace!(%filter, %waql, "encoded WAQL query");
    Some(ObjectQuery {
        filter,
        waql,
        return_fields: RETURN_FIELDS,
    })
}

/// Encode one query per filter, in the iteration order of `filters`.
pub fn encode_all<'a, I>(query: &str, filters: I) -> Vec<ObjectQuery>
where
    I: IntoIterator<Item = &'a IdTypeFilter>,
{
    filters
        .into_iter()
        .filter_map(|filter| encode(query, *filter))
        .collect()
}

fn numeric(query: &str, filter: IdTypeFilter) -> Option<u32> {
    match query.parse::<u32>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::debug!(%filter, "query is not a 32-bit number, skipping filter");
            None
        }
    }
}

/// Double-quoted WAQL string literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
