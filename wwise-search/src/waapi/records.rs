//! Typed views of WAAPI replies, decoded at the protocol boundary.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// One object returned by `ak.wwise.core.object.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaapiObject {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub short_id: Option<ShortIdValue>,
    pub path: Option<String>,
}

/// WAAPI reports `shortId` as a number; tolerate a string too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ShortIdValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for ShortIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Decode the `return` array of an object query.
///
/// A missing or empty array means no hits. Entries that are not objects
/// are skipped.
pub fn decode_objects(kwargs: &Map<String, Value>) -> Vec<WaapiObject> {
    let Some(Value::Array(items)) = kwargs.get("return") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match WaapiObject::deserialize(item) {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed WAAPI object");
                None
            }
        })
        .collect()
}

/// Summary of the connected authoring application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub app_name: String,
    pub version: String,
    pub platform: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InfoReply {
    display_name: Option<String>,
    version: Option<VersionInfo>,
    platform: Option<PlatformInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VersionInfo {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlatformInfo {
    Name(String),
    Detailed {
        #[serde(default, rename = "basePlatform")]
        base_platform: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl ServerInfo {
    /// Decode `ak.wwise.core.getInfo` keyword results, applying the
    /// `"Wwise"` / `"Unknown"` fallbacks for absent fields.
    pub fn from_kwargs(kwargs: &Map<String, Value>) -> Self {
        let reply = match InfoReply::deserialize(&Value::Object(kwargs.clone())) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(error = %e, "unexpected getInfo shape, using fallbacks");
                InfoReply::default()
            }
        };

        let platform = match reply.platform {
            Some(PlatformInfo::Name(name)) => Some(name),
            Some(PlatformInfo::Detailed {
                base_platform,
                name,
            }) => base_platform.or(name),
            None => None,
        };

        Self {
            app_name: non_empty(reply.display_name).unwrap_or_else(|| "Wwise".to_owned()),
            version: non_empty(reply.version.and_then(|v| v.display_name))
                .unwrap_or_else(|| "Unknown".to_owned()),
            platform: non_empty(platform).unwrap_or_else(|| "Unknown".to_owned()),
        }
    }

    /// Multi-line connection report.
    pub fn summary(&self) -> String {
        format!(
            "Connected.\n\nApplication: {}\nWwise version: {}\nPlatform: {}",
            self.app_name, self.version, self.platform
        )
    }
}

impl fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.app_name, self.version, self.platform)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
