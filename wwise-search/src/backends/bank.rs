//! Search generated SoundBank metadata (`SoundbanksInfo.json` / `.xml`).
//!
//! The JSON file is preferred when both exist. Every entry below
//! `SoundBanks` is visited; an entry's kind comes from the collection it
//! sits in (`Events` → `Event`, `Media` → `Media`, ...).

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::types::{IdTypeFilter, SearchResult};

use super::validate::BANK_INFO_FILES;
use super::{is_valid_guid, present, BackendError, Needle, UNNAMED};

const MEDIA: &str = "Media";

/// Search the bank metadata in `directory`.
pub fn search(directory: &Path, needle: &Needle) -> Result<Vec<SearchResult>, BackendError> {
    if !directory.is_dir() {
        return Err(BackendError::NotADirectory(directory.to_path_buf()));
    }
    let [json_name, xml_name] = BANK_INFO_FILES;
    let json = directory.join(json_name);
    let xml = directory.join(xml_name);

    let results = if json.is_file() {
        search_json(&json, needle)?
    } else if xml.is_file() {
        search_xml(&xml, needle)?
    } else {
        return Err(BackendError::MissingBankInfo(directory.to_path_buf()));
    };
    tracing::debug!(count = results.len(), "bank directory searched");
    Ok(results)
}

/// One metadata entry, reduced to what matching needs.
struct Entry<'a> {
    name: &'a str,
    kind: &'a str,
    guid: &'a str,
    id: String,
    path: Option<String>,
}

impl Entry<'_> {
    fn collect(&self, needle: &Needle, out: &mut Vec<SearchResult>) {
        let guid = is_valid_guid(self.guid).then(|| self.guid.to_owned());

        if needle.wants(IdTypeFilter::Guid) && guid.is_some() && needle.matches(self.guid) {
            out.push(self.result(guid.clone(), present(&self.id), None));
        }
        if needle.wants(IdTypeFilter::ShortId) && needle.matches(&self.id) {
            out.push(self.result(guid.clone(), present(&self.id), None));
        }
        if needle.wants(IdTypeFilter::MediaId) && self.kind == MEDIA && needle.matches(&self.id) {
            out.push(self.result(None, None, present(&self.id)));
        }
    }

    fn result(
        &self,
        guid: Option<String>,
        short_id: Option<String>,
        media_id: Option<String>,
    ) -> SearchResult {
        SearchResult {
            name: self.name.to_owned(),
            object_type: self.kind.to_owned(),
            guid,
            short_id,
            media_id,
            path: self.path.clone(),
        }
    }
}

fn search_json(file: &Path, needle: &Needle) -> Result<Vec<SearchResult>, BackendError> {
    let contents = fs::read_to_string(file).map_err(BackendError::io(file))?;
    let root: Value = serde_json::from_str(&contents).map_err(|e| BackendError::Parse {
        path: file.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut results = Vec::new();
    let banks = root
        .get("SoundBanksInfo")
        .and_then(|info| info.get("SoundBanks"))
        .and_then(Value::as_array);
    for bank in banks.into_iter().flatten() {
        visit_json(bank, "SoundBank", needle, &mut results);
    }
    Ok(results)
}

fn visit_json(value: &Value, kind: &str, needle: &Needle, out: &mut Vec<SearchResult>) {
    match value {
        Value::Object(object) => {
            json_entry(object, kind).collect(needle, out);
            for (key, child) in object {
                visit_json(child, json_collection_kind(key), needle, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_json(item, kind, needle, out);
            }
        }
        _ => {}
    }
}

fn json_entry<'a>(object: &'a Map<String, Value>, kind: &'a str) -> Entry<'a> {
    let text = |key: &str| object.get(key).and_then(Value::as_str);
    let id = match object.get("Id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };
    Entry {
        name: text("Name").or_else(|| text("ShortName")).unwrap_or(UNNAMED),
        kind,
        guid: text("GUID").unwrap_or_default(),
        id,
        path: text("ObjectPath").and_then(present),
    }
}

fn json_collection_kind(key: &str) -> &str {
    match key {
        "Events" => "Event",
        "Media" => MEDIA,
        "GameParameters" => "GameParameter",
        "StateGroups" => "StateGroup",
        "States" => "State",
        "SwitchGroups" => "SwitchGroup",
        "Switches" => "Switch",
        "Busses" => "Bus",
        "AuxBusses" => "AuxBus",
        "AcousticTextures" => "AcousticTexture",
        "Plugins" => "Plugin",
        "Custom" => "CustomPlugin",
        "AudioDevices" => "AudioDevice",
        "SwitchContainers" => "SwitchContainer",
        other => other,
    }
}

fn search_xml(file: &Path, needle: &Needle) -> Result<Vec<SearchResult>, BackendError> {
    let contents = fs::read_to_string(file).map_err(BackendError::io(file))?;
    let doc = Document::parse(&contents).map_err(|e| BackendError::Parse {
        path: file.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut results = Vec::new();
    let banks = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("SoundBanks"));
    for bank in banks
        .iter()
        .flat_map(|banks| banks.children())
        .filter(|n| n.has_tag_name("SoundBank"))
    {
        visit_xml(bank, "SoundBank", needle, &mut results);
    }
    Ok(results)
}

fn visit_xml(node: Node<'_, '_>, kind: &str, needle: &Needle, out: &mut Vec<SearchResult>) {
    xml_entry(node, kind).collect(needle, out);

    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name().name();
        match xml_collection(tag) {
            Some((member, kind)) => {
                for item in child.children().filter(|n| n.has_tag_name(member)) {
                    visit_xml(item, kind, needle, out);
                }
            }
            None => {
                let kind = if tag == "File" { MEDIA } else { tag };
                visit_xml(child, kind, needle, out);
            }
        }
    }
}

/// `(member tag, kind)` for XML collection elements.
fn xml_collection(tag: &str) -> Option<(&'static str, &'static str)> {
    let pair = match tag {
        "Events" => ("Event", "Event"),
        "Media" => ("File", MEDIA),
        "GameParameters" => ("GameParameter", "GameParameter"),
        "StateGroups" => ("StateGroup", "StateGroup"),
        "States" => ("State", "State"),
        "SwitchGroups" => ("SwitchGroup", "SwitchGroup"),
        "Switches" => ("Switch", "Switch"),
        "Busses" => ("Bus", "Bus"),
        "AuxBusses" => ("AuxBus", "AuxBus"),
        "AcousticTextures" => ("AcousticTexture", "AcousticTexture"),
        "AudioDevices" => ("Plugin", "AudioDevice"),
        "Custom" => ("Plugin", "CustomPlugin"),
        "SwitchContainers" => ("SwitchContainer", "SwitchContainer"),
        _ => return None,
    };
    Some(pair)
}

fn xml_entry<'a>(node: Node<'a, '_>, kind: &'a str) -> Entry<'a> {
    let child_text = |tag: &str| {
        node.children()
            .find(|n| n.has_tag_name(tag))
            .and_then(|n| n.text())
    };
    let name = node
        .attribute("Name")
        .or_else(|| node.attribute("ShortName"))
        .or_else(|| child_text("ShortName"))
        .or_else(|| child_text("ObjectPath"))
        .unwrap_or(UNNAMED);
    Entry {
        name,
        kind,
        guid: node.attribute("GUID").unwrap_or_default(),
        id: node.attribute("Id").unwrap_or_default().to_owned(),
        path: child_text("ObjectPath")
            .or_else(|| child_text("Path"))
            .and_then(present),
    }
}
