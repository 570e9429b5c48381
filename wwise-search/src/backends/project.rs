//! Search the `.wwu` XML work units of a project directory.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::types::{IdTypeFilter, SearchResult};

use super::{is_valid_guid, present, BackendError, Needle, UNNAMED};

/// Search every work unit under `directory`.
///
/// Work units that cannot be read or parsed are skipped.
pub fn search(directory: &Path, needle: &Needle) -> Result<Vec<SearchResult>, BackendError> {
    if !directory.is_dir() {
        return Err(BackendError::NotADirectory(directory.to_path_buf()));
    }
    let units = work_units(directory)?;
    if units.is_empty() {
        return Err(BackendError::NoWorkUnits(directory.to_path_buf()));
    }

    let mut results = Vec::new();
    for unit in &units {
        let contents = match fs::read_to_string(unit) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(file = %unit.display(), error = %e, "skipping unreadable work unit");
                continue;
            }
        };
        let doc = match Document::parse(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(file = %unit.display(), error = %e, "skipping malformed work unit");
                continue;
            }
        };
        let location = unit
            .strip_prefix(directory)
            .unwrap_or(unit)
            .to_string_lossy()
            .into_owned();
        search_document(&doc, &location, needle, &mut results);
    }

    tracing::debug!(files = units.len(), count = results.len(), "project tree searched");
    Ok(results)
}

fn work_units(directory: &Path) -> Result<Vec<PathBuf>, BackendError> {
    let root = glob::Pattern::escape(&directory.to_string_lossy());
    let pattern = format!("{root}/**/*.wwu");
    let entries = glob::glob(&pattern).map_err(|e| BackendError::Pattern(e.to_string()))?;
    Ok(entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable path");
                None
            }
        })
        .collect())
}

fn search_document(doc: &Document<'_>, location: &str, needle: &Needle, out: &mut Vec<SearchResult>) {
    if needle.wants(IdTypeFilter::Guid) {
        for node in doc.descendants().filter(|n| n.has_attribute("ID")) {
            let id = node.attribute("ID").unwrap_or_default();
            if is_valid_guid(id) && needle.matches(id) {
                out.push(record(node, None, location));
            }
        }
    }

    if needle.wants(IdTypeFilter::ShortId) {
        for node in doc.descendants().filter(|n| n.has_attribute("ShortID")) {
            if needle.matches(node.attribute("ShortID").unwrap_or_default()) {
                out.push(record(node, None, location));
            }
        }
    }

    if needle.wants(IdTypeFilter::MediaId) {
        for node in doc.descendants().filter(|n| n.has_tag_name("MediaID")) {
            let media_id = node.attribute("ID").unwrap_or_default();
            if !needle.matches(media_id) {
                continue;
            }
            // <Sound><MediaList><MediaID/>: the owner is two levels up.
            if let Some(owner) = node.parent_element().and_then(|p| p.parent_element()) {
                out.push(record(owner, Some(media_id), location));
            }
        }
    }
}

fn record(node: Node<'_, '_>, media_id: Option<&str>, location: &str) -> SearchResult {
    SearchResult {
        name: node.attribute("Name").unwrap_or(UNNAMED).to_owned(),
        object_type: node.tag_name().name().to_owned(),
        guid: node
            .attribute("ID")
            .filter(|id| is_valid_guid(id))
            .map(str::to_owned),
        short_id: node.attribute("ShortID").and_then(present),
        media_id: media_id.and_then(present),
        path: Some(location.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR_MIXER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<WwiseDocument Type="WorkUnit" ID="{11111111-2222-3333-4444-555555555555}" SchemaVersion="110">
  <AudioObjects>
    <WorkUnit Name="Default Work Unit" ID="{11111111-2222-3333-4444-555555555555}" PersistMode="Standalone">
      <ChildrenList>
        <Sound Name="Explosion_01" ID="{AAAAAAAA-0000-0000-0000-000000000001}" ShortID="7654321">
          <ActiveSourceList>
            <ActiveSource Name="Explosion_01" ID="{BBBBBBBB-0000-0000-0000-000000000002}" Platform="Linked"/>
          </ActiveSourceList>
          <MediaList>
            <MediaID ID="913245"/>
          </MediaList>
        </Sound>
        <Sound Name="Footstep" ID="not-a-guid" ShortID="1234"/>
      </ChildrenList>
    </WorkUnit>
  </AudioObjects>
</WwiseDocument>
"#;

    const EVENTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<WwiseDocument Type="WorkUnit" ID="{99999999-2222-3333-4444-555555555555}">
  <Events>
    <WorkUnit Name="Default Work Unit" ID="{99999999-2222-3333-4444-555555555555}">
      <ChildrenList>
        <Event Name="Play_Explosion" ID="{CCCCCCCC-0000-0000-0000-000000000003}" ShortID="7654000"/>
      </ChildrenList>
    </WorkUnit>
  </Events>
</WwiseDocument>
"#;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Game.wproj"), "<WwiseDocument/>").expect("wproj");
        let mixer = dir.path().join("Actor-Mixer Hierarchy");
        let events = dir.path().join("Events");
        fs::create_dir_all(&mixer).expect("mkdir");
        fs::create_dir_all(&events).expect("mkdir");
        fs::write(mixer.join("Default Work Unit.wwu"), ACTOR_MIXER).expect("wwu");
        fs::write(events.join("Default Work Unit.wwu"), EVENTS).expect("wwu");
        fs::write(events.join("Broken.wwu"), "<WwiseDocument").expect("wwu");
        dir
    }

    fn needle(id: &str, types: &[&str]) -> Needle {
        let types: Vec<String> = types.iter().map(|t| (*t).to_owned()).collect();
        Needle::new(id, &types)
    }

    #[test]
    fn short_id_exact_hit() {
        let dir = project();
        let results = search(dir.path(), &needle("7654321", &["ShortID"])).expect("search");
        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert_eq!(hit.name, "Explosion_01");
        assert_eq!(hit.object_type, "Sound");
        assert_eq!(hit.guid.as_deref(), Some("{AAAAAAAA-0000-0000-0000-000000000001}"));
        assert!(hit.path.as_deref().is_some_and(|p| p.ends_with(".wwu")));
    }

    #[test]
    fn short_id_substring_spans_work_units() {
        let dir = project();
        let results = search(dir.path(), &needle("7654", &["ShortID"])).expect("search");
        let mut names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Explosion_01", "Play_Explosion"]);
    }

    #[test]
    fn guid_partial_match_is_case_insensitive() {
        let dir = project();
        let results = search(dir.path(), &needle("cccccccc", &["GUID"])).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].object_type, "Event");
    }

    #[test]
    fn invalid_guid_attributes_are_not_reported() {
        let dir = project();
        let results = search(dir.path(), &needle("1234", &["ShortID"])).expect("search");
        let footstep = results.iter().find(|r| r.name == "Footstep").expect("footstep");
        assert!(footstep.guid.is_none());
    }

    #[test]
    fn media_id_reports_owning_sound() {
        let dir = project();
        let results = search(dir.path(), &needle("913245", &["MediaID"])).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Explosion_01");
        assert_eq!(results[0].media_id.as_deref(), Some("913245"));
        assert_eq!(results[0].short_id.as_deref(), Some("7654321"));
    }

    #[test]
    fn non_numeric_query_skips_numeric_kinds() {
        let dir = project();
        let results = search(dir.path(), &needle("76a", &["ShortID", "MediaID"])).expect("search");
        assert!(results.is_empty());
    }

    #[test]
    fn directory_without_work_units_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = search(dir.path(), &needle("1", &["ShortID"])).unwrap_err();
        assert!(matches!(err, BackendError::NoWorkUnits(_)));
    }
}
