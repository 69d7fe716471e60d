//! Persistence codec
//!
//! Converts a [`History`] to and from its JSON document:
//!
//! ```json
//! {
//!   "history": [
//!     { "map_state": {"cities": {"A": {"B": [5]}, "B": {"A": [5]}}, "_version": "1.2"},
//!       "undo_stack": [{"type": "AddCityCommand", "name": "A"}],
//!       "redo_stack": [] }
//!   ],
//!   "current_index": 0,
//!   "_metadata": {"version": "1.2", "created": "2024-05-01T10:00:00Z"}
//! }
//! ```
//!
//! A document without `history` is read as a bare legacy map with empty
//! history. Loading is all-or-nothing: the whole document is decoded before
//! the engine is touched.

mod document;
mod migrate;

pub use document::{Document, MapState, Metadata, SnapshotRecord, FORMAT_VERSION};

use crate::config::HistoryConfig;
use crate::engine::History;
use crate::error::CodecError;
use crate::snapshot::Snapshot;
use document::{RawDocument, RawMetadata, RawSnapshot};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Borrowed document view of the full timeline
#[must_use]
pub fn serialize(history: &History) -> Document<'_> {
    Document::from_history(history)
}

/// Render the document as JSON text
///
/// # Errors
/// Returns error if serialization fails
pub fn to_json_string(history: &History, pretty: bool) -> Result<String, CodecError> {
    let document = serialize(history);
    let text = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(text)
}

/// Render the document as a JSON value
///
/// # Errors
/// Returns error if serialization fails
pub fn to_value(history: &History) -> Result<Value, CodecError> {
    Ok(serde_json::to_value(serialize(history))?)
}

/// Replace the state of `history` with the decoded document
///
/// # Errors
/// Any decoding failure; `history` is left untouched
pub fn deserialize(history: &mut History, document: Value) -> Result<(), CodecError> {
    let (timeline, cursor) = decode_document(document)?;
    info!(
        snapshots = timeline.len(),
        cursor, "loaded history document"
    );
    history.install(timeline, cursor);
    Ok(())
}

/// Parse JSON text and load it into `history`
///
/// # Errors
/// Invalid JSON or any decoding failure; `history` is left untouched
pub fn from_json_str(history: &mut History, text: &str) -> Result<(), CodecError> {
    let document: Value = serde_json::from_str(text)?;
    deserialize(history, document)
}

/// Write the document to `path`
///
/// # Errors
/// Serialization or IO failure
pub fn save_to_file(
    history: &History,
    path: impl AsRef<Path>,
    config: &HistoryConfig,
) -> Result<(), CodecError> {
    let path = path.as_ref();
    let text = to_json_string(history, config.pretty_json)?;
    std::fs::write(path, text).map_err(|e| CodecError::io_error(path, e))?;
    info!(path = %path.display(), snapshots = history.timeline().len(), "saved history");
    Ok(())
}

/// Read the document at `path` into `history`
///
/// # Errors
/// IO failure or any decoding failure; `history` is left untouched
pub fn load_from_file(history: &mut History, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CodecError::io_error(path, e))?;
    from_json_str(history, &text)?;
    info!(path = %path.display(), "loaded history");
    Ok(())
}

fn decode_document(document: Value) -> Result<(Vec<Snapshot>, usize), CodecError> {
    let has_history = document
        .as_object()
        .is_some_and(|object| object.contains_key("history"));
    if !has_history {
        info!("reading legacy map document");
        let map = migrate::decode_map_state(document)?;
        return Ok((vec![Snapshot::new(map, Vec::new(), Vec::new())], 0));
    }

    let raw: RawDocument = serde_json::from_value(document)?;
    check_version(raw.metadata.as_ref())?;

    let len = raw.history.len();
    if raw.current_index >= len {
        return Err(CodecError::MissingSnapshot {
            cursor: raw.current_index,
            len,
        });
    }

    let timeline = raw
        .history
        .into_iter()
        .map(decode_snapshot)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((timeline, raw.current_index))
}

fn decode_snapshot(raw: RawSnapshot) -> Result<Snapshot, CodecError> {
    let map = migrate::decode_map_state(raw.map_state)?;
    let undo_stack = migrate::decode_commands(raw.undo_stack, "undo_stack");
    let redo_stack = migrate::decode_commands(raw.redo_stack, "redo_stack");
    Ok(Snapshot::new(map, undo_stack, redo_stack))
}

/// Any 1.x document is readable; absent metadata means a 1.x writer
fn check_version(metadata: Option<&RawMetadata>) -> Result<(), CodecError> {
    let Some(version) = metadata.and_then(|m| m.version.as_deref()) else {
        return Ok(());
    };
    if version.split('.').next() == Some("1") {
        Ok(())
    } else {
        Err(CodecError::UnsupportedVersion(version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citymap_graph::Command;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> History {
        let mut history = History::new();
        history.execute(Command::add_city("A")).unwrap();
        history.execute(Command::add_city("B")).unwrap();
        history.execute(Command::add_road("A", "B", 5)).unwrap();
        history.undo().unwrap();
        history
    }

    #[test]
    fn document_shape_matches_format() {
        let value = to_value(&sample()).unwrap();

        assert_eq!(value["current_index"], json!(4));
        assert_eq!(value["_metadata"]["version"], json!("1.2"));
        assert_eq!(value["history"].as_array().unwrap().len(), 5);

        let last = &value["history"][4];
        assert_eq!(last["map_state"]["_version"], json!("1.2"));
        assert_eq!(last["map_state"]["cities"], json!({"A": {}, "B": {}}));
        assert_eq!(
            last["redo_stack"],
            json!([{"type": "AddRoadCommand", "city1": "A", "city2": "B", "cost": 5}])
        );
    }

    #[test]
    fn round_trip_keeps_timeline_and_cursor() {
        let original = sample();
        let mut restored = History::new();
        deserialize(&mut restored, to_value(&original).unwrap()).unwrap();

        assert_eq!(restored.timeline(), original.timeline());
        assert_eq!(restored.cursor(), original.cursor());
        assert_eq!(restored.map(), original.map());
        assert_eq!(restored.redo_stack(), original.redo_stack());
    }

    #[test]
    fn cursor_past_end_fails_without_touching_state() {
        let mut history = sample();
        let before = history.clone();
        let err = deserialize(
            &mut history,
            json!({"history": [{"map_state": {}}], "current_index": 3}),
        )
        .unwrap_err();

        assert!(matches!(err, CodecError::MissingSnapshot { cursor: 3, len: 1 }));
        assert_eq!(history.timeline(), before.timeline());
        assert_eq!(history.cursor(), before.cursor());
    }

    #[test]
    fn empty_history_fails() {
        let mut history = History::new();
        let err = deserialize(&mut history, json!({"history": []})).unwrap_err();
        assert!(matches!(err, CodecError::MissingSnapshot { cursor: 0, len: 0 }));
    }

    #[test]
    fn newer_major_version_is_refused() {
        let mut history = History::new();
        let err = deserialize(
            &mut history,
            json!({"history": [{}], "_metadata": {"version": "2.0"}}),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn legacy_document_has_empty_history() {
        let mut history = sample();
        deserialize(&mut history, json!({"A": {"B": 5}})).unwrap();

        assert_eq!(history.roads_from("A"), vec![("B".to_string(), vec![5])]);
        assert_eq!(history.timeline().len(), 1);
        assert_eq!((history.undo_len(), history.redo_len()), (0, 0));
    }

    #[test]
    fn garbage_text_is_a_json_error() {
        let mut history = History::new();
        let err = from_json_str(&mut history, "{not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
