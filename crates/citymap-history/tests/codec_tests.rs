//! File persistence and legacy migration

use citymap_graph::Command;
use citymap_history::{codec, load_from_file, save_to_file, CodecError, History, HistoryConfig};
use citymap_test_utils::{document_with_unknown_command, legacy_map_document, sample_commands};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

fn sample_history() -> History {
    let mut history = History::new();
    for command in sample_commands() {
        history.execute(command).unwrap();
    }
    history.undo().unwrap();
    history
}

#[test]
fn save_and_load_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.json");
    let history = sample_history();

    save_to_file(&history, &path, &HistoryConfig::default()).unwrap();
    let mut loaded = History::new();
    load_from_file(&mut loaded, &path).unwrap();

    assert_eq!(loaded.timeline(), history.timeline());
    assert_eq!(loaded.cursor(), 7);
    assert_eq!(loaded.redo_stack(), history.redo_stack());

    loaded.redo().unwrap();
    assert_eq!(loaded.roads_from("C"), vec![("B".to_string(), vec![3])]);
}

#[test]
fn compact_output_when_pretty_is_off() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("map.json");
    let config = HistoryConfig::new().with_pretty_json(false);

    save_to_file(&sample_history(), &path, &config).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["_metadata"]["version"], json!("1.2"));
}

#[test]
fn legacy_scalar_cost_document_loads() {
    let mut history = History::new();
    codec::deserialize(&mut history, legacy_map_document()).unwrap();

    assert_eq!(history.roads_from("A"), vec![("B".to_string(), vec![5])]);
    assert_eq!(history.roads_from("B"), vec![("A".to_string(), vec![5])]);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn unknown_command_records_are_skipped() {
    let mut history = History::new();
    codec::deserialize(&mut history, document_with_unknown_command()).unwrap();

    assert_eq!(history.undo_len(), 1);
    history.undo().unwrap();
    assert!(history.cities().is_empty());
}

#[test]
fn failed_load_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        json!({"history": [{"map_state": {"A": [1]}}], "current_index": 0}).to_string(),
    )
    .unwrap();

    let mut history = sample_history();
    let before = history.clone();
    let err = load_from_file(&mut history, &path).unwrap_err();

    assert!(matches!(err, CodecError::MalformedMapState(_)));
    assert_eq!(history.timeline(), before.timeline());
    assert_eq!(history.cursor(), before.cursor());
    assert_eq!(history.map(), before.map());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let mut history = History::new();
    let err = load_from_file(&mut history, dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, CodecError::Io { .. }));
}

#[test]
fn unsupported_version_is_refused() {
    let mut history = History::new();
    let err = codec::deserialize(
        &mut history,
        json!({"history": [{}], "current_index": 0, "_metadata": {"version": "3.1"}}),
    )
    .unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedVersion(_)));
}

#[test]
fn legacy_removal_record_with_scalar_costs_can_be_undone() {
    let document = json!({
        "history": [{
            "map_state": {"B": {}},
            "undo_stack": [
                {"type": "AddCityCommand", "name": "B"},
                {"type": "RemoveCityCommand", "name": "A", "roads": [["A", "B", 4]]}
            ],
            "redo_stack": []
        }],
        "current_index": 0
    });
    let mut history = History::new();
    codec::deserialize(&mut history, document).unwrap();

    history.undo().unwrap();
    assert_eq!(history.roads_from("A"), vec![("B".to_string(), vec![4])]);

    history.redo().unwrap();
    assert_eq!(history.cities(), vec!["B"]);
    history.execute(Command::add_city("C")).unwrap();
    assert_eq!(history.undo_len(), 3);
}

/// Cursor map lacks the road that the top command claims to have added
fn document_with_unrevertable_top() -> Value {
    json!({
        "history": [{
            "map_state": {"cities": {"A": {}, "B": {}}, "_version": "1.2"},
            "undo_stack": [
                {"type": "AddCityCommand", "name": "A"},
                {"type": "AddCityCommand", "name": "B"},
                {"type": "AddRoadCommand", "city1": "A", "city2": "B", "cost": 5}
            ],
            "redo_stack": []
        }],
        "current_index": 0
    })
}

#[test]
fn dropped_command_stays_dropped_after_round_trip() {
    let mut history = History::new();
    codec::deserialize(&mut history, document_with_unrevertable_top()).unwrap();

    let err = history.undo().unwrap_err();
    assert_eq!(err.dropped_command(), Some(&Command::add_road("A", "B", 5)));
    assert_eq!((history.undo_len(), history.redo_len()), (2, 0));

    let mut reloaded = History::new();
    codec::deserialize(&mut reloaded, codec::to_value(&history).unwrap()).unwrap();
    assert_eq!((reloaded.undo_len(), reloaded.redo_len()), (2, 0));
    assert_eq!(reloaded.undo_stack(), history.undo_stack());

    reloaded.undo().unwrap();
    assert_eq!(reloaded.cities(), vec!["A"]);
}

#[test]
fn null_stacks_load_as_empty() {
    let document = json!({
        "history": [{
            "map_state": {"cities": {"A": {}}, "_version": "1.2"},
            "undo_stack": null,
            "redo_stack": null
        }],
        "current_index": 0
    });
    let mut history = History::new();
    codec::deserialize(&mut history, document).unwrap();

    assert_eq!(history.cities(), vec!["A"]);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}
