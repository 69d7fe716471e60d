//! Testing utilities for the CityMap workspace
//!
//! Shared fixtures and proptest strategies.

#![allow(missing_docs)]

use citymap_graph::{CityMap, Command, Cost};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Small name pool so generated commands collide often
const CITY_NAMES: [&str; 4] = ["A", "B", "C", "D"];

/// Cities and per-city neighbor lists in stored order
pub type Layout = Vec<(String, Vec<(String, Vec<Cost>)>)>;

/// Cities `A`, `B`, `C` with roads A-B {5, 7} and B-C {3}
pub fn sample_map() -> CityMap {
    let mut map = CityMap::new();
    apply_all(&mut map, sample_commands());
    map
}

/// Commands that build [`sample_map`] from an empty map
pub fn sample_commands() -> Vec<Command> {
    vec![
        Command::add_city("A"),
        Command::add_city("B"),
        Command::add_city("C"),
        Command::add_road("A", "B", 5),
        Command::add_road("A", "B", 7),
        Command::add_road("B", "C", 3),
    ]
}

/// Execute every command, panicking on the first rejection
pub fn apply_all(map: &mut CityMap, commands: impl IntoIterator<Item = Command>) -> Vec<Command> {
    commands
        .into_iter()
        .map(|command| apply(map, command))
        .collect()
}

fn apply(map: &mut CityMap, mut command: Command) -> Command {
    if let Err(e) = command.execute(map) {
        panic!("fixture command {command} rejected: {e}");
    }
    command
}

/// Order-sensitive view of a map
///
/// `CityMap` equality ignores insertion order; compare layouts when an
/// operation has to put cities and neighbors back where they were.
pub fn layout(map: &CityMap) -> Layout {
    map.cities()
        .into_iter()
        .map(|city| {
            let roads = map.roads_from(&city);
            (city, roads)
        })
        .collect()
}

/// Pre-versioning dump: flat adjacency with scalar costs, one direction only
pub fn legacy_map_document() -> Value {
    json!({"A": {"B": 5}, "B": {}})
}

/// Versioned document whose history holds an unknown command type
pub fn document_with_unknown_command() -> Value {
    json!({
        "history": [{
            "map_state": {"cities": {"A": {}}, "_version": "1.2"},
            "undo_stack": [
                {"type": "AddCityCommand", "name": "A"},
                {"type": "TeleportCommand", "to": "Mars"}
            ],
            "redo_stack": []
        }],
        "current_index": 0,
        "_metadata": {"version": "1.2", "created": "2024-01-01T00:00:00Z"}
    })
}

/// Engine-level step for history property tests
#[derive(Debug, Clone)]
pub enum Operation {
    Execute(Command),
    Undo,
    Redo,
    Seek(usize),
}

fn arb_city() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CITY_NAMES.to_vec())
}

pub fn arb_cost() -> impl Strategy<Value = Cost> {
    0i64..4
}

/// Any command over [`CITY_NAMES`], valid or not
pub fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => arb_city().prop_map(Command::add_city),
        1 => arb_city().prop_map(Command::remove_city),
        1 => (arb_city(), arb_city())
            .prop_filter_map("same name", |(a, b)| Command::rename_city(a, b).ok()),
        4 => (arb_city(), arb_city(), arb_cost())
            .prop_map(|(a, b, c)| Command::add_road(a, b, c)),
        2 => (arb_city(), arb_city(), arb_cost())
            .prop_map(|(a, b, c)| Command::remove_road(a, b, c)),
        2 => (arb_city(), arb_city(), arb_cost(), arb_cost())
            .prop_map(|(a, b, old, new)| Command::update_road(a, b, old, new)),
    ]
}

/// Mixed execute/undo/redo/seek sequence step
pub fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        6 => arb_command().prop_map(Operation::Execute),
        2 => Just(Operation::Undo),
        1 => Just(Operation::Redo),
        1 => (0usize..8).prop_map(Operation::Seek),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_map_shape() {
        let map = sample_map();
        assert_eq!(map.cities(), vec!["A", "B", "C"]);
        assert_eq!(map.costs("B", "A"), Some(&[5, 7][..]));
        assert_eq!(map.road_count(), 3);
    }

    #[test]
    fn layout_follows_neighbor_order() {
        let mut map = sample_map();
        let original = layout(&map);
        assert_eq!(original[1].1[0].0, "A");
        assert_eq!(original[1].1[1].0, "C");

        map.remove_road("A", "B", None).unwrap();
        map.add_road("A", "B", 5).unwrap();
        map.add_road("A", "B", 7).unwrap();
        assert_eq!(map, sample_map());
        assert_ne!(layout(&map), original);
    }
}
