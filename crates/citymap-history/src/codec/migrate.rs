//! Decoding and migration of persisted content
//!
//! Older map states are flat `{city: {neighbor: cost}}` objects without a
//! `_version` marker, where a cost may be a bare integer. Everything is
//! normalized to cost lists and rebuilt through
//! [`CityMap::from_adjacency`] so the symmetry invariant holds after load.

use super::document::FORMAT_VERSION;
use crate::error::CodecError;
use citymap_graph::{Adjacency, CityMap, Command, Cost, Neighbors, COMMAND_TAGS};
use serde_json::Value;
use tracing::warn;

const VERSION_KEY: &str = "_version";

/// Decode one `map_state` value, current or legacy
pub(crate) fn decode_map_state(value: Value) -> Result<CityMap, CodecError> {
    let value = match value {
        // Some writers stored the map state double-encoded
        Value::String(text) => serde_json::from_str(&text)?,
        other => other,
    };
    let Value::Object(mut object) = value else {
        return Err(CodecError::malformed("map state is not an object"));
    };

    let cities = if object.get(VERSION_KEY).and_then(Value::as_str) == Some(FORMAT_VERSION) {
        object
            .remove("cities")
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    } else {
        object.remove(VERSION_KEY);
        Value::Object(object)
    };

    let (map, repairs) = CityMap::from_adjacency(decode_adjacency(cities)?);
    for repair in repairs {
        warn!(%repair, "repaired map state");
    }
    Ok(map)
}

fn decode_adjacency(value: Value) -> Result<Adjacency, CodecError> {
    let Value::Object(cities) = value else {
        return Err(CodecError::malformed("cities is not an object"));
    };

    let mut adjacency = Adjacency::with_capacity(cities.len());
    for (city, neighbors) in cities {
        let Value::Object(neighbors) = neighbors else {
            return Err(CodecError::malformed(format!(
                "city '{city}' does not map to an object of neighbors"
            )));
        };

        let mut decoded = Neighbors::with_capacity(neighbors.len());
        for (neighbor, costs) in neighbors {
            let costs = decode_costs(&city, &neighbor, costs);
            decoded.insert(neighbor, costs);
        }
        adjacency.insert(city, decoded);
    }
    Ok(adjacency)
}

/// Accept a bare cost or a list of costs; non-integers are skipped
fn decode_costs(city: &str, neighbor: &str, value: Value) -> Vec<Cost> {
    let items = match value {
        Value::Array(items) => items,
        scalar => vec![scalar],
    };
    items
        .into_iter()
        .filter_map(|item| {
            let cost = item.as_i64();
            if cost.is_none() {
                warn!(city, neighbor, value = %item, "skipping non-integer cost");
            }
            cost
        })
        .collect()
}

/// Decode a command stack, skipping records that cannot be read
pub(crate) fn decode_commands(records: Vec<Value>, stack: &'static str) -> Vec<Command> {
    records
        .into_iter()
        .filter_map(|mut record| {
            let tag = record.get("type").and_then(Value::as_str).map(str::to_string);
            match tag.as_deref() {
                Some(tag) if COMMAND_TAGS.contains(&tag) => {}
                other => {
                    warn!(stack, tag = ?other, "skipping command record with unknown type");
                    return None;
                }
            }

            normalize_captured_roads(&mut record);
            match serde_json::from_value::<Command>(record) {
                Ok(command) => Some(command),
                Err(e) => {
                    warn!(stack, error = %e, "skipping unreadable command record");
                    None
                }
            }
        })
        .collect()
}

/// Legacy removal records may store a bare cost in `roads[i][2]`
fn normalize_captured_roads(record: &mut Value) {
    let Some(Value::Array(roads)) = record.get_mut("roads") else {
        return;
    };
    for road in roads {
        if let Some(costs) = road.get_mut(2) {
            if !costs.is_array() {
                *costs = Value::Array(vec![costs.take()]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalar_costs_become_lists() {
        let map = decode_map_state(json!({"A": {"B": 5}})).unwrap();
        assert_eq!(map.roads_from("A"), vec![("B".to_string(), vec![5])]);
        assert_eq!(map.costs("B", "A"), Some(&[5][..]));
    }

    #[test]
    fn versioned_state_reads_cities_key() {
        let map = decode_map_state(json!({
            "cities": {"A": {"B": [1, 2]}, "B": {"A": [1, 2]}},
            "_version": "1.2"
        }))
        .unwrap();
        assert_eq!(map.cities(), vec!["A", "B"]);
        assert_eq!(map.costs("A", "B"), Some(&[1, 2][..]));
    }

    #[test]
    fn unknown_version_is_read_as_flat_map() {
        let map = decode_map_state(json!({"_version": "1.0", "A": {}, "B": {}})).unwrap();
        assert_eq!(map.cities(), vec!["A", "B"]);
    }

    #[test]
    fn double_encoded_state_is_accepted() {
        let text = json!({"cities": {"A": {}}, "_version": "1.2"}).to_string();
        let map = decode_map_state(Value::String(text)).unwrap();
        assert_eq!(map.cities(), vec!["A"]);
    }

    #[test]
    fn non_object_neighbors_fail() {
        let err = decode_map_state(json!({"A": [1, 2]})).unwrap_err();
        assert!(matches!(err, CodecError::MalformedMapState(_)));

        let err = decode_map_state(json!(42)).unwrap_err();
        assert!(matches!(err, CodecError::MalformedMapState(_)));
    }

    #[test]
    fn non_integer_costs_are_skipped() {
        let map = decode_map_state(json!({"A": {"B": [3, "x"]}, "B": {"A": [3]}})).unwrap();
        assert_eq!(map.costs("A", "B"), Some(&[3][..]));
    }

    #[test]
    fn unknown_and_broken_records_are_skipped() {
        let commands = decode_commands(
            vec![
                json!({"type": "AddCityCommand", "name": "A"}),
                json!({"type": "TeleportCommand", "to": "Mars"}),
                json!({"type": "AddRoadCommand", "city1": "A"}),
                json!({"name": "untyped"}),
                json!({"type": "RemoveCityCommand", "name": "B", "roads": [["B", "A", 4]]}),
            ],
            "undo_stack",
        );

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], Command::add_city("A"));
        let Command::RemoveCity { roads, .. } = &commands[1] else {
            panic!("expected removal, got {:?}", commands[1]);
        };
        assert_eq!(roads[0].costs, vec![4]);
    }
}
