//! Reversible structural commands
//!
//! [`Command`] is a closed set of edits, one variant per structural
//! operation on [`CityMap`]. A command captures whatever it needs at execute
//! time so that [`Command::undo`] restores the previous map exactly, including
//! the slot of each touched road instance.
//!
//! The serde representation is the persisted command record: an internally
//! tagged object whose `type` is the record tag (`AddCityCommand`, ...).

use crate::error::GraphError;
use crate::store::{CityMap, Cost};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every record tag a command can be persisted under
pub const COMMAND_TAGS: [&str; 6] = [
    "AddCityCommand",
    "RemoveCityCommand",
    "RenameCityCommand",
    "AddRoadCommand",
    "RemoveRoadCommand",
    "UpdateRoadCommand",
];

/// Road captured by a city removal, persisted as `[city, neighbor, [cost, ...]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, Vec<Cost>)",
    into = "(String, String, Vec<Cost>)"
)]
pub struct CapturedRoad {
    pub city: String,
    pub neighbor: String,
    pub costs: Vec<Cost>,
}

impl From<(String, String, Vec<Cost>)> for CapturedRoad {
    fn from((city, neighbor, costs): (String, String, Vec<Cost>)) -> Self {
        Self {
            city,
            neighbor,
            costs,
        }
    }
}

impl From<CapturedRoad> for (String, String, Vec<Cost>) {
    fn from(road: CapturedRoad) -> Self {
        (road.city, road.neighbor, road.costs)
    }
}

impl CapturedRoad {
    /// The endpoint that is not `removed`
    fn other_end<'a>(&'a self, removed: &str) -> &'a str {
        if self.city == removed {
            &self.neighbor
        } else {
            &self.city
        }
    }
}

/// One reversible edit of a [`CityMap`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "AddCityCommand")]
    AddCity { name: String },

    #[serde(rename = "RemoveCityCommand")]
    RemoveCity {
        name: String,
        /// Incident roads at the time of removal
        #[serde(default)]
        roads: Vec<CapturedRoad>,
        /// Listing position at the time of removal
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        /// Position of the removed city among each neighbor's roads,
        /// parallel to `roads`
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        neighbor_positions: Vec<usize>,
    },

    #[serde(rename = "RenameCityCommand")]
    RenameCity { old_name: String, new_name: String },

    #[serde(rename = "AddRoadCommand")]
    AddRoad {
        city1: String,
        city2: String,
        cost: Cost,
    },

    #[serde(rename = "RemoveRoadCommand")]
    RemoveRoad {
        city1: String,
        city2: String,
        cost: Cost,
        /// Slot the instance was removed from
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slot: Option<usize>,
        /// Positions of the pair in both cities when its last instance went
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pair_positions: Option<(usize, usize)>,
    },

    #[serde(rename = "UpdateRoadCommand")]
    UpdateRoad {
        city1: String,
        city2: String,
        old_cost: Cost,
        new_cost: Cost,
        /// Slot the cost was replaced at
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slot: Option<usize>,
    },
}

impl Command {
    #[must_use]
    pub fn add_city(name: impl Into<String>) -> Self {
        Self::AddCity { name: name.into() }
    }

    #[must_use]
    pub fn remove_city(name: impl Into<String>) -> Self {
        Self::RemoveCity {
            name: name.into(),
            roads: Vec::new(),
            position: None,
            neighbor_positions: Vec::new(),
        }
    }

    /// Rename command; renaming a city to its own name is refused up front
    ///
    /// # Errors
    /// `DuplicateCity` when both names are equal
    pub fn rename_city(
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Result<Self, GraphError> {
        let (old_name, new_name) = (old_name.into(), new_name.into());
        if old_name == new_name {
            return Err(GraphError::DuplicateCity(new_name));
        }
        Ok(Self::RenameCity { old_name, new_name })
    }

    #[must_use]
    pub fn add_road(city1: impl Into<String>, city2: impl Into<String>, cost: Cost) -> Self {
        Self::AddRoad {
            city1: city1.into(),
            city2: city2.into(),
            cost,
        }
    }

    #[must_use]
    pub fn remove_road(city1: impl Into<String>, city2: impl Into<String>, cost: Cost) -> Self {
        Self::RemoveRoad {
            city1: city1.into(),
            city2: city2.into(),
            cost,
            slot: None,
            pair_positions: None,
        }
    }

    #[must_use]
    pub fn update_road(
        city1: impl Into<String>,
        city2: impl Into<String>,
        old_cost: Cost,
        new_cost: Cost,
    ) -> Self {
        Self::UpdateRoad {
            city1: city1.into(),
            city2: city2.into(),
            old_cost,
            new_cost,
            slot: None,
        }
    }

    /// Persisted record tag
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AddCity { .. } => COMMAND_TAGS[0],
            Self::RemoveCity { .. } => COMMAND_TAGS[1],
            Self::RenameCity { .. } => COMMAND_TAGS[2],
            Self::AddRoad { .. } => COMMAND_TAGS[3],
            Self::RemoveRoad { .. } => COMMAND_TAGS[4],
            Self::UpdateRoad { .. } => COMMAND_TAGS[5],
        }
    }

    /// Apply the edit, capturing what undo needs
    ///
    /// On error the map is unchanged and nothing is captured.
    ///
    /// # Errors
    /// Whatever constraint the underlying [`CityMap`] operation reports
    pub fn execute(&mut self, map: &mut CityMap) -> Result<(), GraphError> {
        match self {
            Self::AddCity { name } => map.add_city(name),
            Self::RemoveCity {
                name,
                roads,
                position,
                neighbor_positions,
            } => {
                let at = map
                    .city_position(name)
                    .ok_or_else(|| GraphError::CityNotFound(name.clone()))?;
                let (captured, positions): (Vec<_>, Vec<_>) = map
                    .roads_from(name)
                    .into_iter()
                    .map(|(neighbor, costs)| {
                        let back = map
                            .neighbor_position(&neighbor, name.as_str())
                            .unwrap_or(usize::MAX);
                        let road = CapturedRoad {
                            city: name.clone(),
                            neighbor,
                            costs,
                        };
                        (road, back)
                    })
                    .unzip();
                map.remove_city(name)?;
                *roads = captured;
                *position = Some(at);
                *neighbor_positions = positions;
                Ok(())
            }
            Self::RenameCity { old_name, new_name } => map.rename_city(old_name, new_name),
            Self::AddRoad { city1, city2, cost } => map.add_road(city1, city2, *cost).map(|_| ()),
            Self::RemoveRoad {
                city1,
                city2,
                cost,
                slot,
                pair_positions,
            } => {
                let Some(costs) = map.costs(city1, city2) else {
                    // Let the store report the precise failure
                    return map.remove_road(city1, city2, Some(*cost));
                };
                let last_instance = costs.len() == 1;
                let at = map
                    .cost_slot(city1, city2, *cost)
                    .ok_or_else(|| GraphError::cost_not_found(city1, city2, *cost))?;
                let positions = map
                    .neighbor_position(city1, city2)
                    .zip(map.neighbor_position(city2, city1))
                    .filter(|_| last_instance);

                map.remove_road_at(city1, city2, at)?;
                *slot = Some(at);
                *pair_positions = positions;
                Ok(())
            }
            Self::UpdateRoad {
                city1,
                city2,
                old_cost,
                new_cost,
                slot,
            } => {
                let at = map.update_road_cost(city1, city2, *old_cost, *new_cost)?;
                *slot = Some(at);
                Ok(())
            }
        }
    }

    /// Revert a previously executed edit
    ///
    /// Inverses are checked before anything is written, so a failing undo
    /// leaves the map unchanged.
    ///
    /// # Errors
    /// The constraint that makes the inverse impossible
    pub fn undo(&self, map: &mut CityMap) -> Result<(), GraphError> {
        match self {
            Self::AddCity { name } => map.remove_city(name),
            Self::RemoveCity {
                name,
                roads,
                position,
                neighbor_positions,
            } => {
                if map.contains_city(name) {
                    return Err(GraphError::DuplicateCity(name.clone()));
                }
                for road in roads {
                    let other = road.other_end(name);
                    if other == name {
                        return Err(GraphError::SelfLoop(name.clone()));
                    }
                    if !map.contains_city(other) {
                        return Err(GraphError::CityNotFound(other.to_string()));
                    }
                }

                map.insert_city_at(name, position.unwrap_or(usize::MAX))?;
                for (i, road) in roads.iter().enumerate() {
                    let back = neighbor_positions.get(i).copied().unwrap_or(usize::MAX);
                    let neighbor = road.other_end(name);
                    map.insert_pair_at(name, neighbor, &road.costs, (usize::MAX, back))?;
                }
                Ok(())
            }
            Self::RenameCity { old_name, new_name } => map.rename_city(new_name, old_name),
            Self::AddRoad { city1, city2, cost } => {
                let at = map
                    .last_cost_slot(city1, city2, *cost)
                    .ok_or_else(|| GraphError::cost_not_found(city1, city2, *cost))?;
                map.remove_road_at(city1, city2, at).map(|_| ())
            }
            Self::RemoveRoad {
                city1,
                city2,
                cost,
                slot,
                pair_positions,
            } => match pair_positions {
                Some(positions) if map.costs(city1, city2).is_none() => {
                    map.insert_pair_at(city1, city2, &[*cost], *positions)
                }
                _ => map
                    .insert_road_at(city1, city2, slot.unwrap_or(usize::MAX), *cost)
                    .map(|_| ()),
            },
            Self::UpdateRoad {
                city1,
                city2,
                old_cost,
                new_cost,
                slot,
            } => {
                let captured = slot.filter(|&at| {
                    map.costs(city1, city2)
                        .and_then(|costs| costs.get(at))
                        .is_some_and(|&c| c == *new_cost)
                });
                match captured {
                    Some(at) => map.set_road_cost_at(city1, city2, at, *old_cost).map(|_| ()),
                    None => map
                        .update_road_cost(city1, city2, *new_cost, *old_cost)
                        .map(|_| ()),
                }
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddCity { name } => write!(f, "add city '{name}'"),
            Self::RemoveCity { name, .. } => write!(f, "remove city '{name}'"),
            Self::RenameCity { old_name, new_name } => {
                write!(f, "rename city '{old_name}' to '{new_name}'")
            }
            Self::AddRoad { city1, city2, cost } => {
                write!(f, "add road '{city1}' - '{city2}' ({cost})")
            }
            Self::RemoveRoad {
                city1, city2, cost, ..
            } => write!(f, "remove road '{city1}' - '{city2}' ({cost})"),
            Self::UpdateRoad {
                city1,
                city2,
                old_cost,
                new_cost,
                ..
            } => write!(f, "update road '{city1}' - '{city2}' ({old_cost} -> {new_cost})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn star() -> CityMap {
        let mut map = CityMap::new();
        for city in ["X", "Y", "Z"] {
            map.add_city(city).unwrap();
        }
        map.add_road("X", "Y", 5).unwrap();
        map.add_road("X", "Z", 3).unwrap();
        map
    }

    fn round_trip(mut command: Command, mut map: CityMap) {
        let before = map.clone();
        command.execute(&mut map).unwrap();
        let after = map.clone();
        assert!(map.is_symmetric());

        command.undo(&mut map).unwrap();
        assert_eq!(map, before, "undo of {command}");
        assert!(map.same_layout(&before), "undo of {command} reordered {map:?}");

        command.execute(&mut map).unwrap();
        assert_eq!(map, after, "redo of {command}");
        assert!(map.same_layout(&after), "redo of {command} reordered {map:?}");
    }

    #[test]
    fn remove_city_undo_restores_roads_in_order() {
        let mut map = star();
        let mut command = Command::remove_city("X");
        command.execute(&mut map).unwrap();
        assert!(!map.contains_city("X"));

        command.undo(&mut map).unwrap();
        assert_eq!(
            map.roads_from("X"),
            vec![("Y".to_string(), vec![5]), ("Z".to_string(), vec![3])]
        );
        assert_eq!(map.cities(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn every_variant_is_an_exact_inverse() {
        let mut dup = star();
        dup.add_road("X", "Y", 7).unwrap();
        dup.add_road("X", "Y", 5).unwrap();

        round_trip(Command::add_city("W"), star());
        round_trip(Command::remove_city("Y"), star());
        round_trip(Command::rename_city("X", "Q").unwrap(), star());
        round_trip(Command::add_road("Y", "X", 5), dup.clone());
        round_trip(Command::remove_road("X", "Y", 5), dup.clone());
        round_trip(Command::update_road("X", "Y", 5, 7), dup);
    }

    #[test]
    fn remove_city_undo_keeps_neighbor_order() {
        let mut map = CityMap::new();
        for city in ["A", "B", "C"] {
            map.add_city(city).unwrap();
        }
        map.add_road("A", "B", 1).unwrap();
        map.add_road("A", "C", 2).unwrap();
        let before = map.clone();

        let mut command = Command::remove_city("B");
        command.execute(&mut map).unwrap();
        command.undo(&mut map).unwrap();

        assert_eq!(
            map.roads_from("A"),
            vec![("B".to_string(), vec![1]), ("C".to_string(), vec![2])]
        );
        assert_eq!(map.all_roads(), before.all_roads());
        assert!(map.same_layout(&before));
    }

    #[test]
    fn removing_last_road_instance_undoes_in_place() {
        let mut map = star();
        let before = map.clone();

        let mut command = Command::remove_road("Y", "X", 5);
        command.execute(&mut map).unwrap();
        assert!(map.costs("X", "Y").is_none());

        command.undo(&mut map).unwrap();
        assert_eq!(
            map.roads_from("X"),
            vec![("Y".to_string(), vec![5]), ("Z".to_string(), vec![3])]
        );
        assert!(map.same_layout(&before));
    }

    #[test]
    fn legacy_removal_without_positions_appends() {
        let mut map = star();
        let mut command = Command::remove_city("X");
        command.execute(&mut map).unwrap();
        let Command::RemoveCity { name, roads, .. } = command else {
            unreachable!()
        };
        let legacy = Command::RemoveCity {
            name,
            roads,
            position: None,
            neighbor_positions: Vec::new(),
        };

        legacy.undo(&mut map).unwrap();
        assert_eq!(map.cities(), vec!["Y", "Z", "X"]);
        assert_eq!(map, star());
    }

    #[test]
    fn failed_execute_captures_nothing() {
        let mut map = star();
        let mut command = Command::remove_road("X", "Y", 42);
        assert!(command.execute(&mut map).is_err());
        assert_eq!(command, Command::remove_road("X", "Y", 42));
        assert_eq!(map, star());
    }

    #[test]
    fn rename_to_same_name_is_refused() {
        assert_eq!(
            Command::rename_city("X", "X"),
            Err(GraphError::DuplicateCity("X".into()))
        );
    }

    #[test]
    fn remove_city_undo_fails_cleanly_when_neighbor_is_gone() {
        let mut map = star();
        let mut command = Command::remove_city("X");
        command.execute(&mut map).unwrap();
        map.remove_city("Z").unwrap();
        let before = map.clone();

        assert_eq!(
            command.undo(&mut map),
            Err(GraphError::CityNotFound("Z".into()))
        );
        assert_eq!(map, before);
    }

    #[test]
    fn records_use_legacy_field_names() {
        let mut map = star();
        let mut command = Command::remove_city("X");
        command.execute(&mut map).unwrap();

        let record = serde_json::to_value(&command).unwrap();
        assert_eq!(
            record,
            json!({
                "type": "RemoveCityCommand",
                "name": "X",
                "roads": [["X", "Y", [5]], ["X", "Z", [3]]],
                "position": 0,
                "neighbor_positions": [0, 0]
            })
        );

        let parsed: Command = serde_json::from_value(json!({
            "type": "UpdateRoadCommand",
            "city1": "X",
            "city2": "Y",
            "old_cost": 5,
            "new_cost": 9
        }))
        .unwrap();
        assert_eq!(parsed, Command::update_road("X", "Y", 5, 9));
        assert_eq!(parsed.tag(), "UpdateRoadCommand");
    }
}
