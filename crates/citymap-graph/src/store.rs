//! Road multigraph store
//!
//! [`CityMap`] keeps an ordered adjacency map `city -> neighbor -> [cost, ...]`.
//! Each road instance is stored twice, once per direction, and the two cost
//! lists of a pair always hold the same values at the same positions.
//!
//! The store has no notion of history. Commands in [`crate::command`] are
//! built on the slot-level operations exposed here.

use crate::error::GraphError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Cost of a single road instance
pub type Cost = i64;

/// Roads leaving one city, keyed by neighbor
pub type Neighbors = IndexMap<String, Vec<Cost>>;

/// Full adjacency structure, keyed by city
pub type Adjacency = IndexMap<String, Neighbors>;

/// One undirected city pair with every road instance between them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub city1: String,
    pub city2: String,
    pub costs: Vec<Cost>,
}

/// A fix applied while rebuilding a map from untrusted adjacency data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymmetryRepair {
    /// A city listed itself as its own neighbor
    DroppedSelfLoop(String),
    /// A neighbor entry carried no costs at all
    DroppedEmptyRoad { city: String, neighbor: String },
    /// A neighbor was referenced but never declared as a city
    CreatedCity(String),
    /// The reverse direction was missing or disagreed and was overwritten
    MirroredRoad { from: String, to: String },
}

impl fmt::Display for SymmetryRepair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedSelfLoop(city) => write!(f, "dropped self-loop on '{city}'"),
            Self::DroppedEmptyRoad { city, neighbor } => {
                write!(f, "dropped empty road '{city}' -> '{neighbor}'")
            }
            Self::CreatedCity(city) => write!(f, "created undeclared city '{city}'"),
            Self::MirroredRoad { from, to } => {
                write!(f, "mirrored costs of '{from}' -> '{to}' onto the reverse direction")
            }
        }
    }
}

/// City map with parallel weighted roads
///
/// # Invariants
/// - For every pair `(a, b)`, `costs(a, b) == costs(b, a)`, position by position
/// - No city is its own neighbor
/// - No pair entry has an empty cost list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CityMap {
    cities: Adjacency,
}

impl CityMap {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a map from raw adjacency data, restoring the invariants
    ///
    /// Declared city order and per-city neighbor order are kept. For each
    /// pair the first direction encountered wins.
    #[must_use]
    pub fn from_adjacency(adjacency: Adjacency) -> (Self, Vec<SymmetryRepair>) {
        let mut repairs = Vec::new();
        let mut cities = Adjacency::with_capacity(adjacency.len());

        for (city, neighbors) in adjacency {
            let mut kept = Neighbors::with_capacity(neighbors.len());
            for (neighbor, costs) in neighbors {
                if neighbor == city {
                    repairs.push(SymmetryRepair::DroppedSelfLoop(city.clone()));
                } else if costs.is_empty() {
                    repairs.push(SymmetryRepair::DroppedEmptyRoad {
                        city: city.clone(),
                        neighbor,
                    });
                } else {
                    kept.insert(neighbor, costs);
                }
            }
            cities.insert(city, kept);
        }

        let directed: Vec<(String, String, Vec<Cost>)> = cities
            .iter()
            .flat_map(|(city, neighbors)| {
                neighbors
                    .iter()
                    .map(move |(neighbor, costs)| (city.clone(), neighbor.clone(), costs.clone()))
            })
            .collect();

        let mut settled: HashSet<(String, String)> = HashSet::new();
        for (city, neighbor, costs) in directed {
            if settled.contains(&(neighbor.clone(), city.clone())) {
                continue;
            }
            settled.insert((city.clone(), neighbor.clone()));

            if !cities.contains_key(&neighbor) {
                repairs.push(SymmetryRepair::CreatedCity(neighbor.clone()));
            }
            let reverse = cities.entry(neighbor.clone()).or_default();
            if reverse.get(&city) != Some(&costs) {
                reverse.insert(city.clone(), costs);
                repairs.push(SymmetryRepair::MirroredRoad {
                    from: city,
                    to: neighbor,
                });
            }
        }

        (Self { cities }, repairs)
    }

    /// Raw adjacency, in insertion order
    #[inline]
    #[must_use]
    pub fn adjacency(&self) -> &Adjacency {
        &self.cities
    }

    #[inline]
    #[must_use]
    pub fn contains_city(&self, name: &str) -> bool {
        self.cities.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Number of road instances, counting each undirected instance once
    #[must_use]
    pub fn road_count(&self) -> usize {
        self.all_roads().iter().map(|r| r.costs.len()).sum()
    }

    /// Position of a city in the listing order
    #[inline]
    #[must_use]
    pub fn city_position(&self, name: &str) -> Option<usize> {
        self.cities.get_index_of(name)
    }

    /// Add a city with no roads
    ///
    /// # Errors
    /// `EmptyName` or `DuplicateCity`
    pub fn add_city(&mut self, name: &str) -> Result<(), GraphError> {
        self.insert_city_at(name, self.cities.len()).map(|_| ())
    }

    /// Add a city with no roads at a given listing position
    ///
    /// Positions past the end append. Returns the position actually used.
    ///
    /// # Errors
    /// `EmptyName` or `DuplicateCity`
    pub fn insert_city_at(&mut self, name: &str, position: usize) -> Result<usize, GraphError> {
        validate_name(name)?;
        if self.cities.contains_key(name) {
            return Err(GraphError::DuplicateCity(name.to_string()));
        }
        let position = position.min(self.cities.len());
        self.cities
            .shift_insert(position, name.to_string(), Neighbors::new());
        Ok(position)
    }

    /// Remove a city and every road touching it
    ///
    /// # Errors
    /// `CityNotFound`
    pub fn remove_city(&mut self, name: &str) -> Result<(), GraphError> {
        if self.cities.shift_remove(name).is_none() {
            return Err(GraphError::CityNotFound(name.to_string()));
        }
        for neighbors in self.cities.values_mut() {
            neighbors.shift_remove(name);
        }
        Ok(())
    }

    /// Rename a city, rewriting every neighbor reference
    ///
    /// The city keeps its listing position, and so does every reference to it.
    ///
    /// # Errors
    /// `CityNotFound` for `old`, `DuplicateCity` or `EmptyName` for `new`
    pub fn rename_city(&mut self, old: &str, new: &str) -> Result<(), GraphError> {
        if !self.cities.contains_key(old) {
            return Err(GraphError::CityNotFound(old.to_string()));
        }
        validate_name(new)?;
        if self.cities.contains_key(new) {
            return Err(GraphError::DuplicateCity(new.to_string()));
        }

        rekey(&mut self.cities, old, new);
        for neighbors in self.cities.values_mut() {
            rekey(neighbors, old, new);
        }
        Ok(())
    }

    /// Append a road instance between two cities
    ///
    /// Returns the slot of the new instance in the pair's cost list.
    ///
    /// # Errors
    /// `CityNotFound` or `SelfLoop`
    pub fn add_road(&mut self, city1: &str, city2: &str, cost: Cost) -> Result<usize, GraphError> {
        self.check_endpoints(city1, city2)?;

        let forward = self
            .neighbors_mut(city1)?
            .entry(city2.to_string())
            .or_default();
        forward.push(cost);
        let slot = forward.len() - 1;

        self.neighbors_mut(city2)?
            .entry(city1.to_string())
            .or_default()
            .push(cost);
        Ok(slot)
    }

    /// Insert a road instance at a given slot of the pair's cost list
    ///
    /// Slots past the end append. Returns the slot actually used.
    ///
    /// # Errors
    /// `CityNotFound` or `SelfLoop`
    pub fn insert_road_at(
        &mut self,
        city1: &str,
        city2: &str,
        slot: usize,
        cost: Cost,
    ) -> Result<usize, GraphError> {
        self.check_endpoints(city1, city2)?;
        let slot = slot.min(self.pair_len(city1, city2).unwrap_or(0));

        for (from, to) in [(city1, city2), (city2, city1)] {
            self.neighbors_mut(from)?
                .entry(to.to_string())
                .or_default()
                .insert(slot, cost);
        }
        Ok(slot)
    }

    /// Join two cities with a whole cost list, each at a given position
    ///
    /// `positions.0` places `city2` among the roads of `city1` and
    /// `positions.1` places `city1` among the roads of `city2`; positions past
    /// the end append. An existing pair is extended in place instead.
    ///
    /// # Errors
    /// `CityNotFound` or `SelfLoop`
    pub fn insert_pair_at(
        &mut self,
        city1: &str,
        city2: &str,
        costs: &[Cost],
        positions: (usize, usize),
    ) -> Result<(), GraphError> {
        self.check_endpoints(city1, city2)?;
        if costs.is_empty() {
            return Ok(());
        }

        if self.costs(city1, city2).is_some() {
            for (from, to) in [(city1, city2), (city2, city1)] {
                if let Some(existing) = self.costs_mut(from, to) {
                    existing.extend_from_slice(costs);
                }
            }
            return Ok(());
        }

        for (from, to, at) in [(city1, city2, positions.0), (city2, city1, positions.1)] {
            let neighbors = self.neighbors_mut(from)?;
            let at = at.min(neighbors.len());
            neighbors.shift_insert(at, to.to_string(), costs.to_vec());
        }
        Ok(())
    }

    /// Remove roads between two cities
    ///
    /// With `None` every instance between the pair goes. With `Some(cost)`
    /// the first instance carrying that cost goes. A pair left without
    /// instances disappears from both cities.
    ///
    /// # Errors
    /// `CityNotFound`, `RoadNotFound` or `CostNotFound`
    pub fn remove_road(
        &mut self,
        city1: &str,
        city2: &str,
        cost: Option<Cost>,
    ) -> Result<(), GraphError> {
        self.check_cities(city1, city2)?;
        if self.costs(city1, city2).is_none() {
            return Err(GraphError::road_not_found(city1, city2));
        }

        match cost {
            None => {
                self.drop_pair(city1, city2);
                Ok(())
            }
            Some(cost) => {
                let slot = self
                    .cost_slot(city1, city2, cost)
                    .ok_or_else(|| GraphError::cost_not_found(city1, city2, cost))?;
                self.remove_road_at(city1, city2, slot).map(|_| ())
            }
        }
    }

    /// Remove the road instance at `slot`, returning its cost
    ///
    /// # Errors
    /// `CityNotFound`, `RoadNotFound` or `SlotOutOfRange`
    pub fn remove_road_at(
        &mut self,
        city1: &str,
        city2: &str,
        slot: usize,
    ) -> Result<Cost, GraphError> {
        self.check_slot(city1, city2, slot)?;

        let mut removed = 0;
        for (from, to) in [(city1, city2), (city2, city1)] {
            if let Some(costs) = self.costs_mut(from, to) {
                removed = costs.remove(slot);
            }
        }

        if self.costs(city1, city2).is_some_and(<[Cost]>::is_empty) {
            self.drop_pair(city1, city2);
        }
        Ok(removed)
    }

    /// Replace the first instance of `old_cost` with `new_cost`, in place
    ///
    /// Returns the slot that changed.
    ///
    /// # Errors
    /// `CityNotFound`, `RoadNotFound` or `CostNotFound`
    pub fn update_road_cost(
        &mut self,
        city1: &str,
        city2: &str,
        old_cost: Cost,
        new_cost: Cost,
    ) -> Result<usize, GraphError> {
        self.check_cities(city1, city2)?;
        if self.costs(city1, city2).is_none() {
            return Err(GraphError::road_not_found(city1, city2));
        }
        let slot = self
            .cost_slot(city1, city2, old_cost)
            .ok_or_else(|| GraphError::cost_not_found(city1, city2, old_cost))?;
        self.set_road_cost_at(city1, city2, slot, new_cost)?;
        Ok(slot)
    }

    /// Overwrite the cost at `slot`, returning the previous cost
    ///
    /// # Errors
    /// `CityNotFound`, `RoadNotFound` or `SlotOutOfRange`
    pub fn set_road_cost_at(
        &mut self,
        city1: &str,
        city2: &str,
        slot: usize,
        cost: Cost,
    ) -> Result<Cost, GraphError> {
        self.check_slot(city1, city2, slot)?;

        let mut previous = cost;
        for (from, to) in [(city1, city2), (city2, city1)] {
            if let Some(costs) = self.costs_mut(from, to) {
                previous = std::mem::replace(&mut costs[slot], cost);
            }
        }
        Ok(previous)
    }

    /// Cost list from `city1` towards `city2`
    #[must_use]
    pub fn costs(&self, city1: &str, city2: &str) -> Option<&[Cost]> {
        self.cities.get(city1)?.get(city2).map(Vec::as_slice)
    }

    /// Slot of the first instance with this cost
    #[must_use]
    pub fn cost_slot(&self, city1: &str, city2: &str, cost: Cost) -> Option<usize> {
        self.costs(city1, city2)?.iter().position(|&c| c == cost)
    }

    /// Slot of the last instance with this cost
    #[must_use]
    pub fn last_cost_slot(&self, city1: &str, city2: &str, cost: Cost) -> Option<usize> {
        self.costs(city1, city2)?.iter().rposition(|&c| c == cost)
    }

    /// City names in listing order
    #[must_use]
    pub fn cities(&self) -> Vec<String> {
        self.cities.keys().cloned().collect()
    }

    /// Neighbors of a city with their cost lists; empty for unknown cities
    #[must_use]
    pub fn roads_from(&self, city: &str) -> Vec<(String, Vec<Cost>)> {
        self.cities
            .get(city)
            .map(|neighbors| {
                neighbors
                    .iter()
                    .map(|(n, costs)| (n.clone(), costs.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every undirected pair exactly once, oriented by listing order
    #[must_use]
    pub fn all_roads(&self) -> Vec<Road> {
        let mut roads = Vec::new();
        for (i, (city1, neighbors)) in self.cities.iter().enumerate() {
            for (city2, costs) in neighbors {
                let first_seen_here = self
                    .cities
                    .get_index_of(city2)
                    .map_or(true, |j| i < j);
                if first_seen_here {
                    roads.push(Road {
                        city1: city1.clone(),
                        city2: city2.clone(),
                        costs: costs.clone(),
                    });
                }
            }
        }
        roads
    }

    /// Position of `neighbor` among the roads leaving `city`
    #[inline]
    #[must_use]
    pub fn neighbor_position(&self, city: &str, neighbor: &str) -> Option<usize> {
        self.cities.get(city)?.get_index_of(neighbor)
    }

    /// Equality that also compares city order and neighbor order
    ///
    /// `==` treats two maps listing the same roads in a different order as
    /// equal.
    #[must_use]
    pub fn same_layout(&self, other: &Self) -> bool {
        self.cities.len() == other.cities.len()
            && self
                .cities
                .iter()
                .zip(&other.cities)
                .all(|((city, neighbors), (other_city, other_neighbors))| {
                    city == other_city
                        && neighbors.len() == other_neighbors.len()
                        && neighbors.iter().eq(other_neighbors.iter())
                })
    }

    /// Check the pairwise symmetry invariant
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.cities.iter().all(|(city, neighbors)| {
            neighbors.iter().all(|(neighbor, costs)| {
                neighbor != city
                    && !costs.is_empty()
                    && self.costs(neighbor, city) == Some(costs.as_slice())
            })
        })
    }

    fn neighbors_mut(&mut self, city: &str) -> Result<&mut Neighbors, GraphError> {
        self.cities
            .get_mut(city)
            .ok_or_else(|| GraphError::CityNotFound(city.to_string()))
    }

    fn costs_mut(&mut self, city1: &str, city2: &str) -> Option<&mut Vec<Cost>> {
        self.cities.get_mut(city1)?.get_mut(city2)
    }

    /// Length both directions agree on
    fn pair_len(&self, city1: &str, city2: &str) -> Option<usize> {
        let forward = self.costs(city1, city2)?.len();
        let backward = self.costs(city2, city1)?.len();
        Some(forward.min(backward))
    }

    fn drop_pair(&mut self, city1: &str, city2: &str) {
        if let Some(neighbors) = self.cities.get_mut(city1) {
            neighbors.shift_remove(city2);
        }
        if let Some(neighbors) = self.cities.get_mut(city2) {
            neighbors.shift_remove(city1);
        }
    }

    fn check_cities(&self, city1: &str, city2: &str) -> Result<(), GraphError> {
        for city in [city1, city2] {
            if !self.cities.contains_key(city) {
                return Err(GraphError::CityNotFound(city.to_string()));
            }
        }
        Ok(())
    }

    fn check_endpoints(&self, city1: &str, city2: &str) -> Result<(), GraphError> {
        self.check_cities(city1, city2)?;
        if city1 == city2 {
            return Err(GraphError::SelfLoop(city1.to_string()));
        }
        Ok(())
    }

    fn check_slot(&self, city1: &str, city2: &str, slot: usize) -> Result<(), GraphError> {
        self.check_cities(city1, city2)?;
        let len = self
            .pair_len(city1, city2)
            .ok_or_else(|| GraphError::road_not_found(city1, city2))?;
        if slot >= len {
            return Err(GraphError::SlotOutOfRange {
                city1: city1.to_string(),
                city2: city2.to_string(),
                slot,
            });
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), GraphError> {
    if name.trim().is_empty() {
        return Err(GraphError::EmptyName);
    }
    Ok(())
}

/// Move `old` to `new` without changing its position
fn rekey<V>(map: &mut IndexMap<String, V>, old: &str, new: &str) {
    if let Some((index, _, value)) = map.shift_remove_full(old) {
        map.shift_insert(index, new.to_string(), value);
    }
}
