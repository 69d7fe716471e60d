//! Error types for the road graph
//!
//! Every structural operation is all-or-nothing: when one of these errors is
//! returned the [`CityMap`](crate::CityMap) is exactly as it was before the call.

use crate::store::Cost;

/// Constraint violations raised by [`CityMap`](crate::CityMap) and
/// [`Command`](crate::Command)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A city with this name already exists
    #[error("city already exists: '{0}'")]
    DuplicateCity(String),

    /// No city with this name
    #[error("city not found: '{0}'")]
    CityNotFound(String),

    /// The two cities exist but have no road between them
    #[error("no road between '{city1}' and '{city2}'")]
    RoadNotFound { city1: String, city2: String },

    /// A road exists but none of its instances carries this cost
    #[error("no road between '{city1}' and '{city2}' with cost {cost}")]
    CostNotFound {
        city1: String,
        city2: String,
        cost: Cost,
    },

    /// Road instance index past the end of the cost list
    #[error("road slot {slot} out of range between '{city1}' and '{city2}'")]
    SlotOutOfRange {
        city1: String,
        city2: String,
        slot: usize,
    },

    /// Both ends of a road name the same city
    #[error("road endpoints must differ: '{0}'")]
    SelfLoop(String),

    /// City names must contain something other than whitespace
    #[error("city name must not be empty")]
    EmptyName,
}

impl GraphError {
    pub(crate) fn road_not_found(city1: &str, city2: &str) -> Self {
        Self::RoadNotFound {
            city1: city1.to_string(),
            city2: city2.to_string(),
        }
    }

    pub(crate) fn cost_not_found(city1: &str, city2: &str, cost: Cost) -> Self {
        Self::CostNotFound {
            city1: city1.to_string(),
            city2: city2.to_string(),
            cost,
        }
    }

    /// True when the operation referenced something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CityNotFound(_)
                | Self::RoadNotFound { .. }
                | Self::CostNotFound { .. }
                | Self::SlotOutOfRange { .. }
        )
    }

    /// True when the operation would have broken a uniqueness or shape rule
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCity(_) | Self::SelfLoop(_) | Self::EmptyName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint() {
        let errors = [
            GraphError::DuplicateCity("A".into()),
            GraphError::CityNotFound("A".into()),
            GraphError::road_not_found("A", "B"),
            GraphError::cost_not_found("A", "B", 3),
            GraphError::SelfLoop("A".into()),
            GraphError::EmptyName,
        ];

        for e in &errors {
            assert_ne!(e.is_not_found(), e.is_conflict(), "{e}");
        }
    }

    #[test]
    fn messages_name_the_cities() {
        let e = GraphError::cost_not_found("Oslo", "Bergen", 7);
        assert_eq!(e.to_string(), "no road between 'Oslo' and 'Bergen' with cost 7");
    }
}
