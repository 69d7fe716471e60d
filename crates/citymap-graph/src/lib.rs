//! CityMap Graph - weighted road multigraph
//!
//! Cities are uniquely named vertices. Any two distinct cities may be joined
//! by several independent roads, each with its own integer cost:
//! - [`CityMap`]: the store, with all-or-nothing structural operations
//! - [`Command`]: one reversible edit per structural operation
//!
//! # Example
//!
//! ```rust
//! use citymap_graph::{CityMap, Command};
//!
//! let mut map = CityMap::new();
//! let mut steps = vec![
//!     Command::add_city("Oslo"),
//!     Command::add_city("Bergen"),
//!     Command::add_road("Oslo", "Bergen", 463),
//! ];
//! for step in &mut steps {
//!     step.execute(&mut map).unwrap();
//! }
//! assert_eq!(map.costs("Bergen", "Oslo"), Some(&[463][..]));
//!
//! steps[2].undo(&mut map).unwrap();
//! assert!(map.roads_from("Oslo").is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod command;
pub mod error;
pub mod store;

pub use command::{CapturedRoad, Command, COMMAND_TAGS};
pub use error::GraphError;
pub use store::{Adjacency, CityMap, Cost, Neighbors, Road, SymmetryRepair};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
