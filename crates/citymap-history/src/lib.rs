//! CityMap History - undo/redo, timeline and persistence
//!
//! Wraps a [`CityMap`](citymap_graph::CityMap) in a command engine:
//! - [`History`]: execute, undo, redo and seek over a linear snapshot timeline
//! - [`SharedHistory`]: the same engine behind a mutex for multi-threaded use
//! - [`codec`]: JSON documents, including migration of legacy map dumps
//! - [`HistoryConfig`]: undo and timeline limits, loaded from TOML
//!
//! # Example
//!
//! ```rust
//! use citymap_graph::Command;
//! use citymap_history::{codec, History};
//!
//! let mut history = History::new();
//! history.execute(Command::add_city("A")).unwrap();
//! history.execute(Command::add_city("B")).unwrap();
//! history.execute(Command::add_road("A", "B", 5)).unwrap();
//! history.undo().unwrap();
//! assert!(history.roads_from("A").is_empty());
//!
//! let text = codec::to_json_string(&history, false).unwrap();
//! let mut restored = History::new();
//! codec::from_json_str(&mut restored, &text).unwrap();
//! assert_eq!(restored.cursor(), history.cursor());
//! assert!(restored.can_redo());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod shared;
pub mod snapshot;

pub use codec::{load_from_file, save_to_file, FORMAT_VERSION};
pub use config::HistoryConfig;
pub use engine::History;
pub use error::{CodecError, ConfigError, HistoryError};
pub use shared::SharedHistory;
pub use snapshot::Snapshot;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
