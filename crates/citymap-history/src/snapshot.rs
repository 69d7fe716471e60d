//! Timeline snapshots

use citymap_graph::{CityMap, Command};

/// Self-contained capture of the map and both command stacks
///
/// Snapshots own copies of everything they hold; restoring one never reads
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    map: CityMap,
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl Snapshot {
    /// Create snapshot; stacks are ordered bottom to top
    #[inline]
    #[must_use]
    pub fn new(map: CityMap, undo_stack: Vec<Command>, redo_stack: Vec<Command>) -> Self {
        Self {
            map,
            undo_stack,
            redo_stack,
        }
    }

    #[inline]
    #[must_use]
    pub fn map(&self) -> &CityMap {
        &self.map
    }

    #[inline]
    #[must_use]
    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    #[inline]
    #[must_use]
    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    pub(crate) fn into_parts(self) -> (CityMap, Vec<Command>, Vec<Command>) {
        (self.map, self.undo_stack, self.redo_stack)
    }
}
