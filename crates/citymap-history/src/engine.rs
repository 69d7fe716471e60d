//! History engine
//!
//! [`History`] owns the map, the undo and redo stacks and a linear timeline
//! of snapshots. Every successful execute, undo or redo appends a snapshot
//! and moves the cursor onto it. There is no branching: a new snapshot
//! discards everything after the cursor, and a new command empties the redo
//! stack.

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::snapshot::Snapshot;
use citymap_graph::{CityMap, Command, Cost, Road};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Versioned command engine over a [`CityMap`]
#[derive(Debug, Clone)]
pub struct History {
    config: HistoryConfig,
    map: CityMap,
    /// Back is the top of the stack
    undo_stack: VecDeque<Command>,
    redo_stack: Vec<Command>,
    timeline: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    /// Empty map with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Empty map with custom configuration
    #[must_use]
    pub fn with_config(config: HistoryConfig) -> Self {
        Self::from_map(CityMap::new(), config)
    }

    /// Start a history from an existing map
    ///
    /// The map becomes snapshot 0 with empty stacks.
    #[must_use]
    pub fn from_map(map: CityMap, config: HistoryConfig) -> Self {
        let mut history = Self {
            config,
            map,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            timeline: Vec::new(),
            cursor: 0,
        };
        history.record_snapshot();
        history
    }

    /// Execute a command and make it undoable
    ///
    /// Clears the redo stack on success.
    ///
    /// # Errors
    /// `Rejected` when the command cannot run; state is unchanged
    pub fn execute(&mut self, mut command: Command) -> Result<(), HistoryError> {
        if let Err(e) = command.execute(&mut self.map) {
            debug!(%command, error = %e, "command rejected");
            return Err(HistoryError::Rejected(e));
        }

        debug!(%command, "command executed");
        self.push_undo(command);
        self.redo_stack.clear();
        self.record_snapshot();
        Ok(())
    }

    /// Revert the most recent command
    ///
    /// A command whose inverse fails is dropped, not requeued. The snapshot
    /// at the cursor is rewritten so that seeking back to it does not bring
    /// the dropped command back.
    ///
    /// # Errors
    /// `NothingToUndo` or `UndoFailed`
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let command = self
            .undo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToUndo)?;

        match command.undo(&mut self.map) {
            Ok(()) => {
                debug!(%command, "command undone");
                self.redo_stack.push(command);
                self.record_snapshot();
                Ok(())
            }
            Err(source) => {
                warn!(%command, error = %source, "undo failed, dropping command");
                self.refresh_snapshot();
                Err(HistoryError::UndoFailed {
                    command: Box::new(command),
                    source,
                })
            }
        }
    }

    /// Reapply the most recently undone command
    ///
    /// A command that fails to re-execute is dropped, not requeued, and the
    /// snapshot at the cursor is rewritten to match.
    ///
    /// # Errors
    /// `NothingToRedo` or `RedoFailed`
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let mut command = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;

        match command.execute(&mut self.map) {
            Ok(()) => {
                debug!(%command, "command redone");
                self.push_undo(command);
                self.record_snapshot();
                Ok(())
            }
            Err(source) => {
                warn!(%command, error = %source, "redo failed, dropping command");
                self.refresh_snapshot();
                Err(HistoryError::RedoFailed {
                    command: Box::new(command),
                    source,
                })
            }
        }
    }

    /// Restore the map and stacks captured at `index` and move the cursor there
    ///
    /// No snapshot is appended; the next one replaces everything after `index`.
    ///
    /// # Errors
    /// `SnapshotOutOfRange`
    pub fn seek(&mut self, index: usize) -> Result<(), HistoryError> {
        let snapshot = self
            .timeline
            .get(index)
            .cloned()
            .ok_or(HistoryError::SnapshotOutOfRange {
                index,
                len: self.timeline.len(),
            })?;

        self.apply(snapshot);
        self.cursor = index;
        debug!(index, "moved to snapshot");
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn map(&self) -> &CityMap {
        &self.map
    }

    /// City names in listing order
    #[must_use]
    pub fn cities(&self) -> Vec<String> {
        self.map.cities()
    }

    /// Neighbors of a city with their cost lists
    #[must_use]
    pub fn roads_from(&self, city: &str) -> Vec<(String, Vec<Cost>)> {
        self.map.roads_from(city)
    }

    /// Every undirected pair once
    #[must_use]
    pub fn all_roads(&self) -> Vec<Road> {
        self.map.all_roads()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn timeline(&self) -> &[Snapshot] {
        &self.timeline
    }

    #[inline]
    #[must_use]
    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.timeline.get(index)
    }

    /// Index of the snapshot matching the current state
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo stack, bottom to top
    #[must_use]
    pub fn undo_stack(&self) -> Vec<&Command> {
        self.undo_stack.iter().collect()
    }

    /// Redo stack, bottom to top
    #[inline]
    #[must_use]
    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Replace the whole state with a decoded timeline
    ///
    /// Callers guarantee `cursor < timeline.len()`.
    pub(crate) fn install(&mut self, timeline: Vec<Snapshot>, cursor: usize) {
        debug_assert!(cursor < timeline.len());
        if let Some(snapshot) = timeline.get(cursor).cloned() {
            self.apply(snapshot);
            self.timeline = timeline;
            self.cursor = cursor;
        }
    }

    fn apply(&mut self, snapshot: Snapshot) {
        let (map, undo_stack, redo_stack) = snapshot.into_parts();
        self.map = map;
        self.undo_stack = undo_stack.into();
        self.redo_stack = redo_stack;
    }

    fn push_undo(&mut self, command: Command) {
        self.undo_stack.push_back(command);
        let limit = self.config.undo_limit.max(1);
        while self.undo_stack.len() > limit {
            if let Some(forgotten) = self.undo_stack.pop_front() {
                debug!(command = %forgotten, "undo limit reached, forgetting oldest command");
            }
        }
    }

    fn current_snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.map.clone(),
            self.undo_stack.iter().cloned().collect(),
            self.redo_stack.clone(),
        )
    }

    /// Overwrite the snapshot at the cursor with the live state
    fn refresh_snapshot(&mut self) {
        let snapshot = self.current_snapshot();
        if let Some(slot) = self.timeline.get_mut(self.cursor) {
            *slot = snapshot;
        }
    }

    fn record_snapshot(&mut self) {
        if !self.timeline.is_empty() {
            self.timeline.truncate(self.cursor + 1);
        }
        let snapshot = self.current_snapshot();
        self.timeline.push(snapshot);

        let limit = self.config.timeline_limit.max(1);
        if self.timeline.len() > limit {
            let excess = self.timeline.len() - limit;
            self.timeline.drain(..excess);
        }
        self.cursor = self.timeline.len() - 1;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
