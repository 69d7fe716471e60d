//! Error types for the history engine
//!
//! Provides error handling for:
//! - Rejected commands (constraint violations from the graph)
//! - Failed inverses during undo/redo (the command is dropped)
//! - Malformed or unsupported persisted documents
//! - Invalid configuration

use citymap_graph::{Command, GraphError};
use std::path::PathBuf;

/// Errors from [`History`](crate::History) operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// The command failed to execute; nothing was recorded
    #[error("command rejected: {0}")]
    Rejected(#[from] GraphError),

    /// Undo stack is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty
    #[error("nothing to redo")]
    NothingToRedo,

    /// The inverse of the top undo command failed; the command was dropped
    #[error("could not revert {command}: {source}")]
    UndoFailed {
        command: Box<Command>,
        #[source]
        source: GraphError,
    },

    /// Re-executing the top redo command failed; the command was dropped
    #[error("could not reapply {command}: {source}")]
    RedoFailed {
        command: Box<Command>,
        #[source]
        source: GraphError,
    },

    /// Timeline index past the end
    #[error("snapshot {index} out of range (timeline has {len})")]
    SnapshotOutOfRange { index: usize, len: usize },
}

impl HistoryError {
    /// Check if the call discarded a command from one of the stacks
    #[inline]
    #[must_use]
    pub fn dropped_command(&self) -> Option<&Command> {
        match self {
            Self::UndoFailed { command, .. } | Self::RedoFailed { command, .. } => Some(&**command),
            _ => None,
        }
    }

    /// Check if the call failed only because a stack was empty
    #[inline]
    #[must_use]
    pub fn is_empty_stack(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

/// Errors reading or writing persisted documents
///
/// A load that fails with any of these leaves the engine untouched.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Document is not valid JSON or does not have the expected shape
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// `current_index` does not point into `history`
    #[error("no snapshot at index {cursor} (document has {len})")]
    MissingSnapshot { cursor: usize, len: usize },

    /// Map state is not a mapping of cities to neighbor mappings
    #[error("malformed map state: {0}")]
    MalformedMapState(String),

    /// Document declares a format this build cannot read
    #[error("unsupported format version: '{0}'")]
    UnsupportedVersion(String),

    /// File could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodecError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMapState(message.into())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file is not valid TOML or has the wrong shape
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A limit that must be positive was zero
    #[error("{name} must be at least 1")]
    InvalidLimit { name: &'static str },

    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_command_is_exposed() {
        let err = HistoryError::UndoFailed {
            command: Box::new(Command::add_city("A")),
            source: GraphError::CityNotFound("A".into()),
        };
        assert_eq!(err.dropped_command(), Some(&Command::add_city("A")));
        assert!(!err.is_empty_stack());
        assert_eq!(
            err.to_string(),
            "could not revert add city 'A': city not found: 'A'"
        );
    }

    #[test]
    fn rejection_wraps_graph_error() {
        let err: HistoryError = GraphError::EmptyName.into();
        assert_eq!(err, HistoryError::Rejected(GraphError::EmptyName));
        assert!(err.dropped_command().is_none());
    }
}
