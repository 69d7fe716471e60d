//! Thread-safe handle over a [`History`]
//!
//! Every entry point takes the lock for its whole duration, so a command,
//! its stack bookkeeping and its snapshot are observed as one step.

use crate::codec;
use crate::config::HistoryConfig;
use crate::engine::History;
use crate::error::{CodecError, HistoryError};
use citymap_graph::{Command, Cost, Road};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Cloneable handle; clones share one history
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<Mutex<History>>,
}

impl SharedHistory {
    /// Empty map with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::from_history(History::new())
    }

    #[must_use]
    pub fn with_config(config: HistoryConfig) -> Self {
        Self::from_history(History::with_config(config))
    }

    #[must_use]
    pub fn from_history(history: History) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    /// Execute a command
    ///
    /// # Errors
    /// See [`History::execute`]
    pub fn execute(&self, command: Command) -> Result<(), HistoryError> {
        self.inner.lock().execute(command)
    }

    /// # Errors
    /// See [`History::undo`]
    pub fn undo(&self) -> Result<(), HistoryError> {
        self.inner.lock().undo()
    }

    /// # Errors
    /// See [`History::redo`]
    pub fn redo(&self) -> Result<(), HistoryError> {
        self.inner.lock().redo()
    }

    /// # Errors
    /// See [`History::seek`]
    pub fn seek(&self, index: usize) -> Result<(), HistoryError> {
        self.inner.lock().seek(index)
    }

    #[must_use]
    pub fn cities(&self) -> Vec<String> {
        self.inner.lock().cities()
    }

    #[must_use]
    pub fn roads_from(&self, city: &str) -> Vec<(String, Vec<Cost>)> {
        self.inner.lock().roads_from(city)
    }

    #[must_use]
    pub fn all_roads(&self) -> Vec<Road> {
        self.inner.lock().all_roads()
    }

    /// Document for the current state
    ///
    /// # Errors
    /// Serialization failure
    pub fn serialize(&self) -> Result<Value, CodecError> {
        codec::to_value(&*self.inner.lock())
    }

    /// Replace the state with a decoded document
    ///
    /// # Errors
    /// See [`codec::deserialize`]
    pub fn deserialize(&self, document: Value) -> Result<(), CodecError> {
        codec::deserialize(&mut *self.inner.lock(), document)
    }

    /// Run `f` with shared access under the lock
    pub fn with<R>(&self, f: impl FnOnce(&History) -> R) -> R {
        f(&*self.inner.lock())
    }

    /// Run `f` with exclusive access under the lock
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut History) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}
