//! Persisted document shapes
//!
//! Writing goes through borrowed views of a [`History`]; reading goes through
//! loosely typed records so that legacy and partially unknown content can be
//! migrated instead of rejected.

use crate::engine::History;
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use citymap_graph::{CityMap, Command};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Current document and map-state format
pub const FORMAT_VERSION: &str = "1.2";

/// Full document as written to disk
#[derive(Debug, Serialize)]
pub struct Document<'a> {
    pub history: Vec<SnapshotRecord<'a>>,
    pub current_index: usize,
    #[serde(rename = "_metadata")]
    pub metadata: Metadata,
}

impl<'a> Document<'a> {
    /// Borrow the whole timeline of `history`
    #[must_use]
    pub fn from_history(history: &'a History) -> Self {
        Self {
            history: history.timeline().iter().map(SnapshotRecord::from).collect(),
            current_index: history.cursor(),
            metadata: Metadata::now(),
        }
    }
}

/// One timeline entry
#[derive(Debug, Serialize)]
pub struct SnapshotRecord<'a> {
    pub map_state: MapState<'a>,
    pub undo_stack: &'a [Command],
    pub redo_stack: &'a [Command],
}

impl<'a> From<&'a Snapshot> for SnapshotRecord<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            map_state: MapState {
                cities: snapshot.map(),
                version: FORMAT_VERSION,
            },
            undo_stack: snapshot.undo_stack(),
            redo_stack: snapshot.redo_stack(),
        }
    }
}

/// Versioned graph dump
#[derive(Debug, Serialize)]
pub struct MapState<'a> {
    pub cities: &'a CityMap,
    #[serde(rename = "_version")]
    pub version: &'static str,
}

/// Document metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub created: DateTime<Utc>,
}

impl Metadata {
    #[must_use]
    pub fn now() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            created: Utc::now(),
        }
    }
}

/// Document as read back, before migration
#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    pub(crate) history: Vec<RawSnapshot>,
    #[serde(default)]
    pub(crate) current_index: usize,
    #[serde(rename = "_metadata", default)]
    pub(crate) metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSnapshot {
    #[serde(default = "empty_object")]
    pub(crate) map_state: Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) undo_stack: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) redo_stack: Vec<Value>,
}

/// Older writers emit `null` for a stack they never touched
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `created` is informational and may be in any format
#[derive(Debug, Deserialize)]
pub(crate) struct RawMetadata {
    #[serde(default)]
    pub(crate) version: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
