//! History configuration
//!
//! Loaded from TOML, every field optional:
//!
//! ```toml
//! undo_limit = 500
//! timeline_limit = 2000
//! pretty_json = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits and output settings for a [`History`](crate::History)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable commands; the oldest is forgotten first
    pub undo_limit: usize,
    /// Maximum number of retained snapshots; the oldest is discarded first
    pub timeline_limit: usize,
    /// Indent saved documents
    pub pretty_json: bool,
}

impl HistoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With undo limit
    #[inline]
    #[must_use]
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    /// With timeline limit
    #[inline]
    #[must_use]
    pub fn with_timeline_limit(mut self, limit: usize) -> Self {
        self.timeline_limit = limit;
        self
    }

    /// With pretty-printed output
    #[inline]
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error on invalid TOML or a zero limit
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that both limits are positive
    ///
    /// # Errors
    /// `InvalidLimit` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_limit == 0 {
            return Err(ConfigError::InvalidLimit { name: "undo_limit" });
        }
        if self.timeline_limit == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "timeline_limit",
            });
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            undo_limit: 1000,
            timeline_limit: 1000,
            pretty_json: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = HistoryConfig::from_toml_str("undo_limit = 3").unwrap();
        assert_eq!(config, HistoryConfig::new().with_undo_limit(3));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = HistoryConfig::from_toml_str("timeline_limit = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLimit {
                name: "timeline_limit"
            }
        ));
    }

    #[test]
    fn unknown_shape_is_a_toml_error() {
        let err = HistoryConfig::from_toml_str("undo_limit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = HistoryConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
