//! Argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Edit a city map one reversible command at a time
#[derive(Debug, Parser)]
#[command(name = "citymap", version, about, propagate_version = true)]
pub struct Cli {
    /// History document to load and save
    #[arg(short, long, global = true, default_value = "citymap.json")]
    pub file: PathBuf,

    /// TOML file with history limits
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity; `RUST_LOG` wins when set
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Add a city with no roads
    AddCity { name: String },

    /// Remove a city and every road touching it
    RemoveCity { name: String },

    /// Give a city a new name, keeping its roads
    RenameCity { old_name: String, new_name: String },

    /// Add one road instance between two cities
    AddRoad {
        city1: String,
        city2: String,
        #[arg(allow_negative_numbers = true)]
        cost: i64,
    },

    /// Remove one road instance with the given cost
    RemoveRoad {
        city1: String,
        city2: String,
        #[arg(long, allow_negative_numbers = true)]
        cost: i64,
    },

    /// Replace the cost of one road instance
    UpdateRoad {
        city1: String,
        city2: String,
        #[arg(long = "old", allow_negative_numbers = true)]
        old_cost: i64,
        #[arg(long = "new", allow_negative_numbers = true)]
        new_cost: i64,
    },

    /// Revert the most recent command
    Undo,

    /// Reapply the most recently undone command
    Redo,

    /// Jump to a snapshot of the timeline
    Seek { index: usize },

    /// Print cities and roads
    Show {
        /// Print the map state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the snapshot timeline
    History,

    /// Rewrite the document in the current format
    Migrate {
        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Whether the document must be written back afterwards
    #[must_use]
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::Show { .. } | Self::History | Self::Migrate { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
