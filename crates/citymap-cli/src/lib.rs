//! CityMap CLI
//!
//! File-backed front end: every invocation loads the history document,
//! performs one operation through the engine and writes the document back.
//! A missing document starts an empty history.

#![allow(missing_docs)]

pub mod app;
pub mod cli;
pub mod telemetry;

pub use app::run;
pub use cli::{Cli, Commands, LogLevel};
