//! Log subscriber setup
//!
//! Library crates only emit events; the binary decides where they go.
//! Everything is written to stderr so stdout stays parseable.

use crate::cli::LogLevel;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "citymap=info";

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init(level: Option<LogLevel>, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level.map_or(DEFAULT_FILTER, |level| level.as_str()))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Keep an already installed subscriber
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
