//! Logging infrastructure.
//!
//! This module provides:
//! - Per-run loggers with file + callback dual output
//! - Tail buffer of tool output for failure diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use boomerang_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("boomerang_20240101_120000", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.stage("Reverse");
//! logger.command("ffmpeg -y -i original.mp4 -vf reverse reversed.mp4");
//! logger.success("Reversal complete");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix, ToolStream};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to `default_level`. Output goes to
/// stderr. Call once at startup; later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing(LogLevel::Warn);
        init_tracing(LogLevel::Debug);
    }
}
