//! Logging infrastructure for Dragon Radar.
//!
//! This module provides:
//! - Global `tracing` subscriber setup for the command line front end
//! - Per-unit loggers that write a dedicated log file and mirror every
//!   line to `tracing`
//!
//! # Example
//!
//! ```no_run
//! use radar_core::logging::{init_tracing, LogConfig, LogLevel, UnitLogger};
//!
//! init_tracing(LogLevel::Info);
//!
//! let logger = UnitLogger::new("DBZ 001", Some("/path/to/logs".as_ref()), LogConfig::default())
//!     .unwrap();
//! logger.phase("Retiming DBZ 001");
//! logger.success("Audio written");
//! ```

mod types;
mod unit_logger;

pub use types::{LogConfig, LogLevel, MessagePrefix};
pub use unit_logger::UnitLogger;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` and falls back to `default_level`. Output goes to
/// stderr. Calling this more than once is a no-op.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(filter)
        .try_init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
