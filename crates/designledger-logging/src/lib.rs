//! # designledger-logging
//!
//! Logging for designledger runs.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging to stderr and an optional file
//! - [`LogEvent`] - Run events
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//! - [`RunJournal`] - Per-run JSONL journal

mod events;
mod journal;

pub use events::{LogEvent, LogFormat, Logger};
pub use journal::{default_journal_dir, JournalLine, RunJournal};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
