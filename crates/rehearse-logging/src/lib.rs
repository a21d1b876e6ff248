//! # rehearse-logging
//!
//! Logging for the rehearse practice simulator.
//!
//! ## Key Types
//!
//! - [`Logger`] - Console rendering of conversation events
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//! - [`TranscriptWriter`] - JSONL export of a finished practice session

mod events;
mod transcript;

pub use events::{LogEvent, LogFormat, Logger, Speaker};
pub use transcript::{TranscriptLine, TranscriptWriter};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application.
///
/// `RUST_LOG` takes precedence over `level`. When `log_dir` is given, JSON
/// records are also written to a daily rolling `rehearse.log` there; keep the
/// returned guard alive for as long as those records should be flushed.
pub fn init_tracing(level: &str, format: LogFormat, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rehearse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    // try_init: a second call (tests, embedded use) keeps the first subscriber
    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty | LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing already initialized");
    }

    guard
}
