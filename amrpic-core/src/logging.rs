use std::path::Path;

use tracing_subscriber::{filter, prelude::*};

use crate::errors::PicError;

/// Installs a global subscriber which logs events to stdout using the human-readable
/// "pretty" format.
///
/// Events at `level` or above are printed.
/// When `log_file` is given, every event is additionally written to this file.
pub fn init_tracing(level: tracing::Level, log_file: Option<&Path>) -> Result<(), PicError> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_line_number(true)
        .with_level(true)
        .with_filter(filter::LevelFilter::from_level(level));

    // A layer that logs events to a file.
    let debug_log = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .try_init()
        .map_err(|e| PicError::LoggingError(format!("{e}")))
}
