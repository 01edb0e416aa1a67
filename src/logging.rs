//! Logging initialization
//!
//! Installs a global `tracing` subscriber for hosts that do not bring their
//! own. The filter comes from `RUST_LOG` when set, otherwise from the level
//! passed in. With a log directory, output goes to a daily rolling file
//! (`sandbox.log.YYYY-MM-DD`) through a non-blocking writer; without one it
//! goes to stderr.
//!
//! Hosts must keep the returned guard alive for the lifetime of the process,
//! or buffered file output is lost on exit.

use anyhow::{Context, Result};
use std::io::stderr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::layer, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "sandbox.log";

/// Initialize logging
///
/// Calling this after a global subscriber has been installed (by an earlier
/// call or by the host) is a no-op and returns `Ok(None)`.
pub fn init_logging(log_level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},tiered_sandbox={log_level}")));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(layer().with_writer(non_blocking).with_ansi(false))
                .try_init()
                .is_ok();

            // Lost a race with another initializer; drop our writer.
            Ok(installed.then_some(guard))
        }
        None => {
            // An already-installed subscriber is fine here
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(layer().with_writer(stderr).with_ansi(true))
                .try_init();
            Ok(None)
        }
    }
}

/// Stderr logging at `debug`, for tests
pub fn init_test_logging() {
    let _ = init_logging("debug", None);
}
