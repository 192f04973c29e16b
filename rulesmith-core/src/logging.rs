//! Logging setup for tools embedding the inference pipeline.
//!
//! The pipeline itself only emits through `tracing` macros; this module
//! is the subscriber side for binaries that drive a run (watch loops,
//! one-shot generators). The filter is scoped to this crate so verbose
//! runs do not drown in sqlx/reqwest internals, and an explicit
//! `RUST_LOG` always wins over the derived level.

use tracing_subscriber::EnvFilter;

use crate::Result;

/// Builds the crate-scoped filter directive for a run.
fn filter_directive(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    format!("rulesmith_core={level}")
}

/// Initializes structured logging for an inference run.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=INFO, 1=DEBUG, 2+=TRACE)
/// * `quiet` - If true, only show ERROR level logs
///
/// A `RUST_LOG` environment variable, when set, overrides the derived
/// filter entirely.
///
/// # Example
/// ```rust,no_run
/// use rulesmith_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::RulesmithError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
