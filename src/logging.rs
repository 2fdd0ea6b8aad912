//! Logging configuration using tracing
//!
//! Structured logging to stderr with support for the RUST_LOG environment variable.
//! The log is the job's only report, so the default level is `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// - Filtering via RUST_LOG (defaults to "info", or "debug" when `verbose`)
/// - Compact formatted output to stderr, suitable for cron mail and journald
///
/// # Example RUST_LOG values
/// - `RUST_LOG=warn` - Only warnings and failures
/// - `RUST_LOG=issuesync=debug` - Debug level for this crate
/// - `RUST_LOG=issuesync=debug,reqwest=info` - Different levels per crate
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init(verbose: bool) -> crate::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .map_err(|e| crate::SyncError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init(true);
}
