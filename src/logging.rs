use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, e.g. `TIDY_LOG=debug`.
pub const LOG_ENV_VAR: &str = "TIDY_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs the global tracing subscriber.
///
/// Diagnostics go to stderr without timestamps so they never mix with the
/// regular output on stdout. Calling this more than once is harmless.
pub fn init_logger() {
    let filter_layer = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter_layer)
        .try_init();
}
