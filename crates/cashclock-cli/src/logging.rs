//! Log setup for the CLI.
//!
//! Logs go to stderr so stdout stays parseable JSON. `RUST_LOG` takes
//! precedence over the `[logging] level` config value.

use cashclock_core::storage::LoggingConfig;
use tracing_subscriber::EnvFilter;

pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // A second init (e.g. from a test harness) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
