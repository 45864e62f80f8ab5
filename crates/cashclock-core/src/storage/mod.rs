mod clock_store;
mod config;
pub mod database;

pub use clock_store::{StoredClock, CLOCK_KEY};
pub use config::{ClockConfig, Config, LoggingConfig, SyncConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/cashclock[-dev]/` based on CASHCLOCK_ENV.
///
/// Set CASHCLOCK_ENV=dev to use development data directory.
/// CASHCLOCK_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CASHCLOCK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CASHCLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cashclock-dev")
            } else {
                base_dir.join("cashclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
