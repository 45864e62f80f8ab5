pub mod clock;
pub mod config;
pub mod sync;

use cashclock_core::storage::ClockConfig;
use cashclock_core::{Calculator, Database};

/// Calculator as last saved, or with the configured defaults when nothing
/// usable is stored.
pub(crate) fn load_calculator(db: &Database, defaults: &ClockConfig, mut calc: Calculator) -> Calculator {
    defaults.apply(&mut calc);
    if let Err(err) = db.load_clock(&mut calc) {
        tracing::warn!(error = %err, "stored clock unreadable, starting fresh");
    }
    calc
}
