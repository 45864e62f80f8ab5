//! The persisted clock record.
//!
//! Stored as JSON under [`CLOCK_KEY`] in the kv table. The rate fields are
//! always present; the encoded snapshot carries the lifecycle state. The
//! precise counters and tick reference let a clock keep running across
//! separate processes without losing the fractions the snapshot rounds off.

use serde::{Deserialize, Serialize};

use super::database::Database;
use crate::clock::{Calculator, ClockSnapshot, ClockState};
use crate::error::Result;

pub const CLOCK_KEY: &str = "CashClock";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredClock {
    pub cost_per_hour: u32,
    pub number_of_persons: u32,
    #[serde(default)]
    pub snapshot: Option<String>,
    #[serde(default)]
    pub elapsed_secs: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub last_tick_at: Option<f64>,
}

impl StoredClock {
    pub fn capture(calc: &Calculator) -> Self {
        Self {
            cost_per_hour: calc.cost_per_hour(),
            number_of_persons: calc.number_of_persons(),
            snapshot: Some(calc.encode()),
            elapsed_secs: Some(calc.elapsed_secs()),
            total_cost: Some(calc.total_cost()),
            last_tick_at: calc.last_tick_at(),
        }
    }

    /// Load this record into `calc`.
    ///
    /// A snapshot that does not decode is skipped with a warning and only
    /// the rate is applied.
    pub fn apply(&self, calc: &mut Calculator) {
        let mut snapshot = match self.snapshot.as_deref().map(ClockSnapshot::decode) {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "stored snapshot unreadable, keeping rate only");
                ClockSnapshot::default()
            }
            None => ClockSnapshot::default(),
        };
        snapshot.cost_per_hour = self.cost_per_hour;
        snapshot.number_of_persons = self.number_of_persons;
        if snapshot.state != ClockState::Init {
            snapshot.elapsed_secs = self.elapsed_secs.unwrap_or(snapshot.elapsed_secs);
            snapshot.total_cost = self.total_cost.unwrap_or(snapshot.total_cost);
        }
        calc.restore(&snapshot, self.last_tick_at);
    }
}

impl Database {
    /// Persist the calculator under [`CLOCK_KEY`].
    pub fn save_clock(&self, calc: &Calculator) -> Result<()> {
        let record = StoredClock::capture(calc);
        self.kv_set(CLOCK_KEY, &serde_json::to_string(&record)?)?;
        tracing::debug!(
            cost_per_hour = record.cost_per_hour,
            number_of_persons = record.number_of_persons,
            "clock saved"
        );
        Ok(())
    }

    /// Restore the calculator from storage.
    ///
    /// Returns `Ok(false)` when nothing was stored yet; the calculator keeps
    /// its current values in that case.
    pub fn load_clock(&self, calc: &mut Calculator) -> Result<bool> {
        let Some(json) = self.kv_get(CLOCK_KEY)? else {
            tracing::debug!("nothing loaded - no clock data found");
            return Ok(false);
        };
        let record: StoredClock = serde_json::from_str(&json)?;
        record.apply(calc);
        tracing::debug!(state = %calc.state(), "clock loaded");
        Ok(true)
    }
}
