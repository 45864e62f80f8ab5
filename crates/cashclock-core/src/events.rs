use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::ClockState;
use crate::sync::MergeDecision;

/// Every state change of a calculator produces an Event.
/// Front ends print or forward them; nothing in the core consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ClockStarted {
        cost_per_hour: u32,
        number_of_persons: u32,
        at: DateTime<Utc>,
    },
    ClockStopped {
        elapsed_secs: f64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    ClockContinued {
        elapsed_secs: f64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    ClockReset {
        at: DateTime<Utc>,
    },
    /// One accrual step while running.
    ClockTicked {
        elapsed_secs: f64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    /// Cost rate inputs changed (stepper or cost field).
    RateChanged {
        cost_per_hour: u32,
        number_of_persons: u32,
        at: DateTime<Utc>,
    },
    /// A snapshot from the paired device was reconciled into the local clock.
    SnapshotMerged {
        decision: MergeDecision,
        state: ClockState,
        elapsed_secs: f64,
        total_cost: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: ClockState,
        cost_per_hour: u32,
        number_of_persons: u32,
        elapsed_secs: f64,
        total_cost: f64,
        /// Encoded peer/persistence form of the same state.
        encoded: String,
        at: DateTime<Utc>,
    },
}
