//! Reconciliation of a snapshot received from the paired device.
//!
//! Messages over the peer link can be late or reordered, so accrued cost is
//! used as the progress marker: a running remote only replaces local
//! progress when it is further along.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::{Calculator, ClockSnapshot};
use crate::events::Event;

/// What happened to local progress during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDecision {
    /// Remote state, elapsed time and cost were taken over.
    AdoptRemote,
    /// Only the remote state was taken over; local counters were kept.
    KeepLocalProgress,
}

/// Decide between local and remote progress.
pub fn resolve(local: &ClockSnapshot, remote: &ClockSnapshot) -> MergeDecision {
    if remote.state.is_running() && remote.total_cost > local.total_cost {
        MergeDecision::AdoptRemote
    } else {
        MergeDecision::KeepLocalProgress
    }
}

/// Apply a remote snapshot to the local calculator.
///
/// The rate (persons and cost per hour) always follows the remote. State
/// always follows the remote too; elapsed time and cost only when
/// [`resolve`] says so. Observers are notified with the merged reading.
pub fn merge_snapshot(local: &mut Calculator, remote: &ClockSnapshot) -> MergeDecision {
    local.flush();
    let decision = resolve(&local.snapshot(), remote);

    local.overwrite_rate(remote.number_of_persons, remote.cost_per_hour);
    local.transition_to(remote.state);
    if decision == MergeDecision::AdoptRemote {
        local.overwrite_progress(remote.elapsed_secs, remote.total_cost);
    }
    local.notify_observers();

    tracing::info!(
        ?decision,
        state = %local.state(),
        total_cost = local.total_cost(),
        "merged peer snapshot"
    );
    decision
}

/// Event describing a finished merge.
pub fn merged_event(local: &Calculator, decision: MergeDecision) -> Event {
    Event::SnapshotMerged {
        decision,
        state: local.state(),
        elapsed_secs: local.elapsed_secs(),
        total_cost: local.total_cost(),
        at: Utc::now(),
    }
}
