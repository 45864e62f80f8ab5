//! Phone/watch synchronization.
//!
//! Each device runs its own calculator. Snapshots travel as
//! `{"data": "<encoded snapshot>"}` over an unreliable, unacknowledged link
//! and are reconciled with [`merge_snapshot`].

pub mod channel;
pub mod link;
pub mod merge;
pub mod message;

pub use channel::{loopback_pair, LoopbackEnd, PeerChannel, WriterChannel};
pub use link::PeerLink;
pub use merge::{merge_snapshot, merged_event, resolve, MergeDecision};
pub use message::{snapshot_payload, Channel, PeerMessage};
