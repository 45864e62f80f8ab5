//! # CashClock Core Library
//!
//! This library provides the core logic of CashClock, a meeting cost clock
//! that runs side by side on two paired devices (phone and watch). Front
//! ends are thin shells over it: they forward button, stepper and text field
//! events and render what observers receive.
//!
//! ## Architecture
//!
//! - **Clock**: A wall-clock-based cost calculator that accrues elapsed time
//!   and cost on each `tick()`, with a four-state lifecycle
//! - **Snapshot codec**: Compact string form used for persistence and for
//!   device-to-device transfer
//! - **Sync**: Progress-favoring reconciliation of snapshots from the peer
//! - **Storage**: SQLite key-value record and TOML configuration
//!
//! ## Key Components
//!
//! - [`Calculator`]: Core clock state machine
//! - [`ClockSnapshot`]: Encodable value view of a calculator
//! - [`PeerLink`]: Sends and merges snapshots over an injected channel
//! - [`Database`]: Persistence of the clock record
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod storage;
pub mod sync;

pub use clock::{
    Calculator, ClockObserver, ClockSnapshot, ClockState, ObserverId, TickRequest, TokioTicker,
};
pub use error::{ConfigError, CoreError, DatabaseError, DecodeError, SyncError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, StoredClock};
pub use sync::{merge_snapshot, MergeDecision, PeerLink, PeerMessage};
