mod calculator;
mod observer;
pub mod snapshot;
mod state;
mod ticker;
mod time_source;

pub use calculator::Calculator;
pub use observer::{ClockObserver, Detacher, ObserverId, ObserverRegistry};
pub use snapshot::{decode, encode, ClockSnapshot};
pub use state::ClockState;
pub use ticker::{
    ManualTicks, TickHandle, TickRequest, TickScheduler, TokioTicker, DEFAULT_TICK_INTERVAL,
};
pub use time_source::{ManualClock, SystemClock, TimeSource};

/// `HH:MM:SS` for an elapsed duration in seconds.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let total = elapsed_secs.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Amount with two fraction digits.
pub fn format_cost(total_cost: f64) -> String {
    format!("{total_cost:.2}")
}
