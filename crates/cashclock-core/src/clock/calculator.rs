//! Cost calculator implementation.
//!
//! The calculator is a wall-clock-based state machine. It does not use
//! internal threads - whoever owns it calls `tick()` periodically, usually
//! in response to a [`TickRequest`](super::TickRequest) from the scheduler it
//! was built with.
//!
//! ## State Transitions
//!
//! ```text
//! Init -> Started -> Stopped -> Continued -> Stopped ...
//! any  -> Init (reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut calc = Calculator::new();
//! calc.start();
//! // In a loop:
//! calc.tick(); // accrues time and cost, notifies observers
//! ```

use std::time::Duration;

use chrono::Utc;

use super::observer::{ClockObserver, Detacher, ObserverId, ObserverRegistry};
use super::snapshot::{ClockSnapshot, DEFAULT_COST_PER_HOUR, DEFAULT_NUMBER_OF_PERSONS};
use super::state::ClockState;
use super::ticker::{ManualTicks, TickHandle, TickScheduler, DEFAULT_TICK_INTERVAL};
use super::time_source::{SystemClock, TimeSource};
use crate::error::ValidationError;
use crate::events::Event;

const SECS_PER_HOUR: f64 = 3600.0;

/// Measures time and money for a group of people.
pub struct Calculator {
    number_of_persons: u32,
    cost_per_hour: u32,
    elapsed_secs: f64,
    total_cost: f64,
    state: ClockState,
    /// Reference time of the last accrual. Only set while running.
    last_tick_at: Option<f64>,
    tick_interval: Duration,
    clock: Box<dyn TimeSource>,
    scheduler: Box<dyn TickScheduler>,
    /// Owned repeating schedule, present exactly while running.
    ticker: Option<Box<dyn TickHandle>>,
    observers: ObserverRegistry,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Defaults (1 person, 40 per hour, `Init`) on the system clock, with
    /// ticks driven by the caller.
    pub fn new() -> Self {
        Self::with_runtime(Box::new(SystemClock), Box::new(ManualTicks::new()))
    }

    pub fn with_runtime(clock: Box<dyn TimeSource>, scheduler: Box<dyn TickScheduler>) -> Self {
        Self {
            number_of_persons: DEFAULT_NUMBER_OF_PERSONS,
            cost_per_hour: DEFAULT_COST_PER_HOUR,
            elapsed_secs: 0.0,
            total_cost: 0.0,
            state: ClockState::Init,
            last_tick_at: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            clock,
            scheduler,
            ticker: None,
            observers: ObserverRegistry::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn number_of_persons(&self) -> u32 {
        self.number_of_persons
    }

    pub fn cost_per_hour(&self) -> u32 {
        self.cost_per_hour
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn last_tick_at(&self) -> Option<f64> {
        self.last_tick_at
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Cost accrued per second at the current rate.
    pub fn cost_per_second(&self) -> f64 {
        f64::from(self.cost_per_hour) * f64::from(self.number_of_persons) / SECS_PER_HOUR
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            number_of_persons: self.number_of_persons,
            cost_per_hour: self.cost_per_hour,
            elapsed_secs: self.elapsed_secs,
            total_cost: self.total_cost,
            state: self.state,
        }
    }

    /// Compact string form, see [`snapshot`](super::snapshot).
    pub fn encode(&self) -> String {
        self.snapshot().encode()
    }

    /// Build a full state snapshot event.
    pub fn status(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            cost_per_hour: self.cost_per_hour,
            number_of_persons: self.number_of_persons,
            elapsed_secs: self.elapsed_secs,
            total_cost: self.total_cost,
            encoded: self.encode(),
            at: Utc::now(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn add_observer(&mut self, observer: Box<dyn ClockObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Handle for removals requested from inside an observer callback.
    pub fn detacher(&self) -> Detacher {
        self.observers.detacher()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Push the current reading to every observer without accruing.
    pub fn notify_observers(&mut self) {
        self.observers.notify(self.elapsed_secs, self.total_cost);
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state != ClockState::Init {
            return None;
        }
        self.elapsed_secs = 0.0;
        self.total_cost = 0.0;
        self.transition_to(ClockState::Started);
        tracing::debug!(
            cost_per_hour = self.cost_per_hour,
            number_of_persons = self.number_of_persons,
            "clock started"
        );
        Some(Event::ClockStarted {
            cost_per_hour: self.cost_per_hour,
            number_of_persons: self.number_of_persons,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        if !self.state.is_running() {
            return None;
        }
        // Flush the interval since the last tick before freezing.
        self.tick();
        self.transition_to(ClockState::Stopped);
        tracing::debug!(
            elapsed_secs = self.elapsed_secs,
            total_cost = self.total_cost,
            "clock stopped"
        );
        Some(Event::ClockStopped {
            elapsed_secs: self.elapsed_secs,
            total_cost: self.total_cost,
            at: Utc::now(),
        })
    }

    /// The `continue` transition: resume a stopped clock without resetting.
    pub fn resume(&mut self) -> Option<Event> {
        if self.state != ClockState::Stopped {
            return None;
        }
        self.transition_to(ClockState::Continued);
        tracing::debug!(elapsed_secs = self.elapsed_secs, "clock continued");
        Some(Event::ClockContinued {
            elapsed_secs: self.elapsed_secs,
            total_cost: self.total_cost,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.transition_to(ClockState::Init);
        tracing::debug!("clock reset");
        Event::ClockReset { at: Utc::now() }
    }

    /// Single start/stop button: start from `Init`, stop while running,
    /// continue when stopped.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.state {
            ClockState::Init => self.start(),
            ClockState::Started | ClockState::Continued => self.stop(),
            ClockState::Stopped => self.resume(),
        }
    }

    /// Call periodically while running. Accrues the interval since the last
    /// tick and notifies observers; does nothing otherwise.
    ///
    /// # Panics
    ///
    /// Panics if the time source reports a time before the last tick.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running() {
            return None;
        }
        self.accrue();
        self.notify_observers();
        Some(Event::ClockTicked {
            elapsed_secs: self.elapsed_secs,
            total_cost: self.total_cost,
            at: Utc::now(),
        })
    }

    /// Stepper input. Rejects zero.
    pub fn set_number_of_persons(&mut self, persons: u32) -> Result<Event, ValidationError> {
        if persons == 0 {
            return Err(ValidationError::InvalidValue {
                field: "number_of_persons".into(),
                message: "must be at least 1".into(),
            });
        }
        self.accrue();
        self.number_of_persons = persons;
        Ok(self.rate_changed())
    }

    /// Cost-per-hour field input.
    pub fn set_cost_per_hour(&mut self, cost_per_hour: u32) -> Event {
        self.accrue();
        self.cost_per_hour = cost_per_hour;
        self.rate_changed()
    }

    /// Change the tick period. A running clock is flushed and keeps its
    /// tick reference; only the schedule is replaced.
    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.accrue();
        self.tick_interval = interval;
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
            self.begin_ticking();
        }
    }

    /// Replace the whole state, e.g. after loading from storage.
    ///
    /// A running snapshot continues accruing from `last_tick_at` (or from
    /// now when absent). A reference later than now is pulled back to now.
    pub fn restore(&mut self, snapshot: &ClockSnapshot, last_tick_at: Option<f64>) {
        self.transition_to(ClockState::Init);
        self.number_of_persons = snapshot.number_of_persons.max(1);
        self.cost_per_hour = snapshot.cost_per_hour;
        if snapshot.state == ClockState::Init {
            return;
        }
        self.elapsed_secs = snapshot.elapsed_secs.max(0.0);
        self.total_cost = snapshot.total_cost.max(0.0);
        self.transition_to(snapshot.state);
        if let (true, Some(reference)) = (self.state.is_running(), last_tick_at) {
            let now = self.clock.now_secs();
            if reference > now {
                tracing::warn!(reference, now, "stored tick reference is in the future");
            }
            self.last_tick_at = Some(reference.min(now));
        }
    }

    // ── Crate internal (peer merge) ──────────────────────────────────

    /// Bring running totals up to now without notifying anyone.
    pub(crate) fn flush(&mut self) {
        self.accrue();
    }

    /// Overwrite the rate without flushing; the caller has already flushed.
    pub(crate) fn overwrite_rate(&mut self, persons: u32, cost_per_hour: u32) {
        self.number_of_persons = persons.max(1);
        self.cost_per_hour = cost_per_hour;
    }

    pub(crate) fn overwrite_progress(&mut self, elapsed_secs: f64, total_cost: f64) {
        self.elapsed_secs = elapsed_secs.max(0.0);
        self.total_cost = total_cost.max(0.0);
    }

    /// Enter `state`, starting or cancelling the ticker as needed.
    /// Entering `Init` zeroes the counters.
    pub(crate) fn transition_to(&mut self, state: ClockState) {
        let was_running = self.state.is_running();
        self.state = state;
        if state == ClockState::Init {
            self.elapsed_secs = 0.0;
            self.total_cost = 0.0;
        }
        match (was_running, state.is_running()) {
            (false, true) => {
                self.last_tick_at = Some(self.clock.now_secs());
                self.begin_ticking();
            }
            (true, false) => self.halt_ticking(),
            _ => {}
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn accrue(&mut self) {
        let Some(last) = self.last_tick_at else {
            return;
        };
        let now = self.clock.now_secs();
        let interval = now - last;
        assert!(
            interval >= 0.0,
            "invalid tick reference: last tick at {last}, now {now}"
        );
        self.total_cost += interval * self.cost_per_second();
        self.elapsed_secs += interval;
        self.last_tick_at = Some(now);
    }

    fn begin_ticking(&mut self) {
        if self.ticker.is_none() {
            self.ticker = Some(self.scheduler.schedule(self.tick_interval));
        }
    }

    fn halt_ticking(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.last_tick_at = None;
    }

    fn rate_changed(&self) -> Event {
        Event::RateChanged {
            cost_per_hour: self.cost_per_hour,
            number_of_persons: self.number_of_persons,
            at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculator")
            .field("number_of_persons", &self.number_of_persons)
            .field("cost_per_hour", &self.cost_per_hour)
            .field("elapsed_secs", &self.elapsed_secs)
            .field("total_cost", &self.total_cost)
            .field("state", &self.state)
            .field("last_tick_at", &self.last_tick_at)
            .field("ticking", &self.ticker.is_some())
            .field("observers", &self.observers)
            .finish()
    }
}

impl std::fmt::Display for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}
