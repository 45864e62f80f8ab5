//! Subscribers that get the current reading after every accrual step.

use std::sync::{Arc, Mutex};

/// Anything that wants the running totals, typically a display.
///
/// Receives absolute values, never deltas.
pub trait ClockObserver: Send {
    fn update(&mut self, elapsed_secs: f64, total_cost: f64);
}

impl<F> ClockObserver for F
where
    F: FnMut(f64, f64) + Send,
{
    fn update(&mut self, elapsed_secs: f64, total_cost: f64) {
        self(elapsed_secs, total_cost)
    }
}

/// Handle returned on registration, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Queues removals that arrive while a notification pass may be running.
///
/// Detaching through this handle never disturbs the pass in progress; the
/// observer is dropped right before the next pass.
#[derive(Debug, Clone, Default)]
pub struct Detacher {
    pending: Arc<Mutex<Vec<ObserverId>>>,
}

impl Detacher {
    pub fn detach(&self, id: ObserverId) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(id);
        }
    }

    fn take(&self) -> Vec<ObserverId> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }
}

/// Ordered list of observers.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn ClockObserver>)>,
    detacher: Detacher,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Box<dyn ClockObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        tracing::debug!(?id, count = self.entries.len(), "observer added");
        id
    }

    /// Remove immediately. Returns false if the handle is unknown.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    pub fn detacher(&self) -> Detacher {
        self.detacher.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notify every observer in registration order.
    pub fn notify(&mut self, elapsed_secs: f64, total_cost: f64) {
        for id in self.detacher.take() {
            self.remove(id);
        }
        for (_, observer) in self.entries.iter_mut() {
            observer.update(elapsed_secs, total_cost);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.entries.len())
            .finish()
    }
}
