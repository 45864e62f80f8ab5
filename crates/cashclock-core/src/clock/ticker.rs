//! Periodic tick scheduling.
//!
//! The calculator never runs its own thread. It asks a [`TickScheduler`] for
//! a repeating schedule when it starts running and cancels the returned
//! [`TickHandle`] when it stops. What a "tick" means is up to the scheduler:
//! [`ManualTicks`] does nothing and leaves `tick()` calls to the caller,
//! [`TokioTicker`] posts a [`TickRequest`] to the owner's loop every period.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A live repeating schedule.
pub trait TickHandle: Send {
    fn cancel(&mut self);
}

/// Source of repeating schedules.
pub trait TickScheduler: Send {
    fn schedule(&mut self, period: Duration) -> Box<dyn TickHandle>;
}

/// Scheduler for callers that drive `tick()` themselves.
///
/// Keeps count of live handles so tests can check ownership rules.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    active: Arc<AtomicUsize>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schedules handed out and not yet cancelled.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct ManualHandle {
    active: Arc<AtomicUsize>,
    cancelled: bool,
}

impl TickHandle for ManualHandle {
    fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl TickScheduler for ManualTicks {
    fn schedule(&mut self, _period: Duration) -> Box<dyn TickHandle> {
        self.active.fetch_add(1, Ordering::SeqCst);
        Box::new(ManualHandle {
            active: Arc::clone(&self.active),
            cancelled: false,
        })
    }
}

/// Message posted to the owner loop once per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRequest;

/// Scheduler backed by a tokio interval task per schedule.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    sender: mpsc::UnboundedSender<TickRequest>,
}

impl TokioTicker {
    /// Create a ticker and the receiver the owner loop should poll.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TickRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

struct TokioHandle {
    task: Option<JoinHandle<()>>,
}

impl TickHandle for TokioHandle {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl TickScheduler for TokioTicker {
    fn schedule(&mut self, period: Duration) -> Box<dyn TickHandle> {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if sender.send(TickRequest).is_err() {
                    break;
                }
            }
        });
        Box::new(TokioHandle { task: Some(task) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_handles_are_counted() {
        let mut ticks = ManualTicks::new();
        let mut a = ticks.schedule(DEFAULT_TICK_INTERVAL);
        let b = ticks.schedule(DEFAULT_TICK_INTERVAL);
        assert_eq!(ticks.active(), 2);

        a.cancel();
        a.cancel();
        assert_eq!(ticks.active(), 1);

        drop(b);
        assert_eq!(ticks.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_posts_until_cancelled() {
        let (mut ticker, mut rx) = TokioTicker::channel();
        let mut handle = ticker.schedule(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
