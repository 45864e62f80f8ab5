//! Two clocks running on their own tokio tickers, linked in-process.

use std::time::Duration;

use cashclock_core::clock::{TimeSource, TokioTicker};
use cashclock_core::sync::{loopback_pair, MergeDecision, PeerLink};
use cashclock_core::{Calculator, ClockState, PeerMessage, TickRequest};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Seconds on tokio's (pausable) clock.
struct TokioClock {
    origin: Instant,
}

impl TimeSource for TokioClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

fn tokio_calculator(origin: Instant) -> (Calculator, UnboundedReceiver<TickRequest>) {
    let (ticker, ticks) = TokioTicker::channel();
    let mut calc = Calculator::with_runtime(Box::new(TokioClock { origin }), Box::new(ticker));
    calc.set_cost_per_hour(3600);
    (calc, ticks)
}

#[tokio::test(start_paused = true)]
async fn ticker_drives_accrual_until_stopped() {
    let (mut calc, mut ticks) = tokio_calculator(Instant::now());
    calc.start();

    let deadline = tokio::time::sleep(Duration::from_secs(2));
    tokio::pin!(deadline);
    let mut seen = 0;
    loop {
        tokio::select! {
            Some(_) = ticks.recv() => {
                calc.tick();
                seen += 1;
            }
            _ = &mut deadline => break,
        }
    }
    calc.stop();

    assert!(seen >= 15, "expected roughly 20 ticks, got {seen}");
    assert!((calc.elapsed_secs() - 2.0).abs() < 1e-6);
    assert!((calc.total_cost() - 2.0).abs() < 1e-6);

    // No more requests after stop.
    tokio::time::sleep(Duration::from_secs(1)).await;
    while ticks.try_recv().is_ok() {}
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(ticks.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn watch_follows_phone_over_loopback() {
    let origin = Instant::now();
    let (phone_end, watch_end) = loopback_pair();
    let mut phone_link = PeerLink::new(phone_end);
    let mut watch_link = PeerLink::new(watch_end);
    let (mut phone, mut phone_ticks) = tokio_calculator(origin);
    let (mut watch, _watch_ticks) = tokio_calculator(origin);

    phone.start();
    for _ in 0..10 {
        phone_ticks.recv().await;
        phone.tick();
        phone_link.send_snapshot(&phone);
    }

    let mut decisions = Vec::new();
    while let Some(message) = watch_link.channel_mut().try_recv() {
        decisions.push(watch_link.receive(&message, &mut watch).unwrap());
    }

    assert_eq!(decisions.len(), 10);
    assert_eq!(watch.state(), ClockState::Started);
    assert_eq!(watch.encode(), phone.encode());

    // A late copy of the first message does not rewind the watch.
    let stale = PeerMessage {
        data: "1x3600$x0s=0.10$ (start)".into(),
    };
    let before = watch.total_cost();
    assert_eq!(
        watch_link.receive(&stale, &mut watch).unwrap(),
        MergeDecision::KeepLocalProgress
    );
    assert!(watch.total_cost() >= before);

    // Stop on the phone reaches the watch and halts it.
    phone.stop();
    phone_link.send_snapshot(&phone);
    let message = watch_link.channel_mut().recv().await.unwrap();
    watch_link.receive(&message, &mut watch).unwrap();
    assert_eq!(watch.state(), ClockState::Stopped);
}
