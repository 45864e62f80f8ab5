use super::channel::PeerChannel;
use super::merge::{merge_snapshot, MergeDecision};
use super::message::{snapshot_payload, Channel, PeerMessage};
use crate::clock::{Calculator, ClockSnapshot};
use crate::error::DecodeError;

/// Session with the paired device.
///
/// Owns the outgoing channel it was given; there is no shared global
/// session.
#[derive(Debug)]
pub struct PeerLink<C> {
    channel: C,
}

impl<C: PeerChannel> PeerLink<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Send the current state. Failures are logged and dropped.
    ///
    /// Returns whether the transport accepted the message.
    pub fn send_snapshot(&mut self, calc: &Calculator) -> bool {
        let message = PeerMessage::from_calculator(calc);
        match self.channel.send(&message) {
            Ok(()) => {
                tracing::debug!(data = %message.data, "snapshot sent to peer");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, data = %message.data, "failed to send snapshot to peer");
                false
            }
        }
    }

    /// Decode and merge a peer message.
    ///
    /// On a decode error the calculator is left untouched.
    pub fn receive(
        &self,
        message: &PeerMessage,
        calc: &mut Calculator,
    ) -> Result<MergeDecision, DecodeError> {
        let remote = ClockSnapshot::decode(&message.data).inspect_err(|err| {
            tracing::warn!(error = %err, data = %message.data, "discarding malformed peer snapshot");
        })?;
        Ok(merge_snapshot(calc, &remote))
    }

    /// Handle a raw payload from any delivery path.
    ///
    /// Returns `Ok(None)` for payloads that carry nothing to merge.
    pub fn receive_payload(
        &self,
        channel: Channel,
        payload: &serde_json::Value,
        calc: &mut Calculator,
    ) -> Result<Option<MergeDecision>, DecodeError> {
        let Some(data) = snapshot_payload(channel, payload) else {
            tracing::warn!(?channel, %payload, "ignoring peer payload");
            return Ok(None);
        };
        let message = PeerMessage {
            data: data.to_string(),
        };
        self.receive(&message, calc).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockState, ManualClock, ManualTicks};
    use crate::error::SyncError;
    use crate::sync::channel::loopback_pair;
    use serde_json::json;

    struct BrokenChannel;

    impl PeerChannel for BrokenChannel {
        fn send(&mut self, _message: &PeerMessage) -> Result<(), SyncError> {
            Err(SyncError::ChannelClosed)
        }
    }

    fn calculator(at: f64) -> (Calculator, ManualClock) {
        let clock = ManualClock::starting_at(at);
        let calc = Calculator::with_runtime(Box::new(clock.clone()), Box::new(ManualTicks::new()));
        (calc, clock)
    }

    #[test]
    fn send_failure_is_swallowed() {
        let mut link = PeerLink::new(BrokenChannel);
        assert!(!link.send_snapshot(&Calculator::new()));
    }

    #[test]
    fn malformed_snapshot_leaves_calculator_untouched() {
        let (phone_end, _watch_end) = loopback_pair();
        let link = PeerLink::new(phone_end);
        let (mut calc, clock) = calculator(0.0);
        calc.start();
        clock.advance(90.0);
        calc.tick();
        let before = calc.snapshot();

        let result = link.receive(&PeerMessage { data: "garbage".into() }, &mut calc);

        assert!(result.is_err());
        assert_eq!(calc.snapshot(), before);
    }

    #[test]
    fn ignored_channels_do_not_merge() {
        let (phone_end, _watch_end) = loopback_pair();
        let link = PeerLink::new(phone_end);
        let (mut calc, _) = calculator(0.0);
        let payload = json!({"data": "3x50$x100s=4.17$ (start)"});

        let result = link.receive_payload(Channel::UserInfo, &payload, &mut calc);
        assert_eq!(result, Ok(None));
        assert_eq!(calc.state(), ClockState::Init);

        let result = link.receive_payload(Channel::Message, &payload, &mut calc);
        assert_eq!(result, Ok(Some(MergeDecision::AdoptRemote)));
        assert_eq!(calc.number_of_persons(), 3);
        assert_eq!(calc.state(), ClockState::Started);
    }

    #[test]
    fn snapshot_travels_between_two_links() {
        let (phone_end, watch_end) = loopback_pair();
        let mut phone_link = PeerLink::new(phone_end);
        let mut watch_link = PeerLink::new(watch_end);

        let (mut phone, phone_clock) = calculator(100.0);
        let (mut watch, _) = calculator(100.0);
        phone.set_cost_per_hour(3600);
        phone.start();
        phone_clock.advance(12.0);
        phone.tick();

        assert!(phone_link.send_snapshot(&phone));
        let incoming = watch_link.channel_mut().try_recv().unwrap();
        let decision = watch_link.receive(&incoming, &mut watch).unwrap();

        assert_eq!(decision, MergeDecision::AdoptRemote);
        assert_eq!(watch.cost_per_hour(), 3600);
        assert_eq!(watch.elapsed_secs(), 12.0);
        assert_eq!(watch.total_cost(), 12.0);
        assert_eq!(watch.state(), ClockState::Started);
    }
}
