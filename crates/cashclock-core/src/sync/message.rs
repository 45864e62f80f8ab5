use serde::{Deserialize, Serialize};

use crate::clock::Calculator;

/// Key of the only field the peer payload carries.
pub const DATA_KEY: &str = "data";

/// Payload exchanged with the paired device: `{"data": "<snapshot>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMessage {
    pub data: String,
}

impl PeerMessage {
    pub fn from_calculator(calc: &Calculator) -> Self {
        Self { data: calc.encode() }
    }
}

/// Delivery path a payload arrived on.
///
/// Only direct messages are interpreted; the other paths are accepted by the
/// transport but carry nothing this app reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Message,
    UserInfo,
    ApplicationContext,
}

/// Pull the encoded snapshot out of a raw payload, if this one carries one.
pub fn snapshot_payload(channel: Channel, payload: &serde_json::Value) -> Option<&str> {
    if channel != Channel::Message {
        return None;
    }
    payload.get(DATA_KEY)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_serializes_to_single_data_field() {
        let msg = PeerMessage::from_calculator(&Calculator::new());
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"data": "1x40$x0s=0.00$ (init)"})
        );
    }

    #[test]
    fn only_direct_messages_carry_snapshots() {
        let payload = json!({"data": "1x40$x0s=0.00$ (init)"});
        assert_eq!(
            snapshot_payload(Channel::Message, &payload),
            Some("1x40$x0s=0.00$ (init)")
        );
        assert_eq!(snapshot_payload(Channel::UserInfo, &payload), None);
        assert_eq!(snapshot_payload(Channel::ApplicationContext, &payload), None);
    }

    #[test]
    fn non_string_data_is_ignored() {
        assert_eq!(snapshot_payload(Channel::Message, &json!({"data": 5})), None);
        assert_eq!(snapshot_payload(Channel::Message, &json!({"other": "x"})), None);
        assert_eq!(snapshot_payload(Channel::Message, &json!("data")), None);
    }
}
