use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Lifecycle of a cost clock.
///
/// ```text
/// Init --start--> Started --stop--> Stopped --continue--> Continued --stop--> Stopped
///   ^                                                                          |
///   +------------------------------- reset (from any state) ------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    #[default]
    Init,
    Started,
    Continued,
    Stopped,
}

impl ClockState {
    /// Token used inside encoded snapshots.
    pub fn token(&self) -> &'static str {
        match self {
            ClockState::Init => "init",
            ClockState::Started => "start",
            ClockState::Continued => "cont",
            ClockState::Stopped => "stop",
        }
    }

    pub fn from_token(token: &str) -> Result<Self, DecodeError> {
        match token {
            "init" => Ok(ClockState::Init),
            "start" => Ok(ClockState::Started),
            "cont" => Ok(ClockState::Continued),
            "stop" => Ok(ClockState::Stopped),
            other => Err(DecodeError::UnknownState(other.to_string())),
        }
    }

    /// Whether time and cost accrue in this state.
    pub fn is_running(&self) -> bool {
        matches!(self, ClockState::Started | ClockState::Continued)
    }
}

impl std::fmt::Display for ClockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
