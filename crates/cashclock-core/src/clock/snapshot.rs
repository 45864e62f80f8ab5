//! Compact string form of a clock, shared by persistence and the peer link.
//!
//! ```text
//! <persons>x<cost_per_hour>$x<elapsed_secs>s=<total_cost>$ (<state>)
//! 1x40$x0s=0.00$ (init)
//! ```
//!
//! Elapsed seconds are written as a truncated integer and the total cost with
//! two fraction digits, so decoding returns exactly what encoding was given
//! for any snapshot whose values already have that precision.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::ClockState;
use crate::error::DecodeError;

pub const DEFAULT_NUMBER_OF_PERSONS: u32 = 1;
pub const DEFAULT_COST_PER_HOUR: u32 = 40;

/// Plain-value view of a calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub number_of_persons: u32,
    pub cost_per_hour: u32,
    pub elapsed_secs: f64,
    pub total_cost: f64,
    pub state: ClockState,
}

impl Default for ClockSnapshot {
    fn default() -> Self {
        Self {
            number_of_persons: DEFAULT_NUMBER_OF_PERSONS,
            cost_per_hour: DEFAULT_COST_PER_HOUR,
            elapsed_secs: 0.0,
            total_cost: 0.0,
            state: ClockState::Init,
        }
    }
}

impl ClockSnapshot {
    pub fn encode(&self) -> String {
        encode(self)
    }

    pub fn decode(input: &str) -> Result<Self, DecodeError> {
        decode(input)
    }
}

/// Encode a snapshot into its compact string form.
pub fn encode(snapshot: &ClockSnapshot) -> String {
    // `as` saturates: negative and NaN become 0.
    let whole_secs = snapshot.elapsed_secs as u64;
    format!(
        "{}x{}$x{}s={:.2}$ ({})",
        snapshot.number_of_persons,
        snapshot.cost_per_hour,
        whole_secs,
        snapshot.total_cost,
        snapshot.state.token()
    )
}

/// Parse a compact string back into a snapshot.
///
/// Surrounding whitespace is ignored; everything else must match the
/// encoded layout exactly.
pub fn decode(input: &str) -> Result<ClockSnapshot, DecodeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }

    let body = input
        .strip_suffix(')')
        .ok_or_else(|| missing(")", input))?;
    let (figures, token) = body
        .rsplit_once("$ (")
        .ok_or_else(|| missing("$ (", input))?;
    let (persons, rest) = figures
        .split_once('x')
        .ok_or_else(|| missing("x", input))?;
    let (cost_per_hour, rest) = rest
        .split_once("$x")
        .ok_or_else(|| missing("$x", input))?;
    let (elapsed, total) = rest
        .split_once("s=")
        .ok_or_else(|| missing("s=", input))?;

    let number_of_persons: u32 = parse_digits("number of persons", persons)?;
    if number_of_persons == 0 {
        return Err(DecodeError::NoPersons);
    }
    let cost_per_hour: u32 = parse_digits("cost per hour", cost_per_hour)?;
    let elapsed_secs: u64 = parse_digits("elapsed seconds", elapsed)?;
    let total_cost = parse_amount(total)?;
    let state = ClockState::from_token(token)?;

    Ok(ClockSnapshot {
        number_of_persons,
        cost_per_hour,
        elapsed_secs: elapsed_secs as f64,
        total_cost,
        state,
    })
}

impl std::fmt::Display for ClockSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for ClockSnapshot {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

fn missing(separator: &'static str, input: &str) -> DecodeError {
    DecodeError::MissingSeparator {
        separator,
        input: input.to_string(),
    }
}

fn invalid(field: &'static str, value: &str) -> DecodeError {
    DecodeError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}

/// Unsigned decimal integer; signs and whitespace are not accepted.
fn parse_digits<T: FromStr>(field: &'static str, value: &str) -> Result<T, DecodeError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field, value));
    }
    value.parse().map_err(|_| invalid(field, value))
}

/// Non-negative decimal amount such as `12.34`.
fn parse_amount(value: &str) -> Result<f64, DecodeError> {
    let well_formed = match value.split_once('.') {
        Some((whole, fraction)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
    };
    if !well_formed {
        return Err(invalid("total cost", value));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid("total cost", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_snapshot_encodes_literally() {
        assert_eq!(ClockSnapshot::default().encode(), "1x40$x0s=0.00$ (init)");
    }

    #[test]
    fn encode_truncates_seconds_and_rounds_cost() {
        let snap = ClockSnapshot {
            number_of_persons: 12,
            cost_per_hour: 85,
            elapsed_secs: 754.9,
            total_cost: 213.876,
            state: ClockState::Continued,
        };
        assert_eq!(snap.encode(), "12x85$x754s=213.88$ (cont)");
    }

    #[test]
    fn decode_reads_every_field() {
        let snap: ClockSnapshot = "3x120$x3600s=360.00$ (stop)".parse().unwrap();
        assert_eq!(snap.number_of_persons, 3);
        assert_eq!(snap.cost_per_hour, 120);
        assert_eq!(snap.elapsed_secs, 3600.0);
        assert_eq!(snap.total_cost, 360.0);
        assert_eq!(snap.state, ClockState::Stopped);
    }

    #[test]
    fn decode_ignores_surrounding_whitespace() {
        let snap = decode("  2x50$x10s=0.28$ (start)\n").unwrap();
        assert_eq!(snap.state, ClockState::Started);
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert_eq!(decode("   "), Err(DecodeError::Empty));
    }

    #[test]
    fn decode_names_the_missing_separator() {
        match decode("1x40$x0s0.00$ (init)") {
            Err(DecodeError::MissingSeparator { separator, .. }) => assert_eq!(separator, "s="),
            other => panic!("unexpected: {other:?}"),
        }
        match decode("1x40$x0s=0.00$ (init") {
            Err(DecodeError::MissingSeparator { separator, .. }) => assert_eq!(separator, ")"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_bad_numbers() {
        assert!(matches!(
            decode("-1x40$x0s=0.00$ (init)"),
            Err(DecodeError::InvalidNumber { field: "number of persons", .. })
        ));
        assert!(matches!(
            decode("1x40$x0s=inf$ (init)"),
            Err(DecodeError::InvalidNumber { field: "total cost", .. })
        ));
        assert!(matches!(
            decode("1x4a$x0s=0.00$ (init)"),
            Err(DecodeError::InvalidNumber { field: "cost per hour", .. })
        ));
        assert!(matches!(
            decode("1x40$x0s=0.$ (init)"),
            Err(DecodeError::InvalidNumber { field: "total cost", .. })
        ));
        assert!(matches!(
            decode("1x40$x0s=.5$ (init)"),
            Err(DecodeError::InvalidNumber { field: "total cost", .. })
        ));
        assert!(matches!(
            decode("1x40$x1.5s=0.00$ (init)"),
            Err(DecodeError::InvalidNumber { field: "elapsed seconds", .. })
        ));
    }

    #[test]
    fn decode_rejects_zero_persons() {
        assert_eq!(decode("0x40$x0s=0.00$ (init)"), Err(DecodeError::NoPersons));
    }

    #[test]
    fn decode_rejects_unknown_state() {
        assert_eq!(
            decode("1x40$x0s=0.00$ (pause)"),
            Err(DecodeError::UnknownState("pause".into()))
        );
    }

    fn any_state() -> impl Strategy<Value = ClockState> {
        prop_oneof![
            Just(ClockState::Init),
            Just(ClockState::Started),
            Just(ClockState::Continued),
            Just(ClockState::Stopped),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            persons in 1u32..=10_000,
            cost in 0u32..=1_000_000,
            secs in 0u32..=10_000_000,
            cents in 0u64..=100_000_000_000,
            state in any_state(),
        ) {
            let snap = ClockSnapshot {
                number_of_persons: persons,
                cost_per_hour: cost,
                elapsed_secs: secs as f64,
                total_cost: cents as f64 / 100.0,
                state,
            };
            prop_assert_eq!(decode(&encode(&snap)), Ok(snap));
        }

        #[test]
        fn decode_never_panics(input in ".{0,40}") {
            let _ = decode(&input);
        }
    }
}
