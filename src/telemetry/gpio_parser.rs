// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `gpio/state` messages and embedded GPIO snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::pin_registry::PinRegistry;
use crate::types::PinState;

/// The level of one pin as reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinReading {
    /// The GPIO number.
    pub pin_number: u8,
    /// The reported level.
    pub state: PinState,
}

impl PinReading {
    /// Creates a reading.
    #[must_use]
    pub const fn new(pin_number: u8, state: PinState) -> Self {
        Self { pin_number, state }
    }
}

/// Parsed `gpio/state` message.
///
/// The firmware reports every pin it drives:
///
/// ```json
/// {"gpio_states":{"2":1,"4":0,"16":0,"17":0}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpioStateMessage {
    /// Reported pin levels, ascending by pin for object payloads.
    pub gpio_states: Vec<PinReading>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct RawGpioState {
    #[serde(default, alias = "gpioStates", alias = "state")]
    gpio_states: Option<Value>,
    #[serde(default)]
    timestamp: Option<i64>,
}

pub(crate) fn parse_gpio_state(
    payload: &[u8],
    pins: &PinRegistry,
) -> Result<GpioStateMessage, DecodeError> {
    let raw: RawGpioState = serde_json::from_slice(payload)?;
    let states = raw
        .gpio_states
        .ok_or(DecodeError::MissingField("gpio_states"))?;

    Ok(GpioStateMessage {
        gpio_states: parse_pin_readings(&states, pins)?,
        timestamp: raw.timestamp.unwrap_or_else(super::now_millis),
    })
}

/// Parses a GPIO state vector.
///
/// Two shapes are accepted: an object keyed by pin number (what the
/// firmware sends) or an array of `{"pinNumber":..,"state":..}` entries.
/// Levels may be `0`/`1`, booleans, or keywords such as `"HIGH"` and `"OFF"`.
pub(crate) fn parse_pin_readings(
    value: &Value,
    pins: &PinRegistry,
) -> Result<Vec<PinReading>, DecodeError> {
    match value {
        Value::Object(map) => {
            let mut readings = map
                .iter()
                .map(|(key, level)| -> Result<PinReading, DecodeError> {
                    let pin = key.trim().parse::<u32>().map_err(|_| {
                        DecodeError::invalid("gpio_states", format!("pin key {key:?} is not a number"))
                    })?;
                    Ok(PinReading::new(pins.validate(pin)?, parse_level(level)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            readings.sort_by_key(|r| r.pin_number);
            Ok(readings)
        }
        Value::Array(entries) => entries
            .iter()
            .map(|entry| -> Result<PinReading, DecodeError> {
                let pin = entry
                    .get("pinNumber")
                    .or_else(|| entry.get("pin"))
                    .ok_or(DecodeError::MissingField("pinNumber"))?;
                let pin = pin
                    .as_u64()
                    .and_then(|p| u32::try_from(p).ok())
                    .ok_or_else(|| DecodeError::invalid("pinNumber", format!("{pin} is not a pin")))?;
                let level = entry.get("state").ok_or(DecodeError::MissingField("state"))?;
                Ok(PinReading::new(pins.validate(pin)?, parse_level(level)?))
            })
            .collect(),
        other => Err(DecodeError::invalid(
            "gpio_states",
            format!("expected object or array, got {other}"),
        )),
    }
}

fn parse_level(value: &Value) -> Result<PinState, DecodeError> {
    match value {
        Value::Bool(b) => Ok(PinState::from(*b)),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(PinState::Low),
            Some(1) => Ok(PinState::High),
            _ => Err(DecodeError::invalid("state", format!("level {n} is not 0 or 1"))),
        },
        Value::String(s) => s.parse(),
        other => Err(DecodeError::invalid("state", format!("unsupported level {other}"))),
    }
}
