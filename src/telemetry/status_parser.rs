// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `status` messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::pin_registry::PinRegistry;
use crate::types::DeviceStatus;

use super::gpio_parser::{PinReading, parse_pin_readings};

/// Parsed `status` message.
///
/// The firmware sends a periodic heartbeat such as
/// `{"status":"online","uptime":3600}` and a retained bare `online` when it
/// (re)connects. Only `status` is required.
///
/// # Examples
///
/// ```
/// use espdash_lib::PinRegistry;
/// use espdash_lib::telemetry::{DeviceMessage, Topic, decode};
/// use espdash_lib::types::DeviceStatus;
///
/// let msg = decode(Topic::Status, None, b"online", &PinRegistry::default()).unwrap();
/// let DeviceMessage::Status(status) = msg else { unreachable!() };
/// assert_eq!(status.status, DeviceStatus::Online);
/// assert!(status.uptime.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    /// Reported health.
    pub status: DeviceStatus,
    /// SSID of the network the device is connected to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    /// Signal strength in dBm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    /// Seconds since boot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Name the device reports for itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Embedded GPIO snapshot, empty if the heartbeat carried none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpio_states: Vec<PinReading>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "SSID", alias = "wifiSsid")]
    ssid: Option<String>,
    #[serde(default, alias = "RSSI", alias = "signal")]
    rssi: Option<i32>,
    #[serde(default)]
    uptime: Option<u64>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default, rename = "deviceName", alias = "device_name", alias = "name")]
    device_name: Option<String>,
    #[serde(default, alias = "gpioStates")]
    gpio_states: Option<Value>,
}

pub(crate) fn parse_status(payload: &[u8], pins: &PinRegistry) -> Result<StatusMessage, DecodeError> {
    if let Some(status) = parse_bare_status(payload) {
        return Ok(StatusMessage {
            status: status?,
            ssid: None,
            rssi: None,
            uptime: None,
            timestamp: super::now_millis(),
            device_name: None,
            gpio_states: Vec::new(),
        });
    }

    let raw: RawStatus = serde_json::from_slice(payload)?;
    let status = raw
        .status
        .ok_or(DecodeError::MissingField("status"))?
        .parse()?;
    let gpio_states = match raw.gpio_states {
        Some(ref value) => parse_pin_readings(value, pins)?,
        None => Vec::new(),
    };

    Ok(StatusMessage {
        status,
        ssid: raw.ssid,
        rssi: raw.rssi,
        uptime: raw.uptime,
        timestamp: raw.timestamp.unwrap_or_else(super::now_millis),
        device_name: raw.device_name,
        gpio_states,
    })
}

/// Recognizes a plain-text status word.
///
/// Returns `None` when the payload looks like JSON and must go through the
/// structured path instead.
fn parse_bare_status(payload: &[u8]) -> Option<Result<DeviceStatus, DecodeError>> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.starts_with('{') || text.is_empty() {
        return None;
    }
    Some(text.trim_matches('"').parse())
}
