// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message codec for device telemetry.
//!
//! Devices publish on four topics, each with at most one sub-topic:
//!
//! | Topic | Sub-topic | Message |
//! |-------|-----------|---------|
//! | `status` | none | [`StatusMessage`] |
//! | `wifi` | `scan` | [`WifiScanMessage`] |
//! | `gpio` | `state` | [`GpioStateMessage`] |
//! | `settings` | `get` | [`SettingsMessage`] |
//!
//! [`decode`] turns a raw payload for one of these pairs into a
//! [`DeviceMessage`]. Any other pair, malformed JSON, a missing required field
//! or a GPIO pin outside the [`PinRegistry`] yields a [`DecodeError`] and the
//! payload never reaches device state.
//!
//! # Examples
//!
//! ```
//! use espdash_lib::PinRegistry;
//! use espdash_lib::telemetry::{DeviceMessage, SubTopic, Topic, decode};
//!
//! let pins = PinRegistry::default();
//! let payload = br#"{"gpio_states":{"2":1,"4":0}}"#;
//!
//! let msg = decode(Topic::Gpio, Some(SubTopic::State), payload, &pins).unwrap();
//! assert!(matches!(msg, DeviceMessage::GpioState(_)));
//! ```

mod gpio_parser;
mod settings_parser;
mod status_parser;
mod wifi_parser;

pub use gpio_parser::{GpioStateMessage, PinReading};
pub use settings_parser::{GpioConfig, SettingsMessage};
pub use status_parser::StatusMessage;
pub use wifi_parser::{WifiNetwork, WifiScanMessage};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::pin_registry::PinRegistry;

/// Coarse message category carried in the transport address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Heartbeat and health reports.
    Status,
    /// Wi-Fi scan results.
    Wifi,
    /// GPIO pin levels.
    Gpio,
    /// Device configuration.
    Settings,
}

impl Topic {
    /// Returns the topic segment used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Wifi => "wifi",
            Self::Gpio => "gpio",
            Self::Settings => "settings",
        }
    }

    /// Parses a topic segment.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "status" => Some(Self::Status),
            "wifi" => Some(Self::Wifi),
            "gpio" => Some(Self::Gpio),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }

    /// Returns the sub-topic under which devices publish this topic.
    #[must_use]
    pub const fn inbound_sub_topic(self) -> Option<SubTopic> {
        match self {
            Self::Status => None,
            Self::Wifi => Some(SubTopic::Scan),
            Self::Gpio => Some(SubTopic::State),
            Self::Settings => Some(SubTopic::Get),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained operation within a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubTopic {
    /// `wifi/scan`: scan results.
    Scan,
    /// `gpio/state`: current pin levels.
    State,
    /// `gpio/set`: command sent to the device.
    Set,
    /// `settings/get`: current settings.
    Get,
}

impl SubTopic {
    /// Returns the sub-topic segment used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::State => "state",
            Self::Set => "set",
            Self::Get => "get",
        }
    }

    /// Parses a sub-topic segment.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "scan" => Some(Self::Scan),
            "state" => Some(Self::State),
            "set" => Some(Self::Set),
            "get" => Some(Self::Get),
            _ => None,
        }
    }
}

impl fmt::Display for SubTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded message from a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeviceMessage {
    /// From `status`.
    Status(StatusMessage),
    /// From `wifi/scan`.
    WifiScan(WifiScanMessage),
    /// From `gpio/state`.
    GpioState(GpioStateMessage),
    /// From `settings/get`.
    Settings(SettingsMessage),
}

impl DeviceMessage {
    /// Returns the topic this message belongs to.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::Status(_) => Topic::Status,
            Self::WifiScan(_) => Topic::Wifi,
            Self::GpioState(_) => Topic::Gpio,
            Self::Settings(_) => Topic::Settings,
        }
    }

    /// Returns the timestamp carried by (or stamped onto) the message.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Status(m) => m.timestamp,
            Self::WifiScan(m) => m.timestamp,
            Self::GpioState(m) => m.timestamp,
            Self::Settings(m) => m.timestamp,
        }
    }
}

/// Decodes a raw payload for a `(topic, sub-topic)` pair.
///
/// Timestamps absent from the payload are stamped with the current wall
/// clock in epoch milliseconds.
///
/// # Errors
///
/// Returns [`DecodeError`] if:
/// - The sub-topic is not recognized for the topic
/// - The payload is not valid JSON (except a bare status word on `status`)
/// - A required field is absent or has an unusable value
/// - A GPIO pin is not in `pins`
pub fn decode(
    topic: Topic,
    sub_topic: Option<SubTopic>,
    payload: &[u8],
    pins: &PinRegistry,
) -> Result<DeviceMessage, DecodeError> {
    match (topic, sub_topic) {
        (Topic::Status, None) => status_parser::parse_status(payload, pins).map(DeviceMessage::Status),
        (Topic::Wifi, Some(SubTopic::Scan)) => {
            wifi_parser::parse_wifi_scan(payload).map(DeviceMessage::WifiScan)
        }
        (Topic::Gpio, Some(SubTopic::State)) => {
            gpio_parser::parse_gpio_state(payload, pins).map(DeviceMessage::GpioState)
        }
        (Topic::Settings, Some(SubTopic::Get)) => {
            settings_parser::parse_settings(payload, pins).map(DeviceMessage::Settings)
        }
        _ => Err(DecodeError::UnsupportedSubTopic { topic, sub_topic }),
    }
}

/// Current wall clock in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
