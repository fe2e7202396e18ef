// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `espdash` library.
//!
//! Every failure is handled at the boundary where it occurs:
//!
//! - [`DecodeError`] and [`InvalidPinError`] reject a payload before it can
//!   reach device state.
//! - [`RouteError`] reports why the subscription router dropped a message.
//! - [`StoreError`] covers snapshot persistence.
//! - [`ProtocolError`] covers the MQTT transport.
//!
//! Benign conditions raised by the aggregator (unknown device, duplicate
//! registration) are not errors at all: they are reported as a [`Warning`]
//! inside [`Outcome::Ignored`](crate::manager::Outcome::Ignored).

use thiserror::Error;

use crate::pin_registry::HardwareFamily;
use crate::telemetry::{SubTopic, Topic};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A transport message could not be routed.
    #[error("route error: {0}")]
    Route(#[from] RouteError),

    /// Snapshot persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Transport communication failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A pin number is not supported by the hardware family.
    #[error("invalid pin: {0}")]
    InvalidPin(#[from] InvalidPinError),
}

/// A GPIO pin number outside the supported set of a hardware family.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("GPIO {pin} is not available on {family}")]
pub struct InvalidPinError {
    /// The rejected pin number.
    pub pin: u32,
    /// The hardware family the pin was checked against.
    pub family: HardwareFamily,
}

/// Errors raised while decoding a device payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The sub-topic is not recognized for the topic.
    #[error("unsupported sub-topic {sub_topic:?} for topic {topic}")]
    UnsupportedSubTopic {
        /// The message topic.
        topic: Topic,
        /// The sub-topic that was supplied.
        sub_topic: Option<SubTopic>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(&'static str),

    /// A field is present but its value cannot be used.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },

    /// The payload references a pin that is not in the registry.
    #[error(transparent)]
    InvalidPin(#[from] InvalidPinError),
}

impl DecodeError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the subscription router.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The transport topic does not have the `<prefix>/<device>/<topic>` shape.
    #[error("invalid topic format: {0}")]
    InvalidTopic(String),

    /// The topic prefix is not mapped to a hardware family.
    #[error("unknown topic prefix: {0}")]
    UnknownPrefix(String),

    /// The topic segment is not a known message topic.
    #[error("unknown message topic: {0}")]
    UnknownTopic(String),

    /// The sub-topic segment is not a known sub-topic.
    #[error("unknown sub-topic: {0}")]
    UnknownSubTopic(String),

    /// The payload was rejected by the codec.
    #[error("payload from {device_id} rejected: {source}")]
    Decode {
        /// The device the payload was addressed from.
        device_id: String,
        /// The underlying decode failure.
        #[source]
        source: DecodeError,
    },
}

/// Errors related to snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),

    /// No storage location could be determined.
    #[error("no storage location available")]
    NoLocation,
}

/// Errors related to transport communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Benign conditions reported by the aggregator instead of an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A mutation referenced a device that is not registered.
    #[error("unknown device {0}")]
    UnknownDevice(String),

    /// A registration referenced a device that already exists.
    #[error("device {0} already exists")]
    DuplicateDevice(String),

    /// A metadata update referenced a pin the device has never reported.
    #[error("device {device_id} has no GPIO {pin}")]
    UnknownPin {
        /// The device that was addressed.
        device_id: String,
        /// The pin that was not found.
        pin: u8,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pin_display() {
        let err = InvalidPinError {
            pin: 5,
            family: HardwareFamily::Esp32,
        };
        assert_eq!(err.to_string(), "GPIO 5 is not available on ESP32");
    }

    #[test]
    fn error_from_decode_error() {
        let decode_err = DecodeError::MissingField("status");
        let err: Error = decode_err.into();
        assert!(matches!(err, Error::Decode(DecodeError::MissingField("status"))));
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::MissingField("networks");
        assert_eq!(err.to_string(), "missing field in payload: networks");
    }

    #[test]
    fn decode_error_wraps_invalid_pin_transparently() {
        let err: DecodeError = InvalidPinError {
            pin: 99,
            family: HardwareFamily::Esp32,
        }
        .into();
        assert_eq!(err.to_string(), "GPIO 99 is not available on ESP32");
    }

    #[test]
    fn route_error_carries_device() {
        let err = RouteError::Decode {
            device_id: "d1".to_string(),
            source: DecodeError::MissingField("status"),
        };
        assert_eq!(
            err.to_string(),
            "payload from d1 rejected: missing field in payload: status"
        );
    }

    #[test]
    fn warning_display() {
        let warning = Warning::DuplicateDevice("d1".to_string());
        assert_eq!(warning.to_string(), "device d1 already exists");
    }
}
